use super::constants::{DEFAULT_CAPACITY, SAMPLES_PER_BLOCK, SAMPLE_BITS};
use super::error::AltroDecoderError;

/// Read a bit field out of a run of 10 bit sample slots.
///
/// The slots starting at `index` are treated as one little-endian bit stream, so a field
/// may continue into the slots above `index`. `offset` is counted from bit 0 of
/// `words[index]`. Fields wider than 32 bits are not supported.
pub fn extract_field(
    words: &[u16],
    index: usize,
    offset: usize,
    width: usize,
) -> Result<u32, AltroDecoderError> {
    let out_of_bounds = AltroDecoderError::OutOfBounds {
        index,
        offset,
        width,
        len: words.len(),
    };
    if width == 0 || width > 32 {
        return Err(out_of_bounds);
    }
    let n_slots = (offset + width).div_ceil(SAMPLE_BITS);
    let end = index.checked_add(n_slots).ok_or(out_of_bounds.clone())?;
    if end > words.len() || n_slots * SAMPLE_BITS > u64::BITS as usize {
        return Err(out_of_bounds);
    }

    let window = words[index..end]
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, w)| acc | ((*w as u64) << (i * SAMPLE_BITS)));
    Ok(((window >> offset) & ((1u64 << width) - 1)) as u32)
}

/// BitWordBuffer holds the unpacked 10 bit samples of one DDL payload.
///
/// The buffer has a hard capacity set at construction. Memory is only claimed as blocks
/// are pushed, and is kept between payloads.
#[derive(Debug, Clone)]
pub struct BitWordBuffer {
    words: Vec<u16>,
    capacity: usize,
}

impl Default for BitWordBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl BitWordBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            words: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Make sure `n_samples` more samples fit before decoding anything
    pub fn reserve_samples(&mut self, n_samples: usize) -> Result<(), AltroDecoderError> {
        let required = self.words.len() + n_samples;
        if required > self.capacity {
            return Err(AltroDecoderError::PayloadTooLarge {
                required,
                capacity: self.capacity,
            });
        }
        self.words.reserve(n_samples);
        Ok(())
    }

    /// Append the samples of one decoded block
    pub fn push_block(
        &mut self,
        samples: &[u16; SAMPLES_PER_BLOCK],
    ) -> Result<(), AltroDecoderError> {
        self.reserve_samples(SAMPLES_PER_BLOCK)?;
        self.words.extend_from_slice(samples);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.words
    }

    pub fn read_field(
        &self,
        index: usize,
        offset: usize,
        width: usize,
    ) -> Result<u32, AltroDecoderError> {
        extract_field(&self.words, index, offset, width)
    }
}
