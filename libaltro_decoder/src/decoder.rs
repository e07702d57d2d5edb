use byteorder::{ByteOrder, LittleEndian};

use super::bit_word_buffer::BitWordBuffer;
use super::channel::AltroChannel;
use super::config::DecoderConfig;
use super::constants::*;
use super::ddl_block::{decode_block, decode_last_block};
use super::error::AltroDecoderError;
use super::trailer::{correct_for_paddings, count_aaa_paddings, Geometry};

#[derive(Debug, Clone, PartialEq, Eq)]
enum DecoderState {
    Uninitialized,
    Ready,
    Decoded,
    Exhausted,
    FatallyCorrupted(AltroDecoderError),
}

/// AltroDecoder unpacks one RCU DDL payload into ALTRO channels.
///
/// Usage follows the payload through three steps: [`set_memory`](Self::set_memory) reads
/// the geometry and validates the RCU trailer, [`decode`](Self::decode) unpacks every
/// DDL block into the sample buffer, and [`next_channel`](Self::next_channel) walks the
/// buffer backward from the end, one channel per call. Channels come out in the reverse
/// of the order the RCU wrote them.
///
/// The decoder borrows the raw buffer for its lifetime. To reuse the sample buffer across
/// payloads, take it back with [`into_buffer`](Self::into_buffer) and hand it to the next
/// decoder with [`with_buffer`](Self::with_buffer).
#[derive(Debug)]
pub struct AltroDecoder<'a> {
    config: DecoderConfig,
    raw: &'a [u8],
    geometry: Option<Geometry>,
    altro_word_count40: usize,
    words: BitWordBuffer,
    remaining: usize,
    state: DecoderState,
    complete_channel_count: u32,
    incomplete_channel_count: u32,
}

impl<'a> AltroDecoder<'a> {
    /// Create a decoder with room for one RCU's worth of channels
    pub fn new(config: DecoderConfig) -> Self {
        Self::with_buffer(config, BitWordBuffer::new(DEFAULT_CAPACITY))
    }

    /// Create a decoder around an existing sample buffer
    pub fn with_buffer(config: DecoderConfig, mut words: BitWordBuffer) -> Self {
        words.clear();
        Self {
            config,
            raw: &[],
            geometry: None,
            altro_word_count40: 0,
            words,
            remaining: 0,
            state: DecoderState::Uninitialized,
            complete_channel_count: 0,
            incomplete_channel_count: 0,
        }
    }

    pub fn into_buffer(self) -> BitWordBuffer {
        self.words
    }

    pub fn set_strict_trailer_validation(&mut self, strict: bool) {
        self.config.strict_trailer_validation = strict;
    }

    /// Give the decoder a new payload, resetting all state.
    ///
    /// A trailer that cannot be sized, or a buffer too small to hold header and trailer,
    /// is fatal: every following call fails with the same error until a new buffer is set.
    pub fn set_memory(&mut self, buffer: &'a [u8]) -> Result<(), AltroDecoderError> {
        self.raw = buffer;
        self.geometry = None;
        self.altro_word_count40 = 0;
        self.words.clear();
        self.remaining = 0;
        self.complete_channel_count = 0;
        self.incomplete_channel_count = 0;

        if buffer.len() % WORD_SIZE_BYTES != 0 {
            log::warn!(
                "DDL buffer of {} bytes is not word aligned; ignoring the last {} bytes",
                buffer.len(),
                buffer.len() % WORD_SIZE_BYTES
            );
        }

        match Geometry::from_buffer(buffer) {
            Ok(geometry) => {
                self.altro_word_count40 = geometry.altro_word_count40;
                self.geometry = Some(geometry);
                self.state = DecoderState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = DecoderState::FatallyCorrupted(e.clone());
                Err(e)
            }
        }
    }

    /// Unpack the payload into the sample buffer.
    ///
    /// The trailer counts are checked first. In strict mode a mismatch leaves the buffer
    /// empty; otherwise the size derived count is used.
    pub fn decode(&mut self) -> Result<(), AltroDecoderError> {
        let geometry = match &self.state {
            DecoderState::FatallyCorrupted(e) => return Err(e.clone()),
            DecoderState::Uninitialized => return Err(AltroDecoderError::NoMemory),
            _ => self.geometry.ok_or(AltroDecoderError::NoMemory)?,
        };
        self.words.clear();
        self.remaining = 0;
        self.complete_channel_count = 0;
        self.incomplete_channel_count = 0;
        self.state = DecoderState::Ready;

        let raw = self.raw;
        let payload = &raw[geometry.payload_range()];
        let n_paddings = count_aaa_paddings(payload);
        self.altro_word_count40 = correct_for_paddings(geometry.altro_word_count40, n_paddings);
        if self.altro_word_count40 != geometry.altro_word_count40 {
            log::debug!(
                "Found {} 0xaaaa paddings; corrected 40 bit word count from {} to {}",
                n_paddings,
                geometry.altro_word_count40,
                self.altro_word_count40
            );
        }

        if self.altro_word_count40 as u64 != geometry.rcu_altro_word_count40 as u64 {
            let mismatch = AltroDecoderError::TrailerMismatch {
                size_derived: self.altro_word_count40,
                rcu: geometry.rcu_altro_word_count40,
            };
            if self.config.strict_trailer_validation {
                return Err(mismatch);
            }
            log::warn!("{mismatch}; decoding with the size derived count");
        }

        if raw.len() <= MIN_PAYLOAD_SIZE_BYTES {
            return Err(AltroDecoderError::BufferTooSmall(raw.len()));
        }

        self.words.reserve_samples(geometry.decoded_sample_count())?;
        let mut block = [0u32; DDL_BLOCK_WORDS];
        let mut blocks = payload.chunks_exact(DDL_BLOCK_WORDS * WORD_SIZE_BYTES);
        for chunk in &mut blocks {
            LittleEndian::read_u32_into(chunk, &mut block);
            self.words.push_block(&decode_block(&block))?;
        }

        let tail = blocks.remainder();
        if !tail.is_empty() {
            let n_words = tail.len() / WORD_SIZE_BYTES;
            LittleEndian::read_u32_into(tail, &mut block[..n_words]);
            self.words.push_block(&decode_last_block(&block[..n_words]))?;
        }

        self.remaining = (self.altro_word_count40 * SAMPLES_PER_ALTRO_WORD).min(self.words.len());
        self.state = DecoderState::Decoded;
        Ok(())
    }

    /// Read the next channel, walking backward from the end of the payload.
    ///
    /// Returns `Ok(None)` once every channel frame has been read. A channel that claims
    /// more samples than remain below it is an error and ends the iteration.
    pub fn next_channel(&mut self) -> Result<Option<AltroChannel<'_>>, AltroDecoderError> {
        match &self.state {
            DecoderState::FatallyCorrupted(e) => return Err(e.clone()),
            DecoderState::Uninitialized | DecoderState::Ready => {
                return Err(AltroDecoderError::NotDecoded)
            }
            DecoderState::Exhausted => return Ok(None),
            DecoderState::Decoded => (),
        }

        if self.remaining < MIN_CHANNEL_FRAME_SAMPLES {
            self.state = DecoderState::Exhausted;
            return Ok(None);
        }

        // Channel trailer, lowest slot first: hadd | count + hadd high bits | marker + count | marker
        let trailer = self.remaining - CHANNEL_TRAILER_SAMPLES;
        let marker = self.words.read_field(trailer + 2, 6, 14)? as u16;
        let sample_count = self.words.read_field(trailer + 1, 6, 10)? as usize;
        let hardware_address = self.words.read_field(trailer, 0, 12)? as u16;

        let padded_count = sample_count.next_multiple_of(SAMPLES_PER_ALTRO_WORD);
        if padded_count > trailer {
            self.state = DecoderState::Exhausted;
            return Err(AltroDecoderError::CorruptedChannel {
                hadd: hardware_address,
                sample_count,
                available: trailer,
            });
        }

        // Rejected channels are not counted
        let complete = marker == CHANNEL_TRAILER_MARKER;
        if complete {
            self.complete_channel_count += 1;
        } else {
            self.incomplete_channel_count += 1;
        }

        let start = trailer - padded_count;
        self.remaining = start;
        Ok(Some(AltroChannel {
            hardware_address,
            sample_count,
            complete,
            samples: &self.words.as_slice()[start..start + sample_count],
        }))
    }

    /// Percentage of channels read so far that were incomplete
    pub fn get_failure_rate(&self) -> f32 {
        let total = self.complete_channel_count + self.incomplete_channel_count;
        if total == 0 {
            0.0
        } else {
            100.0 * self.incomplete_channel_count as f32 / total as f32
        }
    }

    pub fn complete_channel_count(&self) -> u32 {
        self.complete_channel_count
    }

    pub fn incomplete_channel_count(&self) -> u32 {
        self.incomplete_channel_count
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// The 40 bit word count used for decoding, after any padding correction
    pub fn altro_word_count40(&self) -> usize {
        self.altro_word_count40
    }

    /// Every decoded sample, in payload order
    pub fn samples(&self) -> &[u16] {
        self.words.as_slice()
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self.state, DecoderState::Decoded | DecoderState::Exhausted)
    }

    pub fn is_fatally_corrupted(&self) -> bool {
        matches!(self.state, DecoderState::FatallyCorrupted(_))
    }
}
