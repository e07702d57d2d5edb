use bitvec::prelude::*;
use byteorder::{ByteOrder, LittleEndian};

use super::constants::*;
use super::error::PayloadBuilderError;

/// A channel to be framed into a payload by the [`PayloadBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFrame {
    pub hardware_address: u16,
    pub samples: Vec<u16>,
    pub complete: bool,
}

impl ChannelFrame {
    /// Create a complete channel from raw samples
    pub fn new(hardware_address: u16, samples: Vec<u16>) -> Self {
        Self {
            hardware_address,
            samples,
            complete: true,
        }
    }

    /// Create a complete channel from zero-suppressed bunches.
    ///
    /// Bunches are given as `(end time bin, samples)` in buffer order, so the last one
    /// given is the first one read back.
    pub fn from_bunches(hardware_address: u16, bunches: &[(u16, &[u16])]) -> Self {
        let mut samples = Vec::new();
        for (end_time_bin, bunch) in bunches {
            samples.extend_from_slice(bunch);
            samples.push(*end_time_bin);
            samples.push((bunch.len() + BUNCH_HEADER_SAMPLES) as u16);
        }
        Self::new(hardware_address, samples)
    }

    /// Mark the channel as truncated by writing a broken trailer marker
    pub fn incomplete(mut self) -> Self {
        self.complete = false;
        self
    }

    /// The 10 bit slots of this channel: samples, fill words and the 40 bit trailer.
    ///
    /// A channel needs at least one sample: a bare trailer written first in the payload
    /// is below the decoder's minimum frame and would never be read back.
    fn encode(&self) -> Result<Vec<u16>, PayloadBuilderError> {
        if self.hardware_address > HADD_MASK {
            return Err(PayloadBuilderError::BadHardwareAddress(self.hardware_address));
        }
        let n = self.samples.len();
        if n == 0 {
            return Err(PayloadBuilderError::EmptyChannel(self.hardware_address));
        }
        if n > MAX_CHANNEL_SAMPLES {
            return Err(PayloadBuilderError::TooManySamples(n));
        }
        if let Some(bad) = self.samples.iter().find(|s| **s as u32 > SAMPLE_MASK) {
            return Err(PayloadBuilderError::BadSample(*bad));
        }

        let marker = if self.complete {
            CHANNEL_TRAILER_MARKER
        } else {
            0
        };
        let n = n as u16;
        let hadd = self.hardware_address;

        let mut slots = self.samples.clone();
        slots.resize(n.next_multiple_of(SAMPLES_PER_ALTRO_WORD as u16) as usize, FILL_WORD);
        slots.push(hadd & 0x3ff);
        slots.push(((n & 0xf) << 6) | (0xa << 2) | (hadd >> 10));
        slots.push(((marker & 0xf) << 6) | (n >> 4));
        slots.push(marker >> 4);
        Ok(slots)
    }
}

/// PayloadBuilder assembles raw DDL payloads in the RCU format.
///
/// The builder is mostly used for simulation and tests. Slots are packed 4 per 40 bit
/// ALTRO word into little-endian 32 bit words, behind an 8 word header and in front of an
/// RCU trailer `[rcu word count, 0.., trailer size]`.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    slots: Vec<u16>,
    trailer_words: u32,
    rcu_word_count: Option<u32>,
    padding_words: usize,
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            trailer_words: 2,
            rcu_word_count: None,
            padding_words: 0,
        }
    }
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a framed channel
    pub fn push_channel(&mut self, frame: &ChannelFrame) -> Result<&mut Self, PayloadBuilderError> {
        let slots = frame.encode()?;
        self.slots.extend(slots);
        Ok(self)
    }

    /// Append raw 10 bit slots with no channel framing
    pub fn push_samples(&mut self, samples: &[u16]) -> Result<&mut Self, PayloadBuilderError> {
        if let Some(bad) = samples.iter().find(|s| **s as u32 > SAMPLE_MASK) {
            return Err(PayloadBuilderError::BadSample(*bad));
        }
        self.slots.extend_from_slice(samples);
        Ok(self)
    }

    pub fn set_trailer_words(&mut self, n_words: u32) -> Result<&mut Self, PayloadBuilderError> {
        if !(2..=MAX_TRAILER_WORDS).contains(&n_words) {
            return Err(PayloadBuilderError::BadTrailerSize(n_words));
        }
        self.trailer_words = n_words;
        Ok(self)
    }

    /// Write this count into the trailer instead of the true number of 40 bit words
    pub fn set_rcu_word_count(&mut self, count: u32) -> &mut Self {
        self.rcu_word_count = Some(count);
        self
    }

    /// Append 32 bit words of 0xaaaa padding after the payload, as simulated data does
    pub fn set_padding_words(&mut self, n_words: usize) -> &mut Self {
        self.padding_words = n_words;
        self
    }

    /// Number of 40 bit ALTRO words in the payload
    pub fn altro_word_count(&self) -> usize {
        self.slots.len().div_ceil(SAMPLES_PER_ALTRO_WORD)
    }

    /// Serialize the payload into raw bytes
    pub fn build(&self) -> Vec<u8> {
        let n_altro_words = self.altro_word_count();
        let n_payload_words = (n_altro_words * ALTRO_WORD_BITS).div_ceil(WORD_BITS);

        let mut payload = vec![0u32; n_payload_words];
        let bits = payload.view_bits_mut::<Lsb0>();
        for (k, slot) in self.slots.iter().enumerate() {
            bits[k * SAMPLE_BITS..(k + 1) * SAMPLE_BITS].store_le(*slot);
        }
        let padding = ((AAA_PADDING_PATTERN as u32) << 16) | AAA_PADDING_PATTERN as u32;
        payload.extend(std::iter::repeat(padding).take(self.padding_words));

        let mut trailer = vec![0u32; self.trailer_words as usize];
        trailer[0] = self.rcu_word_count.unwrap_or(n_altro_words as u32);
        trailer[self.trailer_words as usize - 1] = self.trailer_words;

        let header = [0u32; HEADER_WORDS];
        let words: Vec<u32> = header
            .iter()
            .chain(&payload)
            .chain(&trailer)
            .copied()
            .collect();
        let mut bytes = vec![0u8; words.len() * WORD_SIZE_BYTES];
        LittleEndian::write_u32_into(&words, &mut bytes);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_words(bytes: &[u8]) -> Vec<u32> {
        let mut words = vec![0u32; bytes.len() / 4];
        LittleEndian::read_u32_into(bytes, &mut words);
        words
    }

    #[test]
    fn test_counting_block_layout() {
        let samples: Vec<u16> = (0..16).collect();
        let mut builder = PayloadBuilder::new();
        builder.push_samples(&samples).unwrap();
        let words = payload_words(&builder.build());
        assert_eq!(words.len(), 8 + 5 + 2);
        assert_eq!(
            &words[8..13],
            &[0xc0200400, 0x60140400, 0x240801c0, 0x0c02c0a0, 0x03c0e034]
        );
        assert_eq!(&words[13..], &[4, 2]);
    }

    #[test]
    fn test_channel_trailer_slots() {
        let frame = ChannelFrame::new(0xabc, vec![1, 2, 3, 4, 5]);
        let slots = frame.encode().unwrap();
        assert_eq!(slots.len(), 12);
        assert_eq!(&slots[..8], &[1, 2, 3, 4, 5, FILL_WORD, FILL_WORD, FILL_WORD]);
        assert_eq!(slots[8], 0xabc & 0x3ff);
        assert_eq!(slots[9], (5 << 6) | (0xa << 2) | 0x2);
        assert_eq!(slots[10], 0xa << 6);
        assert_eq!(slots[11], 0x2aa);
    }

    #[test]
    fn test_bad_frames() {
        let mut builder = PayloadBuilder::new();
        assert_eq!(
            builder
                .push_channel(&ChannelFrame::new(0x1000, vec![1]))
                .err(),
            Some(PayloadBuilderError::BadHardwareAddress(0x1000))
        );
        assert_eq!(
            builder.push_channel(&ChannelFrame::new(1, vec![0x400])).err(),
            Some(PayloadBuilderError::BadSample(0x400))
        );
        assert_eq!(
            builder.push_channel(&ChannelFrame::new(0x11, vec![])).err(),
            Some(PayloadBuilderError::EmptyChannel(0x11))
        );
        assert_eq!(
            builder
                .push_channel(&ChannelFrame::from_bunches(0x12, &[]))
                .err(),
            Some(PayloadBuilderError::EmptyChannel(0x12))
        );
        assert_eq!(
            builder.set_trailer_words(1).err(),
            Some(PayloadBuilderError::BadTrailerSize(1))
        );
        assert_eq!(builder.altro_word_count(), 0);
    }

    #[test]
    fn test_trailer_and_padding() {
        let mut builder = PayloadBuilder::new();
        builder
            .push_samples(&[7; 8])
            .unwrap()
            .set_trailer_words(4)
            .unwrap()
            .set_padding_words(2)
            .set_rcu_word_count(9);
        let words = payload_words(&builder.build());
        // 2 ALTRO words fill 3 payload words, then the padding and the trailer
        assert_eq!(words.len(), 8 + 3 + 2 + 4);
        assert_eq!(&words[11..13], &[0xaaaa_aaaa, 0xaaaa_aaaa]);
        assert_eq!(&words[13..], &[9, 0, 0, 4]);
    }
}
