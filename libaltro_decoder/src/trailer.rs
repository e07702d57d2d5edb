use byteorder::{ByteOrder, LittleEndian};

use super::constants::*;
use super::error::AltroDecoderError;

/// Geometry of one DDL payload, computed from the buffer size and the RCU trailer.
///
/// The layout is `[header][payload][trailer]` in 32 bit words. Two independent counts of
/// 40 bit ALTRO words are kept: one derived from the payload size and one written by the
/// RCU into its trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub header_words: usize,
    pub trailer_words: usize,
    pub payload_words32: usize,
    pub altro_word_count40: usize,
    pub rcu_altro_word_count40: u32,
    pub full_block_count: usize,
    pub last_block_words32: usize,
}

impl Geometry {
    /// Read the geometry from a raw buffer
    ///
    /// Any trailing bytes past the last whole 32 bit word are ignored.
    pub fn from_buffer(buffer: &[u8]) -> Result<Self, AltroDecoderError> {
        if buffer.len() < MIN_BUFFER_SIZE_BYTES {
            return Err(AltroDecoderError::BufferTooSmall(buffer.len()));
        }
        let n_words = buffer.len() / WORD_SIZE_BYTES;
        let trailer_words = guess_trailer_size(read_word(buffer, n_words - 1))? as usize;
        if n_words < HEADER_WORDS + trailer_words {
            return Err(AltroDecoderError::BufferTooSmall(buffer.len()));
        }

        let payload_words32 = n_words - (HEADER_WORDS + trailer_words);
        Ok(Self {
            header_words: HEADER_WORDS,
            trailer_words,
            payload_words32,
            altro_word_count40: payload_words32 * WORD_BITS / ALTRO_WORD_BITS,
            rcu_altro_word_count40: read_word(buffer, n_words - trailer_words),
            full_block_count: payload_words32 / DDL_BLOCK_WORDS,
            last_block_words32: payload_words32 % DDL_BLOCK_WORDS,
        })
    }

    /// Byte range of the payload within the raw buffer
    pub fn payload_range(&self) -> std::ops::Range<usize> {
        let start = self.header_words * WORD_SIZE_BYTES;
        start..(start + self.payload_words32 * WORD_SIZE_BYTES)
    }

    /// Number of sample slots written by a full decode, including the padded last block
    pub fn decoded_sample_count(&self) -> usize {
        let n_blocks = self.full_block_count + usize::from(self.last_block_words32 > 0);
        n_blocks * SAMPLES_PER_BLOCK
    }
}

/// Guess the RCU trailer length from the last word of the buffer.
///
/// Small values are the trailer's own word count; anything larger means a single word
/// trailer. A count of zero cannot be a trailer.
pub fn guess_trailer_size(last_word: u32) -> Result<u32, AltroDecoderError> {
    let size = if last_word <= MAX_TRAILER_WORDS {
        last_word
    } else {
        MIN_TRAILER_WORDS
    };
    if (MIN_TRAILER_WORDS..=MAX_TRAILER_WORDS).contains(&size) {
        Ok(size)
    } else {
        Err(AltroDecoderError::CorruptedTrailer(last_word))
    }
}

/// Count the 0xaaaa halfwords sitting directly in front of the trailer.
///
/// Genuine channel data can match the pattern: a last channel with hardware address 0xaaa
/// and a sample count ending in 0xa writes 0x2aa into every trailer slot, which reads
/// back as three padding halfwords. Such a payload gets a wrong correction.
pub fn count_aaa_paddings(payload: &[u8]) -> usize {
    payload
        .rchunks_exact(2)
        .take_while(|half| LittleEndian::read_u16(half) == AAA_PADDING_PATTERN)
        .count()
}

/// Apply the padding correction for simulated data.
///
/// The simulation pads with whole 0xaaaa halfwords that the size derived count mistakes
/// for ALTRO words. Only the padding lengths seen in practice are corrected.
pub fn correct_for_paddings(altro_word_count40: usize, n_paddings: usize) -> usize {
    AAA_PADDING_CORRECTIONS
        .iter()
        .find(|(paddings, _)| *paddings == n_paddings)
        .map(|(_, correction)| altro_word_count40.saturating_sub(*correction))
        .unwrap_or(altro_word_count40)
}

fn read_word(buffer: &[u8], index: usize) -> u32 {
    let start = index * WORD_SIZE_BYTES;
    LittleEndian::read_u32(&buffer[start..start + WORD_SIZE_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_buffer(words: &[u32]) -> Vec<u8> {
        let mut bytes = vec![0u8; words.len() * 4];
        LittleEndian::write_u32_into(words, &mut bytes);
        bytes
    }

    #[test]
    fn test_trailer_size_guess() {
        assert_eq!(guess_trailer_size(1), Ok(1));
        assert_eq!(guess_trailer_size(4), Ok(4));
        assert_eq!(guess_trailer_size(5), Ok(1));
        assert_eq!(guess_trailer_size(0x8000_0002), Ok(1));
        assert_eq!(
            guess_trailer_size(0),
            Err(AltroDecoderError::CorruptedTrailer(0))
        );
    }

    #[test]
    fn test_geometry() {
        // 8 header words, 7 payload words, trailer [rcu count, 0, 3]
        let mut words = vec![0u32; 8 + 7];
        words.extend_from_slice(&[5, 0, 3]);
        let geometry = Geometry::from_buffer(&make_buffer(&words)).unwrap();
        assert_eq!(geometry.trailer_words, 3);
        assert_eq!(geometry.payload_words32, 7);
        assert_eq!(geometry.altro_word_count40, 5);
        assert_eq!(geometry.rcu_altro_word_count40, 5);
        assert_eq!(geometry.full_block_count, 1);
        assert_eq!(geometry.last_block_words32, 2);
        assert_eq!(geometry.decoded_sample_count(), 32);
        assert_eq!(geometry.payload_range(), 32..60);
    }

    #[test]
    fn test_single_word_trailer() {
        let mut words = vec![0u32; 8 + 5];
        words.push(0x10);
        let geometry = Geometry::from_buffer(&make_buffer(&words)).unwrap();
        assert_eq!(geometry.trailer_words, 1);
        assert_eq!(geometry.rcu_altro_word_count40, 0x10);
        assert_eq!(geometry.altro_word_count40, 4);
    }

    #[test]
    fn test_too_small() {
        let buffer = vec![0xffu8; 35];
        assert_eq!(
            Geometry::from_buffer(&buffer),
            Err(AltroDecoderError::BufferTooSmall(35))
        );
        // Room for the header but not for the 4 words the trailer claims
        let mut words = vec![0u32; 9];
        words.push(4);
        assert_eq!(
            Geometry::from_buffer(&make_buffer(&words)),
            Err(AltroDecoderError::BufferTooSmall(40))
        );
    }

    #[test]
    fn test_aaa_paddings() {
        let payload = make_buffer(&[0x1234_5678, 0xaaaa_0000, 0xaaaa_aaaa]);
        assert_eq!(count_aaa_paddings(&payload), 3);
        assert_eq!(count_aaa_paddings(&make_buffer(&[0xaaaa_aaaa; 4])), 8);
        assert_eq!(count_aaa_paddings(&make_buffer(&[0x0000_aaaa])), 0);
        assert_eq!(count_aaa_paddings(&[]), 0);
    }

    #[test]
    fn test_padding_corrections() {
        assert_eq!(correct_for_paddings(10, 3), 9);
        assert_eq!(correct_for_paddings(10, 5), 8);
        assert_eq!(correct_for_paddings(10, 8), 7);
        assert_eq!(correct_for_paddings(10, 0), 10);
        assert_eq!(correct_for_paddings(10, 4), 10);
        assert_eq!(correct_for_paddings(10, 6), 10);
        assert_eq!(correct_for_paddings(1, 8), 0);
    }
}
