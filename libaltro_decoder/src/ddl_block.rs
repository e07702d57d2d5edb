use super::constants::{DDL_BLOCK_WORDS, SAMPLES_PER_BLOCK, SAMPLE_BITS, SAMPLE_MASK, WORD_BITS};

/// Unpack one 160 bit DDL block into sixteen 10 bit samples.
///
/// The block is read as a little-endian bit stream: sample `k` starts at bit
/// `10k mod 32` of word `10k / 32`. Samples 3, 6, 9 and 12 straddle two words and take
/// their high bits from the low end of the next word.
pub fn decode_block(block: &[u32; DDL_BLOCK_WORDS]) -> [u16; SAMPLES_PER_BLOCK] {
    let mut samples = [0u16; SAMPLES_PER_BLOCK];
    for (k, sample) in samples.iter_mut().enumerate() {
        let bit = k * SAMPLE_BITS;
        let word = bit / WORD_BITS;
        let offset = bit % WORD_BITS;
        let mut value = block[word] >> offset;
        if offset + SAMPLE_BITS > WORD_BITS {
            value |= block[word + 1] << (WORD_BITS - offset);
        }
        *sample = (value & SAMPLE_MASK) as u16;
    }
    samples
}

/// Decode the short block at the end of a payload.
///
/// The words are copied into a zero padded scratch block so the padding only lands in
/// the trailing sample slots. At most five words are used.
pub fn decode_last_block(words: &[u32]) -> [u16; SAMPLES_PER_BLOCK] {
    let mut scratch = [0u32; DDL_BLOCK_WORDS];
    let n = words.len().min(DDL_BLOCK_WORDS);
    scratch[..n].copy_from_slice(&words[..n]);
    decode_block(&scratch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_block() {
        let block = [0xc0200400, 0x60140400, 0x240801c0, 0x0c02c0a0, 0x03c0e034];
        let expected: Vec<u16> = (0..16).collect();
        assert_eq!(decode_block(&block).to_vec(), expected);
    }

    #[test]
    fn test_straddling_samples() {
        let block = [0x955003ff, 0xf80001aa, 0x852301ff, 0xaaffc00c, 0xffc09556];
        let expected: [u16; 16] = [
            0x3ff, 0, 0x155, 0x2aa, 1, 0x200, 0x3ff, 7, 0x123, 0x321, 0, 0x3ff, 0x2aa, 0x155, 9,
            0x3ff,
        ];
        let samples = decode_block(&block);
        assert_eq!(samples, expected);
        // The word crossing slots
        assert_eq!(samples[3], 0x2aa);
        assert_eq!(samples[6], 0x3ff);
        assert_eq!(samples[9], 0x321);
        assert_eq!(samples[12], 0x2aa);
    }

    #[test]
    fn test_all_ones() {
        assert_eq!(decode_block(&[u32::MAX; 5]), [0x3ff; 16]);
    }

    #[test]
    fn test_last_block_is_zero_padded() {
        let full = [0xc0200400, 0x60140400, 0x240801c0, 0x0c02c0a0, 0x03c0e034];
        let samples = decode_last_block(&full[..2]);
        // Words 0 and 1 cover samples 0-5 completely and the low 4 bits of sample 6
        assert_eq!(&samples[..6], &[0, 1, 2, 3, 4, 5]);
        assert_eq!(samples[6], 6 & 0xf);
        assert!(samples[7..].iter().all(|s| *s == 0));
    }
}
