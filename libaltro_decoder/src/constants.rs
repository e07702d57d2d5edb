// Data sizes and layout of the DDL payload
pub const WORD_SIZE_BYTES: usize = 4;
pub const HEADER_WORDS: usize = 8; // common data header
pub const MIN_PAYLOAD_SIZE_BYTES: usize = HEADER_WORDS * WORD_SIZE_BYTES;
pub const MIN_TRAILER_WORDS: u32 = 1;
pub const MAX_TRAILER_WORDS: u32 = 4;
pub const MIN_BUFFER_SIZE_BYTES: usize =
    (HEADER_WORDS + MIN_TRAILER_WORDS as usize) * WORD_SIZE_BYTES;

// DDL blocks: 5 x 32 bit words carrying 16 x 10 bit samples
pub const DDL_BLOCK_WORDS: usize = 5;
pub const SAMPLES_PER_BLOCK: usize = 16;
pub const SAMPLE_BITS: usize = 10;
pub const SAMPLE_MASK: u32 = 0x3ff;
pub const WORD_BITS: usize = 32;

// ALTRO 40 bit words
pub const ALTRO_WORD_BITS: usize = 40;
pub const SAMPLES_PER_ALTRO_WORD: usize = 4;

// Channel framing
pub const CHANNEL_TRAILER_MARKER: u16 = 0x2aaa; // 14 bits
pub const CHANNEL_TRAILER_SAMPLES: usize = 4;
pub const FILL_WORD: u16 = 0x2aa;
pub const MIN_CHANNEL_FRAME_SAMPLES: usize = 8; // trailer + one padded data word
pub const MAX_CHANNEL_SAMPLES: usize = 1023; // 10 bit word count
pub const BUNCH_HEADER_SAMPLES: usize = 2; // bunch length + end time bin

// Simulated data quirk: runs of 0xaaaa halfwords before the RCU trailer
pub const AAA_PADDING_PATTERN: u16 = 0xaaaa;
pub const AAA_PADDING_CORRECTIONS: [(usize, usize); 3] = [(3, 1), (5, 2), (8, 3)];

// Hardware address layout (12 bits)
pub const HADD_MASK: u16 = 0xfff;
pub const HADD_BRANCH_SHIFT: u16 = 11;
pub const HADD_BRANCH_MASK: u16 = 0x1;
pub const HADD_FEC_SHIFT: u16 = 7;
pub const HADD_FEC_MASK: u16 = 0xf;
pub const HADD_CHIP_SHIFT: u16 = 4;
pub const HADD_CHIP_MASK: u16 = 0x7;
pub const HADD_CHANNEL_MASK: u16 = 0xf;

// Electronics constants
pub const NUMBER_OF_BRANCHES: usize = 2; // per RCU
pub const NUMBER_OF_FECS: usize = 16; // per branch
pub const NUMBER_OF_CHIPS: usize = 8; // per FEC
pub const NUMBER_OF_CHANNELS: usize = 16; // per chip
pub const NUMBER_OF_HARDWARE_ADDRESSES: usize =
    NUMBER_OF_BRANCHES * NUMBER_OF_FECS * NUMBER_OF_CHIPS * NUMBER_OF_CHANNELS;
pub const DEFAULT_CAPACITY: usize =
    NUMBER_OF_HARDWARE_ADDRESSES * (MAX_CHANNEL_SAMPLES + 1 + CHANNEL_TRAILER_SAMPLES);
