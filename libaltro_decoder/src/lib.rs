//! # altro_decoder
//!
//! altro_decoder unpacks the raw data of ALTRO front-end electronics, as framed by a
//! Readout Control Unit (RCU) and shipped over a Detector Data Link (DDL), into per-channel
//! sample records. Several calorimeter and tracking detectors share this format, so the
//! decoder is kept free of any detector specific mapping: it yields 12 bit hardware
//! addresses and 10 bit samples, and leaves the translation to detector coordinates to
//! the caller.
//!
//! ## Installation
//!
//! The only method of install is from source. If you have not used Rust before, see the
//! [Rust docs](https://www.rust-lang.org/tools/install) for installing the tool chain.
//!
//! To build and install the CLI use `cargo install --path ./altro_decoder_cli` from the
//! top level repository.
//!
//! ## Using the library
//!
//! ```no_run
//! use libaltro_decoder::config::DecoderConfig;
//! use libaltro_decoder::decoder::AltroDecoder;
//!
//! let bytes = std::fs::read("raw0/PHOS_1792.ddl").unwrap();
//! let mut decoder = AltroDecoder::new(DecoderConfig::default());
//! decoder.set_memory(&bytes).unwrap();
//! decoder.decode().unwrap();
//! while let Some(channel) = decoder.next_channel().unwrap() {
//!     println!("{:#x}: {} samples", channel.hardware_address, channel.sample_count);
//! }
//! ```
//!
//! ## Data format
//!
//! A DDL payload is a sequence of little-endian 32 bit words:
//!
//! ```text
//! [header: 8 words][payload][RCU trailer: 1-4 words]
//! ```
//!
//! The payload is a stream of 10 bit slots, packed 16 to a 160 bit (5 word) block with the
//! first slot in the low bits of the first word. The last block may be short. Four slots
//! make one 40 bit ALTRO word. Channels are written one after another, each as
//!
//! ```text
//! [samples][0x2aa fill to a 40 bit boundary][40 bit channel trailer]
//! ```
//!
//! where the channel trailer holds, from the top, the 0x2aaa completeness marker, the
//! number of samples and the hardware address. Because only the trailer says how long a
//! channel is, channels are read from the end of the payload backward.
//!
//! The RCU trailer repeats the number of 40 bit words in the payload. The last trailer word
//! gives the trailer length when it is 4 or less; otherwise the trailer is a single word.
//! A mismatch between the two counts is an error in strict mode and a warning otherwise.
//!
//! ## Configuration
//!
//! The CLI reads a YAML configuration:
//!
//! ```yml
//! raw_path: /path/to/simulation
//! detector: PHOS
//! summary_path: /path/to/summaries
//! first_event: 0
//! last_event: 10
//! strict_trailer_validation: false
//! n_threads: 1
//! ```
//!
//! `raw_path` contains one `raw<N>` directory per event, each holding the detector's DDL
//! files named `<detector>_<ddl id>.ddl`. A YAML summary `event_<N>.yml` of every channel
//! found is written to `summary_path` for each event.
pub mod bit_word_buffer;
pub mod channel;
pub mod config;
pub mod constants;
pub mod ddl_block;
pub mod decoder;
pub mod error;
pub mod hardware_address;
pub mod payload_builder;
pub mod process;
pub mod summary;
pub mod trailer;
pub mod worker_status;
