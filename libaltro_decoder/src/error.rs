use std::path::PathBuf;
use thiserror::Error;

use super::constants::*;
use super::worker_status::WorkerStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AltroDecoderError {
    #[error("Corrupted RCU trailer: last word {0} gives an invalid trailer size; expected {min} to {max} words", min=MIN_TRAILER_WORDS, max=MAX_TRAILER_WORDS)]
    CorruptedTrailer(u32),
    #[error("Buffer of {0} bytes is too small for a DDL payload; expected at least {min} bytes", min=MIN_BUFFER_SIZE_BYTES)]
    BufferTooSmall(usize),
    #[error("AltroDecoder was asked to decode before any buffer was given with set_memory")]
    NoMemory,
    #[error("RCU trailer mismatch -- size derived 40 bit word count: {size_derived} RCU word count: {rcu}")]
    TrailerMismatch { size_derived: usize, rcu: u32 },
    #[error("AltroDecoder was asked for a channel before a successful decode")]
    NotDecoded,
    #[error("Decoded payload needs {required} samples but the buffer capacity is {capacity}")]
    PayloadTooLarge { required: usize, capacity: usize },
    #[error("Channel with hardware address {hadd:#x} claims {sample_count} samples but only {available} remain")]
    CorruptedChannel {
        hadd: u16,
        sample_count: usize,
        available: usize,
    },
    #[error("Bunch of length {length} found with only {available} channel words remaining")]
    CorruptedBunch { length: usize, available: usize },
    #[error("Bit field of width {width} at sample {index} (bit offset {offset}) lies outside a buffer of {len} samples")]
    OutOfBounds {
        index: usize,
        offset: usize,
        width: usize,
        len: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadBuilderError {
    #[error("Hardware address {0:#x} does not fit in 12 bits")]
    BadHardwareAddress(u16),
    #[error("Channel with hardware address {0:#x} has no samples; the decoder cannot frame an empty channel")]
    EmptyChannel(u16),
    #[error("Channel has {0} samples; at most {max} are allowed", max=MAX_CHANNEL_SAMPLES)]
    TooManySamples(usize),
    #[error("Sample value {0:#x} does not fit in 10 bits")]
    BadSample(u16),
    #[error("Trailer of {0} words requested; the builder supports 2 to {max} words", max=MAX_TRAILER_WORDS)]
    BadTrailerSize(u32),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum SummaryWriterError {
    #[error("SummaryWriter failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("SummaryWriter failed to convert to yaml: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to SummaryWriter error: {0}")]
    WriterError(#[from] SummaryWriterError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to Send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<WorkerStatus>),
    #[error("Processor failed due to IO error: {0}")]
    IoError(#[from] std::io::Error),
}
