use super::constants::BUNCH_HEADER_SAMPLES;
use super::error::AltroDecoderError;
use super::hardware_address::HardwareAddress;

/// One ALTRO channel as framed by the RCU.
///
/// This is a view into the decoder's sample buffer, so it only lives until the next call
/// to [`AltroDecoder::next_channel`](crate::decoder::AltroDecoder::next_channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltroChannel<'a> {
    pub hardware_address: u16,
    pub sample_count: usize,
    pub complete: bool,
    pub samples: &'a [u16],
}

impl<'a> AltroChannel<'a> {
    /// Split the hardware address into branch, FEC, chip and channel
    pub fn address(&self) -> HardwareAddress {
        HardwareAddress::from_raw(self.hardware_address)
    }

    /// Iterate over the zero-suppressed bunches of the channel, last bunch first.
    ///
    /// Incomplete channels have no trustworthy bunch structure and yield nothing.
    pub fn bunches(&self) -> Bunches<'a> {
        let samples: &'a [u16] = if self.complete { self.samples } else { &[] };
        Bunches {
            samples,
            remaining: samples.len(),
            failed: false,
        }
    }
}

/// A bunch of consecutive samples above the zero suppression threshold.
///
/// `samples[0]` belongs to the earliest time bin of the bunch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltroBunch<'a> {
    pub end_time_bin: u16,
    pub samples: &'a [u16],
}

impl AltroBunch<'_> {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn start_time_bin(&self) -> i32 {
        self.end_time_bin as i32 - (self.samples.len() as i32 - 1)
    }
}

/// Backward iterator over the bunches of one channel.
///
/// Each bunch is laid out as `[samples][end time bin][bunch length]`, where the length
/// counts the two header slots. A malformed length is reported once and ends iteration.
#[derive(Debug, Clone)]
pub struct Bunches<'a> {
    samples: &'a [u16],
    remaining: usize,
    failed: bool,
}

impl<'a> Iterator for Bunches<'a> {
    type Item = Result<AltroBunch<'a>, AltroDecoderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }

        let length = self.samples[self.remaining - 1] as usize;
        if length < BUNCH_HEADER_SAMPLES || length > self.remaining {
            self.failed = true;
            return Some(Err(AltroDecoderError::CorruptedBunch {
                length,
                available: self.remaining,
            }));
        }

        let end_time_bin = self.samples[self.remaining - 2];
        let start = self.remaining - length;
        let bunch = AltroBunch {
            end_time_bin,
            samples: &self.samples[start..self.remaining - BUNCH_HEADER_SAMPLES],
        };
        self.remaining = start;
        Some(Ok(bunch))
    }
}
