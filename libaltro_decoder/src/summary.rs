use bit_set::BitSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::channel::AltroChannel;
use super::constants::NUMBER_OF_HARDWARE_ADDRESSES;
use super::decoder::AltroDecoder;
use super::error::{AltroDecoderError, SummaryWriterError};
use super::hardware_address::HardwareAddress;

/// What was found in one ALTRO channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub hardware_address: u16,
    pub address: HardwareAddress,
    pub sample_count: usize,
    pub complete: bool,
    pub bunch_count: usize,
    pub bunch_error: Option<String>,
    pub max_sample: u16,
}

impl From<&AltroChannel<'_>> for ChannelSummary {
    fn from(channel: &AltroChannel<'_>) -> Self {
        let mut bunch_count = 0;
        let mut bunch_error = None;
        let mut max_sample = 0;
        for bunch in channel.bunches() {
            match bunch {
                Ok(bunch) => {
                    bunch_count += 1;
                    max_sample = bunch.samples.iter().copied().fold(max_sample, u16::max);
                }
                Err(e) => bunch_error = Some(e.to_string()),
            }
        }
        Self {
            hardware_address: channel.hardware_address,
            address: channel.address(),
            sample_count: channel.sample_count,
            complete: channel.complete,
            bunch_count,
            bunch_error,
            max_sample,
        }
    }
}

/// What was found in one DDL payload. If decoding failed, `error` holds the reason and
/// `channels` holds whatever was read before the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DdlSummary {
    pub file_name: String,
    pub ddl_id: Option<u32>,
    pub size_bytes: usize,
    pub channels: Vec<ChannelSummary>,
    pub complete_channels: u32,
    pub incomplete_channels: u32,
    pub failure_rate: f32,
    pub duplicate_addresses: u32,
    pub error: Option<String>,
}

impl DdlSummary {
    /// Decode a payload and summarize every channel in it
    pub fn from_payload<'a>(
        decoder: &mut AltroDecoder<'a>,
        file_name: &str,
        ddl_id: Option<u32>,
        buffer: &'a [u8],
    ) -> Self {
        let mut summary = DdlSummary {
            file_name: file_name.to_string(),
            ddl_id,
            size_bytes: buffer.len(),
            ..Default::default()
        };

        if let Err(e) = summary.read_channels(decoder, buffer) {
            log::warn!("Skipping the rest of DDL {file_name}: {e}");
            summary.error = Some(e.to_string());
        }
        summary.complete_channels = decoder.complete_channel_count();
        summary.incomplete_channels = decoder.incomplete_channel_count();
        summary.failure_rate = decoder.get_failure_rate();
        summary
    }

    fn read_channels<'a>(
        &mut self,
        decoder: &mut AltroDecoder<'a>,
        buffer: &'a [u8],
    ) -> Result<(), AltroDecoderError> {
        decoder.set_memory(buffer)?;
        decoder.decode()?;

        let mut seen = BitSet::with_capacity(NUMBER_OF_HARDWARE_ADDRESSES);
        while let Some(channel) = decoder.next_channel()? {
            if !seen.insert(channel.hardware_address as usize) {
                log::warn!(
                    "Hardware address {:#x} ({}) appears more than once in DDL {}",
                    channel.hardware_address,
                    channel.address(),
                    self.file_name
                );
                self.duplicate_addresses += 1;
            }
            self.channels.push(ChannelSummary::from(&channel));
        }
        Ok(())
    }
}

/// All DDL summaries of one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EventSummary {
    pub event_number: i32,
    pub ddls: Vec<DdlSummary>,
}

impl EventSummary {
    pub fn new(event_number: i32) -> Self {
        Self {
            event_number,
            ddls: Vec::new(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.ddls.iter().map(|ddl| ddl.channels.len()).sum()
    }

    pub fn failed_ddl_count(&self) -> usize {
        self.ddls.iter().filter(|ddl| ddl.error.is_some()).count()
    }

    /// Write the summary as YAML
    pub fn write(&self, path: &Path) -> Result<(), SummaryWriterError> {
        let yaml_str = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml_str)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, SummaryWriterError> {
        let yaml_str = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&yaml_str)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_word_buffer::BitWordBuffer;
    use crate::config::DecoderConfig;
    use crate::payload_builder::{ChannelFrame, PayloadBuilder};

    fn decoder<'a>() -> AltroDecoder<'a> {
        AltroDecoder::with_buffer(DecoderConfig::default(), BitWordBuffer::new(4096))
    }

    #[test]
    fn test_ddl_summary() {
        let mut builder = PayloadBuilder::new();
        builder
            .push_channel(&ChannelFrame::from_bunches(
                0x8a3,
                &[(20, &[5, 90, 40][..]), (60, &[300, 12][..])],
            ))
            .unwrap()
            .push_channel(&ChannelFrame::new(0x8a3, vec![1, 2, 3]).incomplete())
            .unwrap();
        let buffer = builder.build();

        let mut decoder = decoder();
        let summary = DdlSummary::from_payload(&mut decoder, "PHOS_1792.ddl", Some(1792), &buffer);
        assert_eq!(summary.error, None);
        assert_eq!(summary.channels.len(), 2);
        assert_eq!(summary.duplicate_addresses, 1);
        assert_eq!(summary.complete_channels, 1);
        assert_eq!(summary.incomplete_channels, 1);
        assert_eq!(summary.failure_rate, 50.0);

        let incomplete = &summary.channels[0];
        assert!(!incomplete.complete);
        assert_eq!(incomplete.bunch_count, 0);

        let complete = &summary.channels[1];
        assert_eq!(complete.address, HardwareAddress::new(1, 1, 2, 3));
        assert_eq!(complete.sample_count, 9);
        assert_eq!(complete.bunch_count, 2);
        assert_eq!(complete.max_sample, 300);
        assert_eq!(complete.bunch_error, None);
    }

    #[test]
    fn test_failed_ddl_summary() {
        let buffer = vec![0u8; 48];
        let mut decoder = decoder();
        let summary = DdlSummary::from_payload(&mut decoder, "bad.ddl", None, &buffer);
        assert!(summary.channels.is_empty());
        assert_eq!(
            summary.error,
            Some(AltroDecoderError::CorruptedTrailer(0).to_string())
        );
        assert_eq!(summary.failure_rate, 0.0);
    }

    #[test]
    fn test_event_summary_yaml() {
        let dir = std::env::temp_dir().join("altro_event_summary_yaml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("event_3.yml");

        let mut event = EventSummary::new(3);
        event.ddls.push(DdlSummary {
            file_name: String::from("EMCAL_4608.ddl"),
            ddl_id: Some(4608),
            error: Some(String::from("broken")),
            ..Default::default()
        });
        event.write(&path).unwrap();
        let read = EventSummary::read(&path).unwrap();
        assert_eq!(read, event);
        assert_eq!(read.failed_ddl_count(), 1);
        assert_eq!(read.channel_count(), 0);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
