use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::ConfigError;

/// Options of a single [`AltroDecoder`](crate::decoder::AltroDecoder)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Reject payloads whose RCU trailer word count disagrees with the payload size.
    /// When false the size derived count is trusted.
    pub strict_trailer_validation: bool,
}

/// Structure representing the application configuration. Contains pathing and event information
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub raw_path: PathBuf,
    pub detector: String,
    pub summary_path: PathBuf,
    pub first_event: i32,
    pub last_event: i32,
    pub strict_trailer_validation: bool,
    pub n_threads: i32,
}

impl Default for Config {
    /// Generate a new Config object. All fields will be empty/invalid
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from("None"),
            detector: String::from(""),
            summary_path: PathBuf::from("None"),
            first_event: 0,
            last_event: 0,
            strict_trailer_validation: false,
            n_threads: 1,
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Write the configuration to a YAML file
    pub fn write_config_file(&self, config_path: &Path) -> Result<(), ConfigError> {
        let yaml_str = serde_yaml::to_string(self)?;
        std::fs::write(config_path, yaml_str)?;
        Ok(())
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            strict_trailer_validation: self.strict_trailer_validation,
        }
    }

    /// Check if a specific event exists by evaluating the existence of its raw directory
    pub fn does_event_exist(&self, event_number: i32) -> bool {
        self.raw_path.join(self.get_event_str(event_number)).exists()
    }

    /// Get the Path to an event directory
    pub fn get_event_directory(&self, event_number: i32) -> Result<PathBuf, ConfigError> {
        let event_dir: PathBuf = self.raw_path.join(self.get_event_str(event_number));
        if event_dir.exists() {
            Ok(event_dir)
        } else {
            Err(ConfigError::BadFilePath(event_dir))
        }
    }

    /// Get the path to the output summary file
    pub fn get_summary_file_name(&self, event_number: i32) -> Result<PathBuf, ConfigError> {
        let summary_file_path: PathBuf = self
            .summary_path
            .join(format!("event_{event_number}.yml"));
        if self.summary_path.exists() {
            Ok(summary_file_path)
        } else {
            Err(ConfigError::BadFilePath(self.summary_path.clone()))
        }
    }

    /// The file name prefix of this detector's DDL files, i.e. `PHOS_` in `PHOS_1792.ddl`
    pub fn get_ddl_prefix(&self) -> String {
        format!("{}_", self.detector)
    }

    /// Construct the event directory string using the simulation raw data format
    fn get_event_str(&self, event_number: i32) -> String {
        format!("raw{event_number}")
    }

    pub fn is_n_threads_valid(&self) -> bool {
        self.n_threads >= 1
    }

    pub fn is_event_range_valid(&self) -> bool {
        self.first_event <= self.last_event
    }
}
