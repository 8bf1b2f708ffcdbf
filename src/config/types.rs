use serde::{Deserialize, Serialize};
use vbrindex_mpeg::{IndexOptions, SizingParams};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sizing: SizingConfig,

    #[serde(default)]
    pub index: IndexConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SizingConfig {
    /// Audio bytes one table entry should cover; sets the minimum table size
    #[serde(default = "default_bytes_per_entry")]
    pub bytes_per_entry: u32,

    /// Upper bound on frames inserted ahead of the audio (default: 10)
    #[serde(default = "default_max_delay_frames")]
    pub max_delay_frames: u32,
}

fn default_bytes_per_entry() -> u32 {
    50_000
}

fn default_max_delay_frames() -> u32 {
    10
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            bytes_per_entry: default_bytes_per_entry(),
            max_delay_frames: default_max_delay_frames(),
        }
    }
}

impl SizingConfig {
    pub fn params(&self) -> SizingParams {
        SizingParams {
            bytes_per_entry: self.bytes_per_entry,
            max_delay_frames: self.max_delay_frames,
            entry_limit: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Quality value stored in the VBRI chunk (0-100)
    #[serde(default = "default_quality")]
    pub quality: u16,

    /// Appended to the input stem when no output path is given
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
}

fn default_quality() -> u16 {
    75
}

fn default_output_suffix() -> String {
    "-out".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            output_suffix: default_output_suffix(),
        }
    }
}

impl IndexConfig {
    pub fn options(&self) -> IndexOptions {
        IndexOptions {
            quality: self.quality,
        }
    }
}
