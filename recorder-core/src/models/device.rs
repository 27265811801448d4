use serde::{Deserialize, Serialize};

/// Sample encoding delivered by an input device.
///
/// Everything is normalized to signed 16-bit PCM before it reaches the
/// session buffer; these are the source encodings the normalizer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    #[serde(rename = "i16")]
    I16,
    #[serde(rename = "u16")]
    U16,
    #[serde(rename = "f32")]
    F32,
}

impl std::fmt::Display for SampleEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::I16 => write!(f, "i16"),
            Self::U16 => write!(f, "u16"),
            Self::F32 => write!(f, "f32"),
        }
    }
}

/// One channel-count/rate-range combination a device supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSupport {
    pub channels: u16,
    pub min_sample_rate: u32,
    pub max_sample_rate: u32,
    pub encoding: SampleEncoding,
}

impl FormatSupport {
    pub fn supports(&self, channels: u16, sample_rate: u32) -> bool {
        self.channels == channels
            && sample_rate >= self.min_sample_rate
            && sample_rate <= self.max_sample_rate
    }
}

/// An audio input device available for capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    pub default_channels: u16,
    pub default_sample_rate: u32,
    pub supported: Vec<FormatSupport>,
}

impl DeviceInfo {
    /// Whether the device reports support for the given channel/rate pair
    /// in any encoding.
    pub fn supports(&self, channels: u16, sample_rate: u32) -> bool {
        self.supported
            .iter()
            .any(|f| f.supports(channels, sample_rate))
    }
}
