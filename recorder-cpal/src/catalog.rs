//! Audio device enumeration via the cpal host.
//!
//! cpal exposes no stable device identifier, so the device name doubles as
//! the ID; that matches what the host APIs surface to users anyway.

use cpal::traits::{DeviceTrait, HostTrait};

use recorder_core::{DeviceInfo, FormatSupport, RecorderError, SampleEncoding};

/// Catalog of audio devices on the default host.
pub struct DeviceCatalog {
    host: cpal::Host,
}

impl DeviceCatalog {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// List input devices with their supported channel/rate ranges.
    ///
    /// Devices that fail to report a name or any usable format are skipped
    /// rather than failing the whole listing.
    pub fn list_input_devices(&self) -> Result<Vec<DeviceInfo>, RecorderError> {
        let default_name = self.default_input_name();
        let devices = self
            .host
            .input_devices()
            .map_err(|e| RecorderError::DeviceEnumeration(e.to_string()))?;

        let mut out = Vec::new();
        for device in devices {
            let name = match device.name() {
                Ok(name) => name,
                Err(e) => {
                    log::warn!("skipping unnamed input device: {}", e);
                    continue;
                }
            };
            let is_default = default_name.as_deref() == Some(name.as_str());
            out.push(Self::describe_named(&device, name, is_default));
        }
        Ok(out)
    }

    /// Description of the system default input device.
    pub fn default_device(&self) -> Result<DeviceInfo, RecorderError> {
        let device = self
            .host
            .default_input_device()
            .ok_or(RecorderError::NoDevice)?;
        let name = device
            .name()
            .map_err(|e| RecorderError::DeviceEnumeration(e.to_string()))?;
        Ok(Self::describe_named(&device, name, true))
    }

    /// Resolve an input device by ID, or the system default when `None`.
    pub fn find_input_device(&self, id: Option<&str>) -> Result<cpal::Device, RecorderError> {
        match id {
            None => self
                .host
                .default_input_device()
                .ok_or(RecorderError::NoDevice),
            Some(wanted) => {
                let devices = self
                    .host
                    .input_devices()
                    .map_err(|e| RecorderError::DeviceEnumeration(e.to_string()))?;
                for device in devices {
                    if device.name().map(|n| n == wanted).unwrap_or(false) {
                        return Ok(device);
                    }
                }
                Err(RecorderError::NoDevice)
            }
        }
    }

    /// Default output device, for playback.
    pub fn default_output_device(&self) -> Result<cpal::Device, RecorderError> {
        self.host
            .default_output_device()
            .ok_or(RecorderError::NoDevice)
    }

    /// Full description of one device.
    pub fn describe(&self, device: &cpal::Device) -> Result<DeviceInfo, RecorderError> {
        let name = device
            .name()
            .map_err(|e| RecorderError::DeviceEnumeration(e.to_string()))?;
        let is_default = self.default_input_name().as_deref() == Some(name.as_str());
        Ok(Self::describe_named(device, name, is_default))
    }

    fn default_input_name(&self) -> Option<String> {
        self.host
            .default_input_device()
            .and_then(|d| d.name().ok())
    }

    fn describe_named(device: &cpal::Device, name: String, is_default: bool) -> DeviceInfo {
        let default_config = device.default_input_config().ok();

        let mut supported = Vec::new();
        if let Ok(ranges) = device.supported_input_configs() {
            for range in ranges {
                let encoding = match range.sample_format() {
                    cpal::SampleFormat::I16 => SampleEncoding::I16,
                    cpal::SampleFormat::U16 => SampleEncoding::U16,
                    cpal::SampleFormat::F32 => SampleEncoding::F32,
                    // Other native formats are not normalized; leave them
                    // out so config validation rejects them up front.
                    _ => continue,
                };
                supported.push(FormatSupport {
                    channels: range.channels(),
                    min_sample_rate: range.min_sample_rate().0,
                    max_sample_rate: range.max_sample_rate().0,
                    encoding,
                });
            }
        }

        DeviceInfo {
            id: name.clone(),
            name,
            is_default,
            default_channels: default_config.as_ref().map(|c| c.channels()).unwrap_or(1),
            default_sample_rate: default_config
                .as_ref()
                .map(|c| c.sample_rate().0)
                .unwrap_or(44100),
            supported,
        }
    }
}

impl Default for DeviceCatalog {
    fn default() -> Self {
        Self::new()
    }
}
