//! Audio Capture
//!
//! Input device selection and, with the `cpal-audio` feature, a live input
//! stream whose callback feeds the pipeline's [`pipeline::CaptureWriter`].

use thiserror::Error;

/// Capture source errors
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Device enumeration failed
    #[error("Failed to enumerate input devices: {0}")]
    Enumerate(String),

    /// No device at the requested index
    #[error("No input device at index {index} ({available} available)")]
    InvalidDevice { index: usize, available: usize },

    /// Selection was not a number
    #[error("Invalid device selection {0:?}")]
    InvalidSelection(String),

    /// Stream could not be built or started
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// Binary built without audio support
    #[error("Audio capture unavailable; rebuild with the cpal-audio feature or use --synthetic")]
    Unsupported,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parse an interactive device selection against `available` devices
pub fn parse_device_index(input: &str, available: usize) -> Result<usize, CaptureError> {
    let trimmed = input.trim();
    let index: usize = trimmed
        .parse()
        .map_err(|_| CaptureError::InvalidSelection(trimmed.to_string()))?;
    if index >= available {
        return Err(CaptureError::InvalidDevice { index, available });
    }
    Ok(index)
}

/// Convert a float sample in [-1, 1] to i16, saturating outside that range
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(feature = "cpal-audio")]
pub use audio::{list_input_devices, select_device, AudioCapture};

#[cfg(feature = "cpal-audio")]
mod audio {
    use super::{f32_to_i16, parse_device_index, CaptureError};
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use pipeline::{CaptureWriter, PipelineContext};
    use std::io::{self, BufRead, Write};
    use std::sync::Arc;
    use tracing::{error, info, warn};

    /// Names of the host's input devices, in index order
    pub fn list_input_devices() -> Result<Vec<String>, CaptureError> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| CaptureError::Enumerate(e.to_string()))?;
        Ok(devices
            .map(|device| device.name().unwrap_or_else(|_| "<unnamed>".to_string()))
            .collect())
    }

    /// Pick the input device at `index`, prompting on stdin when `None`
    pub fn select_device(index: Option<usize>) -> Result<cpal::Device, CaptureError> {
        let names = list_input_devices()?;
        let index = match index {
            Some(index) => index,
            None => {
                for (i, name) in names.iter().enumerate() {
                    println!("  [{}] {}", i, name);
                }
                print!("Select input device: ");
                io::stdout().flush()?;
                let mut line = String::new();
                io::stdin().lock().read_line(&mut line)?;
                parse_device_index(&line, names.len())?
            }
        };

        let host = cpal::default_host();
        let device = host
            .input_devices()
            .map_err(|e| CaptureError::Enumerate(e.to_string()))?
            .nth(index)
            .ok_or(CaptureError::InvalidDevice {
                index,
                available: names.len(),
            })?;
        info!(index, device = names.get(index).map(String::as_str).unwrap_or(""), "Input device selected");
        Ok(device)
    }

    /// Live input stream feeding the double buffer
    pub struct AudioCapture {
        stream: cpal::Stream,
    }

    impl AudioCapture {
        /// Open a mono stream at the pipeline sample rate and start it
        ///
        /// i16 samples are preferred; devices that only deliver f32 get a
        /// float stream converted in the callback.
        pub fn start(ctx: Arc<PipelineContext>, device: &cpal::Device) -> Result<Self, CaptureError> {
            let stream_config = cpal::StreamConfig {
                channels: 1,
                sample_rate: cpal::SampleRate(ctx.config().sample_rate),
                buffer_size: cpal::BufferSize::Default,
            };

            let stream = match Self::build_i16(&ctx, device, &stream_config) {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, "i16 input stream rejected, retrying with f32");
                    Self::build_f32(&ctx, device, &stream_config)?
                }
            };
            stream
                .play()
                .map_err(|e| CaptureError::Stream(e.to_string()))?;

            info!(sample_rate = stream_config.sample_rate.0, "Audio capture started");
            Ok(Self { stream })
        }

        fn build_i16(
            ctx: &Arc<PipelineContext>,
            device: &cpal::Device,
            config: &cpal::StreamConfig,
        ) -> Result<cpal::Stream, CaptureError> {
            let mut writer = CaptureWriter::new(Arc::clone(ctx));
            device
                .build_input_stream(
                    config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        writer.push_samples(data);
                    },
                    |err| error!(error = %err, "Audio stream error"),
                    None,
                )
                .map_err(|e| CaptureError::Stream(e.to_string()))
        }

        fn build_f32(
            ctx: &Arc<PipelineContext>,
            device: &cpal::Device,
            config: &cpal::StreamConfig,
        ) -> Result<cpal::Stream, CaptureError> {
            let mut writer = CaptureWriter::new(Arc::clone(ctx));
            let mut converted = Vec::with_capacity(ctx.config().block_size);
            device
                .build_input_stream(
                    config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        converted.clear();
                        converted.extend(data.iter().map(|&s| f32_to_i16(s)));
                        writer.push_samples(&converted);
                    },
                    |err| error!(error = %err, "Audio stream error"),
                    None,
                )
                .map_err(|e| CaptureError::Stream(e.to_string()))
        }

        pub fn stop(self) -> Result<(), CaptureError> {
            self.stream
                .pause()
                .map_err(|e| CaptureError::Stream(e.to_string()))?;
            info!("Audio capture stopped");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_conversion_scales_and_saturates() {
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(1.0), i16::MAX);
        assert_eq!(f32_to_i16(-1.0), -i16::MAX);
        assert_eq!(f32_to_i16(0.5), 16383);
        assert_eq!(f32_to_i16(3.0), i16::MAX);
        assert_eq!(f32_to_i16(-3.0), -i16::MAX);
        assert_eq!(f32_to_i16(f32::NAN), 0);
    }

    #[test]
    fn test_parse_valid_index() {
        assert_eq!(parse_device_index(" 2\n", 3).unwrap(), 2);
    }

    #[test]
    fn test_parse_out_of_range() {
        assert!(matches!(
            parse_device_index("3", 3),
            Err(CaptureError::InvalidDevice { index: 3, available: 3 })
        ));
    }

    #[test]
    fn test_parse_not_a_number() {
        assert!(matches!(
            parse_device_index("mic", 3),
            Err(CaptureError::InvalidSelection(s)) if s == "mic"
        ));
    }
}
