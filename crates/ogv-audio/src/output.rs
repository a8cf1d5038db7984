//! Audio output using cpal.

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, Device, SampleFormat, SampleRate, Stream, StreamConfig,
};
use ogv_core::{AudioBackend, Error, OutputFormat, PullCallback, Result};
use tracing::{debug, error, info, warn};

/// Pull scratch allocated up front; covers the default period of common hosts.
const SCRATCH_SAMPLES: usize = 16_384;

/// [`AudioBackend`] driving a cpal output stream.
///
/// The stream is built once by [`create_voice`](AudioBackend::create_voice);
/// `play` and `stop` resume and pause it.
pub struct CpalBackend {
    device: Device,
    device_name: String,
    stream: Option<Stream>,
}

impl CpalBackend {
    /// Create a backend on the default output device.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::ResourceInit("No output device found".to_string()))?;

        Ok(Self::with_device(device))
    }

    /// Create a backend on a specific device.
    pub fn with_device(device: Device) -> Self {
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        info!("Using audio output device: {device_name}");

        Self {
            device,
            device_name,
            stream: None,
        }
    }

    /// Get the device name.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        &self,
        config: &StreamConfig,
        mut callback: PullCallback,
    ) -> Result<Stream> {
        let err_fn = |err| {
            error!("Audio stream error: {err}");
        };

        let mut scratch = vec![0.0f32; SCRATCH_SAMPLES];
        let mut starved = false;

        let stream = self
            .device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let filled = render(data, &mut scratch, &mut callback);

                    // Only report the transition, not every starved callback
                    let now_starved = filled < data.len();
                    if now_starved && !starved {
                        warn!("Buffer underrun: needed {}, got {}", data.len(), filled);
                    }
                    starved = now_starved;
                },
                err_fn,
                None,
            )
            .map_err(|e| Error::AudioEngine(format!("Failed to build stream: {e}")))?;

        Ok(stream)
    }
}

/// Pull into `scratch` and convert to the device format, padding with silence.
///
/// `scratch` only grows when a period exceeds its current length.
fn render<T: cpal::SizedSample + cpal::FromSample<f32>>(
    data: &mut [T],
    scratch: &mut Vec<f32>,
    callback: &mut PullCallback,
) -> usize {
    if scratch.len() < data.len() {
        scratch.resize(data.len(), 0.0);
    }
    let pulled = &mut scratch[..data.len()];
    let filled = callback(pulled);

    for (i, sample) in data.iter_mut().enumerate() {
        *sample = if i < filled {
            T::from_sample(pulled[i])
        } else {
            T::EQUILIBRIUM
        };
    }
    filled
}

impl AudioBackend for CpalBackend {
    fn create_voice(&mut self, format: OutputFormat, callback: PullCallback) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let sample_format = self
            .device
            .default_output_config()
            .map_err(|e| Error::AudioEngine(format!("Failed to get output config: {e}")))?
            .sample_format();

        let config = StreamConfig {
            channels: format.channels,
            sample_rate: SampleRate(format.sample_rate),
            buffer_size: BufferSize::Default,
        };

        debug!(
            "Output config: {}Hz, {} channels, {:?}",
            format.sample_rate, format.channels, sample_format
        );

        let stream = match sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(&config, callback)?,
            SampleFormat::I16 => self.build_stream::<i16>(&config, callback)?,
            SampleFormat::U16 => self.build_stream::<u16>(&config, callback)?,
            _ => {
                return Err(Error::AudioEngine(format!(
                    "Unsupported sample format: {sample_format:?}"
                )));
            }
        };

        // Built streams may start immediately on some hosts
        stream
            .pause()
            .map_err(|e| Error::AudioEngine(format!("Failed to pause new stream: {e}")))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| Error::InvalidState("play before create_voice".to_string()))?;

        stream
            .play()
            .map_err(|e| Error::AudioEngine(format!("Failed to start stream: {e}")))
    }

    fn stop(&mut self) -> Result<()> {
        let Some(stream) = &self.stream else {
            return Ok(());
        };

        stream
            .pause()
            .map_err(|e| Error::AudioEngine(format!("Failed to pause stream: {e}")))
    }
}
