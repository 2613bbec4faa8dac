//! Output stream setup on the default cpal device.

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, SampleFormat, SampleRate, StreamConfig, SupportedBufferSize,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    CHANNELS, FRAMES_PER_BUFFER, SAMPLE_RATE,
};

use super::renderer::Renderer;

/// Fixed operating parameters of the output stream.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames_per_buffer: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            channels: CHANNELS,
            frames_per_buffer: FRAMES_PER_BUFFER,
        }
    }
}

impl AudioConfig {
    /// Time between callbacks, in seconds.
    pub fn buffer_period(&self) -> f64 {
        self.frames_per_buffer as f64 / self.sample_rate as f64
    }
}

/// A running output stream. Dropping it closes the stream.
pub struct AudioOutput {
    stream: cpal::Stream,
    config: AudioConfig,
    device_name: String,
    fixed_buffer: bool,
}

impl AudioOutput {
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Whether the device accepted the requested fixed buffer size.
    pub fn has_fixed_buffer(&self) -> bool {
        self.fixed_buffer
    }

    /// Stop requesting buffers and release the device.
    pub fn close(self) {
        if let Err(e) = self.stream.pause() {
            tracing::warn!("Failed to pause stream on close: {}", e);
        }
        tracing::info!(device = %self.device_name, "audio stream closed");
    }
}

fn unavailable(err: impl std::fmt::Display) -> Error {
    Error::AudioBackendUnavailable(err.to_string())
}

/// Open the default output device and start `renderer` on it.
///
/// Any failure here is fatal for the player: there is nothing to play
/// through.
pub fn open_output(config: AudioConfig, renderer: Renderer) -> Result<AudioOutput> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| unavailable("no default output device available"))?;
    let device_name = device.name().unwrap_or_else(|_| "<unnamed>".to_string());

    let buffer_size = negotiate_buffer_size(&device, &config, &device_name)?;
    let fixed_buffer = matches!(buffer_size, BufferSize::Fixed(_));
    let stream_config = StreamConfig {
        channels: config.channels,
        sample_rate: SampleRate(config.sample_rate),
        buffer_size,
    };

    let mut renderer = renderer;
    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| renderer.render(data),
            |err| tracing::error!("Audio stream error: {}", err),
            None,
        )
        .map_err(unavailable)?;
    stream.play().map_err(unavailable)?;

    tracing::info!(
        device = %device_name,
        sample_rate = config.sample_rate,
        channels = config.channels,
        frames = config.frames_per_buffer,
        fixed_buffer,
        "audio stream started"
    );

    Ok(AudioOutput {
        stream,
        config,
        device_name,
        fixed_buffer,
    })
}

/// Check the device can do f32 at our rate/channels, and pick a fixed buffer
/// size when the device allows it.
fn negotiate_buffer_size(
    device: &cpal::Device,
    config: &AudioConfig,
    device_name: &str,
) -> Result<BufferSize> {
    let rate = SampleRate(config.sample_rate);
    let range = device
        .supported_output_configs()
        .map_err(unavailable)?
        .find(|r| {
            r.channels() == config.channels
                && r.sample_format() == SampleFormat::F32
                && r.min_sample_rate() <= rate
                && rate <= r.max_sample_rate()
        })
        .ok_or_else(|| {
            unavailable(format!(
                "{device_name} has no f32 output at {} Hz with {} channels",
                config.sample_rate, config.channels
            ))
        })?;

    let frames = config.frames_per_buffer;
    match range.buffer_size() {
        SupportedBufferSize::Range { min, max } if (*min..=*max).contains(&frames) => {
            Ok(BufferSize::Fixed(frames))
        }
        other => {
            tracing::warn!(
                "{} cannot use {} frame buffers ({:?}), using device default",
                device_name,
                frames,
                other
            );
            Ok(BufferSize::Default)
        }
    }
}
