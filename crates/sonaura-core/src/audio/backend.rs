//! cpal device streams

use super::level::rms_level;
use super::mixer::{Mixer, MixerControl};
use super::TrackBuffer;
use crate::config::FiltersConfig;
use crate::{CoreError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;
use crossbeam_channel::Sender;
use std::sync::Arc;
use tracing::{error, info};

fn audio_err(e: impl std::fmt::Display) -> CoreError {
    CoreError::Audio(e.to_string())
}

/// Output stream driving a [`Mixer`]
pub struct CpalOutput {
    sample_rate: u32,
    channels: usize,
    _stream: cpal::Stream,
}

impl CpalOutput {
    /// Open the default output device and start rendering the tracks
    pub fn start(
        buffers: Vec<Arc<TrackBuffer>>,
        filters: &FiltersConfig,
    ) -> Result<(Self, MixerControl)> {
        let host = cpal::default_host();
        info!("Audio host: {:?}", host.id());

        let device = host
            .default_output_device()
            .ok_or_else(|| CoreError::Audio("No audio output device found".to_string()))?;
        info!("Output device: {}", device.name().map_err(audio_err)?);

        let supported = device.default_output_config().map_err(audio_err)?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let (mixer, control) = Mixer::new(buffers, sample_rate, &filters.bass, &filters.full);

        let stream = match format {
            cpal::SampleFormat::F32 => build_output::<f32>(&device, &config, mixer, channels),
            cpal::SampleFormat::I16 => build_output::<i16>(&device, &config, mixer, channels),
            cpal::SampleFormat::U16 => build_output::<u16>(&device, &config, mixer, channels),
            other => Err(CoreError::Audio(format!(
                "Unsupported output sample format: {:?}",
                other
            ))),
        }?;

        stream.play().map_err(audio_err)?;
        info!("Output stream started at {} Hz, {} channels", sample_rate, channels);

        Ok((
            Self {
                sample_rate,
                channels,
                _stream: stream,
            },
            control,
        ))
    }

    /// Device sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Device channel count
    pub fn channels(&self) -> usize {
        self.channels
    }
}

fn build_output<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: Mixer,
    channels: usize,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mut scratch: Vec<f32> = Vec::new();
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.resize(data.len(), 0.0);
                mixer.render(&mut scratch, channels);
                for (out, sample) in data.iter_mut().zip(scratch.iter()) {
                    *out = T::from_sample(*sample);
                }
            },
            |err| error!("Output stream error: {}", err),
            None,
        )
        .map_err(audio_err)
}

/// Microphone stream reporting one RMS level per block
pub struct CpalInput {
    _stream: cpal::Stream,
}

impl CpalInput {
    /// Open the default input device
    pub fn start(levels: Sender<f32>) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| CoreError::Audio("No audio input device found".to_string()))?;
        info!("Input device: {}", device.name().map_err(audio_err)?);

        let supported = device.default_input_config().map_err(audio_err)?;
        let format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let stream = match format {
            cpal::SampleFormat::F32 => build_input::<f32>(&device, &config, levels),
            cpal::SampleFormat::I16 => build_input::<i16>(&device, &config, levels),
            cpal::SampleFormat::U16 => build_input::<u16>(&device, &config, levels),
            other => Err(CoreError::Audio(format!(
                "Unsupported input sample format: {:?}",
                other
            ))),
        }?;

        stream.play().map_err(audio_err)?;
        info!("Input stream started");
        Ok(Self { _stream: stream })
    }
}

fn build_input<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    levels: Sender<f32>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let mut scratch: Vec<f32> = Vec::new();
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                scratch.clear();
                scratch.extend(data.iter().map(|s| s.to_sample::<f32>()));
                // Dropped when full; the tick only reads the newest level
                let _ = levels.try_send(rms_level(&scratch));
            },
            |err| error!("Input stream error: {}", err),
            None,
        )
        .map_err(audio_err)
}
