//! # Audio Capture Module
//!
//! Live microphone input via CPAL (Cross-Platform Audio Library), compiled
//! with the `mic` feature.
//!
//! ## Features
//! - Default input device selection
//! - Closest supported f32 configuration to the target sample rate
//! - Multichannel input mixed down to mono
//! - Fixed-size frames streamed through a bounded channel; when the consumer
//!   falls behind, new frames are dropped instead of blocking the audio thread

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedStreamConfigRange;
use crossbeam_channel::{Receiver, Sender};

use crate::error::{Error, Result};
use crate::pitch::Frame;
use crate::source::FrameSource;

/// Preferred capture rate in Hz.
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// Frames buffered between the audio callback and the tick loop.
const CHANNEL_CAPACITY: usize = 8;

/// Starts audio capture from the default input device.
///
/// This function:
/// 1. Selects the default audio input device
/// 2. Picks the f32 configuration closest to [`TARGET_SAMPLE_RATE`]
/// 3. Installs a callback that mixes to mono, cuts `frame_size` frames and
///    sends them with `try_send`
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Running stream handle and its sample rate
/// * `Err(Error::Device)` - No device, no usable format, or stream failure
pub fn start_audio_capture(
    sender: Sender<Vec<f32>>,
    frame_size: usize,
) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| Error::Device("no input device available".into()))?;

    let device_name = device.name().unwrap_or_else(|_| "<unnamed>".into());
    tracing::info!(device = %device_name, "using audio input device");

    let configs = device
        .supported_input_configs()
        .map_err(|e| Error::Device(e.to_string()))?
        .collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| Error::Device("no suitable f32 input format found".into()))?;

    let rate = TARGET_SAMPLE_RATE.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
    let channels = config.channels().max(1) as usize;
    let sample_rate = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();

    tracing::info!(sample_rate, channels, frame_size, "selected capture format");

    let err_fn = |err: cpal::StreamError| {
        tracing::error!("an error occurred on the audio stream: {}", err);
    };

    // Accumulates mono samples from the callback until a frame is complete.
    let mut pending = Vec::with_capacity(frame_size * 2);

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if channels == 1 {
                    pending.extend_from_slice(data);
                } else {
                    pending.extend(
                        data.chunks(channels)
                            .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32),
                    );
                }

                while pending.len() >= frame_size {
                    let frame: Vec<f32> = pending.drain(..frame_size).collect();
                    if sender.try_send(frame).is_err() {
                        tracing::trace!("frame dropped: consumer is behind");
                    }
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| Error::Device(e.to_string()))?;

    stream.play().map_err(|e| Error::Device(e.to_string()))?;

    Ok((stream, sample_rate))
}

/// Finds the f32 input configuration whose rate range is closest to
/// `target_rate`, preferring mono on equal distance.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min = c.min_sample_rate().0;
            let max = c.max_sample_rate().0;
            let distance = if (min..=max).contains(&target_rate) {
                0
            } else {
                min.abs_diff(target_rate).min(max.abs_diff(target_rate))
            };
            (distance, c.channels())
        })
}

/// The default microphone as a [`FrameSource`].
///
/// Keeps the stream alive for as long as the source exists. Dropping the
/// source stops capture.
pub struct MicFrameSource {
    stream: cpal::Stream,
    receiver: Receiver<Vec<f32>>,
    sample_rate: u32,
}

impl MicFrameSource {
    pub fn open(frame_size: usize) -> Result<Self> {
        let (sender, receiver) = crossbeam_channel::bounded(CHANNEL_CAPACITY);
        let (stream, sample_rate) = start_audio_capture(sender, frame_size)?;
        Ok(Self {
            stream,
            receiver,
            sample_rate,
        })
    }

    /// The channel frames arrive on, for use in `select!`.
    pub fn receiver(&self) -> &Receiver<Vec<f32>> {
        &self.receiver
    }

    /// Drains everything queued and returns only the newest frame.
    ///
    /// Called once per tick, so a slow tick never works through a backlog
    /// of stale audio.
    pub fn latest_frame(&self) -> Option<Frame> {
        let mut latest = None;
        while let Ok(samples) = self.receiver.try_recv() {
            latest = Some(samples);
        }
        latest.map(|samples| Frame::new(samples, self.sample_rate))
    }

    /// Pauses the stream. Frames still queued are left for the caller to
    /// discard.
    pub fn pause(&self) -> Result<()> {
        self.stream.pause().map_err(|e| Error::Device(e.to_string()))
    }
}

impl FrameSource for MicFrameSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Blocks until a frame arrives, then skips ahead to the newest one.
    fn next_frame(&mut self) -> Option<Frame> {
        let first = self.receiver.recv().ok()?;
        Some(
            self.latest_frame()
                .unwrap_or_else(|| Frame::new(first, self.sample_rate)),
        )
    }
}
