//! Frame sources: where the frames fed to a [`RecordingSession`] come from.
//!
//! The live microphone lives in [`crate::audio`] (feature `mic`);
//! [`SliceFrameSource`] cuts frames out of a signal already in memory, such
//! as a decoded WAV file.

use crate::pitch::Frame;
use crate::session::{RecordingSession, TickReport};

/// Delivers fixed-size mono frames at a known sample rate.
pub trait FrameSource {
    fn sample_rate(&self) -> u32;

    /// The next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Consecutive, non-overlapping frames from an in-memory signal.
/// A trailing partial frame is dropped.
#[derive(Debug, Clone)]
pub struct SliceFrameSource {
    samples: Vec<f32>,
    sample_rate: u32,
    frame_size: usize,
    position: usize,
}

impl SliceFrameSource {
    pub fn new(samples: Vec<f32>, sample_rate: u32, frame_size: usize) -> Self {
        Self {
            samples,
            sample_rate,
            frame_size,
            position: 0,
        }
    }

    /// Number of frames left.
    pub fn remaining(&self) -> usize {
        if self.frame_size == 0 {
            return 0;
        }
        (self.samples.len() - self.position) / self.frame_size
    }
}

impl FrameSource for SliceFrameSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn next_frame(&mut self) -> Option<Frame> {
        if self.frame_size == 0 || self.position + self.frame_size > self.samples.len() {
            return None;
        }
        let end = self.position + self.frame_size;
        let frame = Frame::new(self.samples[self.position..end].to_vec(), self.sample_rate);
        self.position = end;
        Some(frame)
    }
}

/// Ticks `session` once per frame until `source` runs dry, handing every
/// report to `on_tick`. Returns the number of frames consumed.
pub fn run_source<S, F>(session: &mut RecordingSession, source: &mut S, mut on_tick: F) -> usize
where
    S: FrameSource + ?Sized,
    F: FnMut(&TickReport),
{
    let mut frames = 0;
    while let Some(frame) = source.next_frame() {
        frames += 1;
        if let Some(report) = session.tick_frame(frame) {
            on_tick(&report);
        }
    }
    tracing::debug!(frames, readings = session.readings().len(), "frame source exhausted");
    frames
}
