//! # Session Module
//!
//! Everything that happens between "start recording" and "save":
//! - [`RecordingSession`]: the owned per-session state driven once per tick
//! - [`SessionSummary`]: the immutable record handed to the session store
//! - [`aggregate_across_sessions`]: the long-run estimate over stored sessions
//!
//! The long-run estimate is always recomputed from the stored samples, never
//! averaged from earlier summaries, since a mean of circular means drifts.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::circular::{self, NoteName, Spelling};
use crate::config::AnalysisConfig;
use crate::pitch::{Frame, FrequencyReading, PitchDetector};
use crate::stability::stability_score;
use crate::stabilize::{save_allowed, select_stable};

/// Summary of one completed session, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Milliseconds since the Unix epoch at which the session was saved
    pub timestamp_ms: u64,
    /// The first stable readings in Hz, kept for later re-aggregation
    pub samples: Vec<f32>,
    /// Arithmetic mean of all stable readings in Hz
    pub mean_hz: f32,
    /// Circular mean pitch class in cents (0 = C)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circular_mean_cents: Option<f32>,
    /// Number of stable readings the summary was computed from
    pub sample_count: usize,
}

/// Summarizes already-filtered readings.
///
/// `mean_hz` and the circular mean use every reading; only the first
/// `sample_cap` are retained in `samples`. Returns `None` for an empty input.
pub fn summarize(stable: &[f32], timestamp_ms: u64, sample_cap: usize) -> Option<SessionSummary> {
    if stable.is_empty() {
        return None;
    }
    let mean_hz = stable.iter().sum::<f32>() / stable.len() as f32;
    Some(SessionSummary {
        timestamp_ms,
        samples: stable.iter().copied().take(sample_cap).collect(),
        mean_hz,
        circular_mean_cents: circular::circular_mean_hz(stable),
        sample_count: stable.len(),
    })
}

/// Long-run estimate over the stored samples of many sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub mean_hz: f32,
    pub circular_mean_cents: f32,
    pub session_count: usize,
    pub sample_count: usize,
}

/// Pools the samples of every session and summarizes the union.
///
/// History is not capped: the pool grows with the number of sessions.
/// Returns `None` when there are no samples at all.
pub fn aggregate_across_sessions<'a, I>(sessions: I) -> Option<Aggregate>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut session_count = 0;
    let mut pooled = Vec::new();
    for samples in sessions {
        session_count += 1;
        pooled.extend_from_slice(samples);
    }
    if pooled.is_empty() {
        return None;
    }
    let circular_mean_cents = circular::circular_mean_hz(&pooled)?;
    Some(Aggregate {
        mean_hz: pooled.iter().sum::<f32>() / pooled.len() as f32,
        circular_mean_cents,
        session_count,
        sample_count: pooled.len(),
    })
}

/// [`aggregate_across_sessions`] over stored summaries.
pub fn aggregate_summaries(summaries: &[SessionSummary]) -> Option<Aggregate> {
    aggregate_across_sessions(summaries.iter().map(|s| s.samples.as_slice()))
}

/// Milliseconds since the Unix epoch, for stamping summaries.
pub fn timestamp_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Dominant pitch class of the session so far.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchClassPreview {
    pub cents: f32,
    pub class_name: &'static str,
}

/// What one tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// The frame's fundamental, or `None` for an unvoiced frame
    pub frequency: FrequencyReading,
    /// Nearest note to `frequency`
    pub note: Option<NoteName>,
    /// Stability of the most recent readings (0..1)
    pub stability: f32,
    /// Live pitch-class estimate; only recomputed on voiced frames
    pub preview: Option<PitchClassPreview>,
}

/// Lifecycle of a [`RecordingSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// Never started
    Idle,
    /// Accepting frames
    Recording,
    /// Stopped; readings are kept until the next start
    Stopped,
}

/// Outcome of stopping a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopOutcome {
    pub raw_count: usize,
    pub stable_count: usize,
    pub save_allowed: bool,
}

/// The state of one recording session, owned by whoever drives the ticks.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    config: AnalysisConfig,
    detector: PitchDetector,
    spelling: Spelling,
    state: RecordingState,
    readings: Vec<f32>,
}

impl RecordingSession {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            detector: PitchDetector::new(config.detector),
            config,
            spelling: Spelling::default(),
            state: RecordingState::Idle,
            readings: Vec::new(),
        }
    }

    pub fn with_spelling(mut self, spelling: Spelling) -> Self {
        self.spelling = spelling;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// Raw readings accepted so far.
    pub fn readings(&self) -> &[f32] {
        &self.readings
    }

    /// Clears previous readings and starts accepting frames.
    pub fn start(&mut self) {
        self.readings.clear();
        self.state = RecordingState::Recording;
        tracing::debug!("recording started");
    }

    /// Runs one frame through the pipeline.
    ///
    /// The frame is consumed (DC-corrected in place). Frames arriving while
    /// the session is not recording are discarded and yield `None`.
    pub fn tick(&mut self, samples: &mut [f32], sample_rate: u32) -> Option<TickReport> {
        if !self.is_recording() {
            tracing::trace!("frame discarded: not recording");
            return None;
        }

        let frequency = self.detector.detect(samples, sample_rate);
        let Some(hz) = frequency else {
            return Some(TickReport {
                frequency: None,
                note: None,
                stability: self.stability(),
                preview: None,
            });
        };

        self.readings.push(hz);
        Some(TickReport {
            frequency,
            note: Some(circular::hz_to_note_name(hz, self.spelling)),
            stability: self.stability(),
            preview: self.preview(),
        })
    }

    /// Stability score of the most recent readings.
    pub fn stability(&self) -> f32 {
        stability_score(
            &self.readings,
            self.config.session.stability_window,
            self.config.session.stability_min_readings,
        )
    }

    /// [`RecordingSession::tick`] for an owned [`Frame`].
    pub fn tick_frame(&mut self, mut frame: Frame) -> Option<TickReport> {
        self.tick(&mut frame.samples, frame.sample_rate)
    }

    /// The stable subset of the readings so far.
    pub fn stable(&self) -> Vec<f32> {
        select_stable(&self.readings, &self.config.filter)
    }

    /// Live pitch-class estimate over the stable readings.
    pub fn preview(&self) -> Option<PitchClassPreview> {
        let cents = circular::circular_mean_hz(&self.stable())?;
        Some(PitchClassPreview {
            cents,
            class_name: circular::pitch_class_name(cents, self.spelling),
        })
    }

    /// Whether enough stable readings exist to store this session.
    pub fn can_save(&self) -> bool {
        save_allowed(
            &self.readings,
            &self.config.filter,
            self.config.session.min_stable_samples,
        )
    }

    /// Stops accepting frames and evaluates the save gate.
    pub fn stop(&mut self) -> StopOutcome {
        self.state = RecordingState::Stopped;
        let outcome = StopOutcome {
            raw_count: self.readings.len(),
            stable_count: self.stable().len(),
            save_allowed: self.can_save(),
        };
        tracing::debug!(?outcome, "recording stopped");
        outcome
    }

    /// The record to store, or `None` if the save gate is closed.
    pub fn summarize(&self, timestamp_ms: u64) -> Option<SessionSummary> {
        if !self.can_save() {
            return None;
        }
        summarize(
            &self.stable(),
            timestamp_ms,
            self.config.session.stored_sample_cap,
        )
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
