// grundton-core/src/lib.rs

//! The core logic for the habitual-pitch estimator.
//! This crate turns audio frames into frequency readings, filters the
//! readings of a recording session down to their stable part, and summarizes
//! them as a dominant pitch class with circular statistics. It is completely
//! headless; storage and display belong to the caller.
//!
//! A typical session:
//!
//! ```
//! use grundton_core::{RecordingSession, SliceFrameSource, run_source, timestamp_now};
//!
//! let sr = 44100;
//! let tone: Vec<f32> = (0..2048 * 12)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 196.0 * i as f32 / sr as f32).sin())
//!     .collect();
//!
//! let mut session = RecordingSession::default();
//! session.start();
//! run_source(&mut session, &mut SliceFrameSource::new(tone, sr, 2048), |_| {});
//! assert!(session.stop().save_allowed);
//!
//! let summary = session.summarize(timestamp_now()).unwrap();
//! assert!((summary.mean_hz - 196.0).abs() < 2.0);
//! ```

#[cfg(feature = "mic")]
pub mod audio;
pub mod autocorr;
pub mod circular;
pub mod config;
pub mod error;
pub mod pitch;
pub mod robust;
pub mod session;
pub mod source;
pub mod stability;
pub mod stabilize;

pub use circular::{NoteName, Spelling, circular_mean, to_pitch_class};
pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use pitch::{Frame, FrequencyReading, PitchDetector, detect_pitch};
pub use session::{
    Aggregate, RecordingSession, SessionSummary, TickReport, aggregate_across_sessions,
    aggregate_summaries, summarize, timestamp_now,
};
pub use source::{FrameSource, SliceFrameSource, run_source};
pub use stabilize::{save_allowed, select_stable};

#[cfg(feature = "mic")]
pub use audio::MicFrameSource;
