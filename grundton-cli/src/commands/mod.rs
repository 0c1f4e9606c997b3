//! Subcommand implementations and what they share.

pub mod analyze;
#[cfg(feature = "mic")]
pub mod record;
pub mod sessions;
pub mod summary;

use anyhow::Context as _;
use grundton_core::circular::{hz_to_note_name, pitch_class_name};
use grundton_core::{AnalysisConfig, RecordingSession, Spelling, TickReport, timestamp_now};
use std::path::{Path, PathBuf};

use crate::store::SessionStore;

/// Settings resolved from the global flags.
pub struct Context {
    pub config: AnalysisConfig,
    pub store_path: PathBuf,
    pub spelling: Spelling,
}

impl Context {
    pub fn new(
        config: Option<&Path>,
        store: Option<PathBuf>,
        german: bool,
    ) -> anyhow::Result<Self> {
        let config = match config {
            Some(path) => AnalysisConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };
        let spelling = if german { Spelling::German } else { Spelling::English };
        Ok(Self {
            config,
            store_path: store.unwrap_or_else(SessionStore::default_path),
            spelling,
        })
    }

    pub fn session(&self) -> RecordingSession {
        RecordingSession::new(self.config).with_spelling(self.spelling)
    }
}

/// One line per voiced tick: time, frequency, note, stability, preview.
pub fn print_tick(seconds: f32, report: &TickReport) {
    let (Some(hz), Some(note)) = (report.frequency, report.note.as_ref()) else {
        return;
    };
    let preview = report
        .preview
        .as_ref()
        .map(|p| format!("{} ({:.0} ct)", p.class_name, p.cents))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:7.2}s  {:7.1} Hz  {:<14}  stability {:.2}  class {}",
        seconds,
        hz,
        note.to_string(),
        report.stability,
        preview
    );
}

/// Stops the session, reports the save gate and stores the summary when
/// `save` is set and the gate is open.
pub fn finish(session: &mut RecordingSession, ctx: &Context, save: bool) -> anyhow::Result<()> {
    let outcome = session.stop();
    println!();
    println!("{} readings, {} stable", outcome.raw_count, outcome.stable_count);
    if let Some(preview) = session.preview() {
        println!("Session pitch class: {} ({:.0} ct)", preview.class_name, preview.cents);
    }

    let min_stable = ctx.config.session.min_stable_samples;
    let Some(summary) = session.summarize(timestamp_now()) else {
        println!("Not enough stable readings to save (need {min_stable}).");
        return Ok(());
    };
    println!(
        "Session mean: {:.1} Hz ({})",
        summary.mean_hz,
        hz_to_note_name(summary.mean_hz, ctx.spelling)
    );
    if !save {
        println!("Run again with --save to store this session.");
        return Ok(());
    }

    let mut store = SessionStore::load(&ctx.store_path);
    store.push(summary);
    store.save(&ctx.store_path)?;
    tracing::info!(
        path = %ctx.store_path.display(),
        sessions = store.sessions.len(),
        "session saved"
    );

    if let Some(aggregate) = store.aggregate() {
        println!(
            "Long-run estimate: {} ({:.0} ct), {:.1} Hz over {} sessions",
            pitch_class_name(aggregate.circular_mean_cents, ctx.spelling),
            aggregate.circular_mean_cents,
            aggregate.mean_hz,
            aggregate.session_count
        );
    }
    Ok(())
}
