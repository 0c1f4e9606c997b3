//! Live session from the default microphone.
//!
//! The audio callback cuts frames and pushes them into a bounded channel.
//! This loop wakes on a fixed tick, analyzes only the newest frame that
//! arrived since the last tick, and stops on Ctrl+C or after `--frames`.

use clap::Args;
use crossbeam_channel::{bounded, select, tick};
use grundton_core::{FrameSource, MicFrameSource};
use std::time::{Duration, Instant};

use super::{Context, finish, print_tick};

/// Roughly one display refresh.
const TICK_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Args)]
pub struct RecordArgs {
    /// Store the summary if the session passes the save gate
    #[arg(long)]
    pub save: bool,

    /// Stop after this many analyzed frames instead of waiting for Ctrl+C
    #[arg(long, value_name = "N")]
    pub frames: Option<usize>,
}

pub fn run(args: RecordArgs, ctx: &Context) -> anyhow::Result<()> {
    let source = MicFrameSource::open(ctx.config.session.frame_size)?;

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })?;

    let mut session = ctx.session();
    session.start();
    println!(
        "Recording at {} Hz. Speak normally; press Ctrl+C to stop...\n",
        source.sample_rate()
    );

    let started = Instant::now();
    let ticker = tick(TICK_INTERVAL);
    let mut frames = 0usize;
    loop {
        select! {
            recv(shutdown_rx) -> _ => break,
            recv(ticker) -> _ => {
                if let Some(frame) = source.latest_frame() {
                    frames += 1;
                    if let Some(report) = session.tick_frame(frame) {
                        print_tick(started.elapsed().as_secs_f32(), &report);
                    }
                }
                if args.frames.is_some_and(|limit| frames >= limit) {
                    break;
                }
            }
        }
    }

    if let Err(e) = source.pause() {
        tracing::warn!(error = %e, "could not pause the input stream");
    }
    let discarded = source.receiver().try_iter().count();
    tracing::debug!(frames, discarded, "recording loop ended");

    finish(&mut session, ctx, args.save)
}
