//! Offline session from a WAV file.

use clap::Args;
use grundton_core::{SliceFrameSource, run_source};
use std::path::PathBuf;

use super::{Context, finish, print_tick};
use crate::wav::read_wav_mono;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Store the summary if the session passes the save gate
    #[arg(long)]
    pub save: bool,

    /// Only print the session result, not every frame
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn run(args: AnalyzeArgs, ctx: &Context) -> anyhow::Result<()> {
    let (samples, sample_rate) = read_wav_mono(&args.input)?;
    let frame_size = ctx.config.session.frame_size;
    println!(
        "Analyzing {} ({} samples, {} Hz, {:.2}s)",
        args.input.display(),
        samples.len(),
        sample_rate,
        samples.len() as f32 / sample_rate.max(1) as f32
    );

    let frame_seconds = frame_size as f32 / sample_rate.max(1) as f32;
    let mut source = SliceFrameSource::new(samples, sample_rate, frame_size);
    let mut session = ctx.session();
    session.start();

    let mut index = 0;
    run_source(&mut session, &mut source, |report| {
        if !args.quiet {
            print_tick(index as f32 * frame_seconds, report);
        }
        index += 1;
    });

    finish(&mut session, ctx, args.save)
}
