//! Long-run estimate over the stored sessions.

use grundton_core::circular::{hz_to_note_name, pitch_class_name};

use super::Context;
use crate::store::SessionStore;

pub fn run(ctx: &Context) -> anyhow::Result<()> {
    let store = SessionStore::load(&ctx.store_path);
    let Some(aggregate) = store.aggregate() else {
        println!("No stored sessions yet. Record or analyze one with --save.");
        return Ok(());
    };

    println!(
        "Habitual pitch class: {} ({:.0} ct)",
        pitch_class_name(aggregate.circular_mean_cents, ctx.spelling),
        aggregate.circular_mean_cents
    );
    println!(
        "Mean frequency:       {:.1} Hz ({})",
        aggregate.mean_hz,
        hz_to_note_name(aggregate.mean_hz, ctx.spelling)
    );
    println!(
        "Based on:             {} sessions, {} samples",
        aggregate.session_count, aggregate.sample_count
    );
    Ok(())
}
