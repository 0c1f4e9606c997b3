//! Stored session management.

use chrono::{DateTime, Local, TimeZone, Utc};
use clap::{Args, Subcommand};
use grundton_core::circular::pitch_class_name;
use std::fmt::Display;

use super::Context;
use crate::store::SessionStore;

#[derive(Args)]
pub struct SessionsArgs {
    #[command(subcommand)]
    command: SessionsCommand,
}

#[derive(Subcommand)]
enum SessionsCommand {
    /// List stored sessions, newest first
    List,

    /// Delete every stored session
    Clear {
        /// Don't ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(args: SessionsArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.command {
        SessionsCommand::List => {
            let store = SessionStore::load(&ctx.store_path);
            if store.sessions.is_empty() {
                println!("No stored sessions.");
                return Ok(());
            }
            println!("{} sessions in {}", store.sessions.len(), ctx.store_path.display());
            for (i, session) in store.sessions.iter().enumerate() {
                let class = session
                    .circular_mean_cents
                    .map(|c| format!("{} ({:.0} ct)", pitch_class_name(c, ctx.spelling), c))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:>3}  {:<19}  {:7.1} Hz  {:<12}  {} samples",
                    i + 1,
                    format_timestamp(session.timestamp_ms, &Local),
                    session.mean_hz,
                    class,
                    session.sample_count
                );
            }
        }
        SessionsCommand::Clear { yes } => {
            if !yes {
                let count = SessionStore::load(&ctx.store_path).sessions.len();
                anyhow::bail!("refusing to delete {count} stored sessions without --yes");
            }
            if SessionStore::clear(&ctx.store_path)? {
                tracing::info!(path = %ctx.store_path.display(), "session store cleared");
                println!("All sessions deleted.");
            } else {
                println!("No stored sessions.");
            }
        }
    }
    Ok(())
}

/// Formats a stored epoch-millisecond timestamp in `tz`. Timestamps chrono
/// cannot represent are printed as raw milliseconds.
fn format_timestamp<Tz>(timestamp_ms: u64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|utc| utc.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{timestamp_ms} ms"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_listed_as_dates() {
        assert_eq!(format_timestamp(1_700_000_000_000, &Utc), "2023-11-14 22:13:20");
        assert_eq!(format_timestamp(0, &Utc), "1970-01-01 00:00:00");
    }

    #[test]
    fn unrepresentable_timestamp_falls_back_to_millis() {
        assert_eq!(format_timestamp(u64::MAX, &Utc), format!("{} ms", u64::MAX));
    }
}
