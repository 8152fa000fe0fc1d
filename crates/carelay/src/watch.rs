// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `carelay watch` command implementation.
//!
//! Long-running mode: primes the hub, runs the background refresher, and
//! prints notices as they arrive until SIGINT or SIGTERM. Useful on a
//! reception desk machine where schedule toggles made elsewhere should show
//! up without anyone re-running a command.

use std::io::IsTerminal;

use carelay_core::CarelayError;
use carelay_hub::{Notice, NoticeLevel};
use chrono::Local;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::CliContext;

/// Run `carelay watch`.
pub async fn run_watch(ctx: &CliContext, json: bool, plain: bool) -> Result<(), CarelayError> {
    init_tracing(&ctx.config.log.level);
    ctx.require_token()?;

    let cancel = install_signal_handler();
    let mut notices = ctx.hub.subscribe_notices();
    let use_color = !plain && std::io::stdout().is_terminal();

    ctx.hub.prime().await;
    if ctx.expiry.expired() {
        return Err(CarelayError::SessionExpired);
    }
    print_summary(ctx, use_color).await;

    ctx.hub.start_refresh().await?;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            notice = notices.recv() => match notice {
                Ok(notice) => print_notice(&notice, json, use_color),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "notice stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    ctx.hub.stop_refresh().await;
    info!("watch stopped");
    Ok(())
}

async fn print_summary(ctx: &CliContext, use_color: bool) {
    println!();
    println!("  carelay watch");
    println!("  {}", "-".repeat(50));
    for &kind in ctx.hub.channels() {
        let schedules = ctx.hub.schedules_snapshot(kind).await.len();
        let templates = ctx.hub.templates_snapshot(kind).await.len();
        println!("    {kind:<10} {schedules} schedules, {templates} templates");
    }
    println!();
    if use_color {
        use colored::Colorize;
        println!("  {}", "watching for changes, Ctrl+C to stop".dimmed());
    } else {
        println!("  watching for changes, Ctrl+C to stop");
    }
    println!();
}

fn print_notice(notice: &Notice, json: bool, use_color: bool) {
    if json {
        let level = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        println!(
            "{}",
            serde_json::json!({"level": level, "message": notice.message})
        );
        return;
    }

    let stamp = Local::now().format("%H:%M:%S");
    if use_color {
        use colored::Colorize;
        match notice.level {
            NoticeLevel::Info => println!("  {stamp} {} {}", "✓".green(), notice.message),
            NoticeLevel::Error => println!("  {stamp} {} {}", "✗".red(), notice.message),
        }
    } else {
        match notice.level {
            NoticeLevel::Info => println!("  {stamp} [OK]   {}", notice.message),
            NoticeLevel::Error => println!("  {stamp} [FAIL] {}", notice.message),
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("carelay={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is
/// received.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), shutting down");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, shutting down");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signal_handler_token_starts_uncancelled() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        // Cancel manually to clean up the background task.
        token.cancel();
    }
}
