// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `carelay check` command implementation.
//!
//! Probes each configured channel's provider through the backend and prints
//! a diagnostic summary. A dead provider is a reported result, not a command
//! failure; only an unusable session makes the command itself fail.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use carelay_core::types::ConnectionStatus;
use carelay_core::{CarelayError, ChannelKind};
use clap::Args;
use serde::Serialize;

use crate::args::parse_channel;
use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Probe a single channel instead of all enabled ones.
    #[arg(long, value_parser = parse_channel)]
    pub channel: Option<ChannelKind>,
}

/// One probe outcome, also the `--json` row shape.
#[derive(Debug, Serialize)]
struct ChannelCheck {
    channel: ChannelKind,
    connected: bool,
    provider: Option<String>,
    detail: Option<String>,
    duration_ms: u128,
}

/// Run `carelay check`.
pub async fn run_check(
    ctx: &CliContext,
    args: CheckArgs,
    json: bool,
    plain: bool,
) -> Result<(), CarelayError> {
    ctx.require_token()?;

    let mut results = Vec::new();
    match args.channel {
        Some(kind) => {
            ctx.ensure_enabled(kind)?;
            let start = Instant::now();
            let status = ctx.hub.check_connection(kind).await;
            results.push(to_check(kind, status, start.elapsed()));
        }
        None => {
            for (kind, status, duration) in ctx.hub.check_connections().await {
                results.push(to_check(kind, status, duration));
            }
        }
    }

    if ctx.expiry.expired() {
        return Err(CarelayError::SessionExpired);
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).unwrap_or_else(|_| "[]".to_string())
        );
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    println!();
    println!("  carelay check");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    for result in &results {
        let duration_ms = result.duration_ms;
        let line = if result.connected {
            let provider = result.provider.as_deref().unwrap_or("connected");
            if use_color {
                use colored::Colorize;
                format!(
                    "    {} {:<10} {provider} ({duration_ms}ms)",
                    "✓".green(),
                    result.channel
                )
            } else {
                format!("    [OK]   {:<10} {provider} ({duration_ms}ms)", result.channel)
            }
        } else {
            fail_count += 1;
            let detail = result.detail.as_deref().unwrap_or("not connected");
            if use_color {
                use colored::Colorize;
                format!(
                    "    {} {:<10} {} ({duration_ms}ms)",
                    "✗".red(),
                    result.channel,
                    detail.red()
                )
            } else {
                format!("    [FAIL] {:<10} {detail} ({duration_ms}ms)", result.channel)
            }
        };
        println!("{line}");
    }

    println!();
    if fail_count > 0 {
        let channel_word = if fail_count == 1 { "channel" } else { "channels" };
        println!("  {fail_count} {channel_word} unreachable.");
    } else {
        println!("  All channels connected.");
    }
    println!();

    Ok(())
}

fn to_check(kind: ChannelKind, status: ConnectionStatus, duration: Duration) -> ChannelCheck {
    ChannelCheck {
        channel: kind,
        connected: status.connected,
        provider: status.provider,
        detail: status.detail,
        duration_ms: duration.as_millis(),
    }
}
