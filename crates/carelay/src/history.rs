// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `carelay history` command implementation.

use std::io::IsTerminal;

use carelay_core::{CarelayError, ChannelKind, DeliveryStatus, HistoryFilter, HistoryRecord};
use chrono::{DateTime, Utc};
use clap::Args;

use crate::args::{parse_channel, parse_status, parse_time};
use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Channel to show.
    #[arg(long, value_parser = parse_channel)]
    pub channel: ChannelKind,

    /// Show at most this many records.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Skip this many records.
    #[arg(long)]
    pub offset: Option<u32>,

    /// Only records delivered to this recipient.
    #[arg(long)]
    pub recipient: Option<String>,

    /// Only records with this delivery status.
    #[arg(long, value_parser = parse_status)]
    pub status: Option<DeliveryStatus>,

    /// Only records at or after this time, RFC 3339.
    #[arg(long, value_parser = parse_time)]
    pub from: Option<DateTime<Utc>>,

    /// Only records at or before this time, RFC 3339.
    #[arg(long, value_parser = parse_time)]
    pub to: Option<DateTime<Utc>>,
}

/// Run `carelay history`.
pub async fn run_history(
    ctx: &CliContext,
    args: HistoryArgs,
    json: bool,
    plain: bool,
) -> Result<(), CarelayError> {
    ctx.require_token()?;
    ctx.ensure_enabled(args.channel)?;

    let filter = HistoryFilter {
        from: args.from,
        to: args.to,
        recipient: args.recipient,
        status: args.status,
        limit: args.limit,
        offset: args.offset,
    };

    let records = ctx.hub.history(args.channel, &filter, false).await;
    ctx.read_failure().await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
        );
        return Ok(());
    }

    if records.is_empty() {
        println!("no matching messages on {}", args.channel);
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    println!();
    println!("  {} history", args.channel);
    println!("  {}", "-".repeat(72));
    for record in &records {
        print_record(record, use_color);
    }
    println!();
    Ok(())
}

fn print_record(record: &HistoryRecord, use_color: bool) {
    let when = record.sent_at.format("%Y-%m-%d %H:%M").to_string();
    let to = record.recipients.join(", ");
    let preview: String = record
        .message
        .as_deref()
        .unwrap_or("")
        .chars()
        .take(32)
        .collect();
    let status = if use_color {
        use colored::Colorize;
        match record.status {
            DeliveryStatus::Sent => record.status.to_string().green().to_string(),
            DeliveryStatus::Failed => record.status.to_string().red().to_string(),
            DeliveryStatus::Pending => record.status.to_string().yellow().to_string(),
        }
    } else {
        record.status.to_string()
    };
    println!("    {when:<17} {status:<8} {to:<24} {preview}");
}
