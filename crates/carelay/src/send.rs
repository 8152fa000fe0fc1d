// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `carelay send` command implementation.

use std::io::IsTerminal;

use carelay_core::types::{MessageDraft, TemplateId};
use carelay_core::{CarelayError, ChannelKind, DeliveryStatus};
use clap::Args;

use crate::args::parse_channel;
use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Channel to send through.
    #[arg(long, value_parser = parse_channel)]
    pub channel: ChannelKind,

    /// Recipient; repeat for multiple (email only).
    #[arg(long = "to", required = true)]
    pub to: Vec<String>,

    /// Message body.
    #[arg(long)]
    pub message: String,

    /// Subject line (email only).
    #[arg(long)]
    pub subject: Option<String>,

    /// CC recipient; repeat for multiple (email only).
    #[arg(long)]
    pub cc: Vec<String>,

    /// BCC recipient; repeat for multiple (email only).
    #[arg(long)]
    pub bcc: Vec<String>,

    /// Template id to send from instead of a free-form body.
    #[arg(long)]
    pub template: Option<String>,
}

/// Run `carelay send`.
pub async fn run_send(
    ctx: &CliContext,
    args: SendArgs,
    json: bool,
    plain: bool,
) -> Result<(), CarelayError> {
    ctx.require_token()?;
    ctx.ensure_enabled(args.channel)?;

    let draft = MessageDraft {
        recipients: args.to,
        body: args.message,
        subject: args.subject,
        cc: args.cc,
        bcc: args.bcc,
        template_id: args.template.map(TemplateId),
    };

    let receipt = ctx.hub.send(args.channel, &draft).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&receipt).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    let id = receipt
        .id
        .as_ref()
        .map(|id| format!(" (id {})", id.0))
        .unwrap_or_default();
    match receipt.status {
        Some(DeliveryStatus::Failed) => {
            if use_color {
                use colored::Colorize;
                println!("{} {} rejected the message{id}", "✗".red(), args.channel);
            } else {
                println!("[FAIL] {} rejected the message{id}", args.channel);
            }
            if let Some(detail) = &receipt.detail {
                println!("       {detail}");
            }
        }
        _ => {
            if use_color {
                use colored::Colorize;
                println!("{} sent via {}{id}", "✓".green(), args.channel);
            } else {
                println!("[OK] sent via {}{id}", args.channel);
            }
        }
    }

    Ok(())
}
