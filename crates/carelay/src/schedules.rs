// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `carelay schedules` command implementations.

use std::io::IsTerminal;

use carelay_core::types::{Schedule, ScheduleDraft, ScheduleId, TemplateId};
use carelay_core::{CarelayError, ChannelKind, Recurrence};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use crate::args::{parse_channel, parse_recurrence, parse_time};
use crate::context::CliContext;

#[derive(Subcommand, Debug)]
pub enum ScheduleCommands {
    /// List schedules for a channel.
    List(ListArgs),
    /// Create a schedule.
    Create(CreateArgs),
    /// Delete a schedule.
    Delete(IdArgs),
    /// Pause or resume a schedule.
    Toggle(ToggleArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Channel to list.
    #[arg(long, value_parser = parse_channel)]
    pub channel: ChannelKind,

    /// Show only armed schedules.
    #[arg(long, conflicts_with = "paused")]
    pub active: bool,

    /// Show only paused schedules.
    #[arg(long)]
    pub paused: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Channel to schedule on.
    #[arg(long, value_parser = parse_channel)]
    pub channel: ChannelKind,

    /// Recipient; repeat for multiple (email only).
    #[arg(long = "to", required = true)]
    pub to: Vec<String>,

    /// Message body.
    #[arg(long)]
    pub message: String,

    /// When to send, RFC 3339.
    #[arg(long, value_parser = parse_time)]
    pub at: DateTime<Utc>,

    /// How often to repeat.
    #[arg(long, value_parser = parse_recurrence, default_value = "once")]
    pub every: Recurrence,

    /// Subject line (email only).
    #[arg(long)]
    pub subject: Option<String>,

    /// Template id to send from.
    #[arg(long)]
    pub template: Option<String>,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Channel the schedule belongs to.
    #[arg(long, value_parser = parse_channel)]
    pub channel: ChannelKind,

    /// Schedule id.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Channel the schedule belongs to.
    #[arg(long, value_parser = parse_channel)]
    pub channel: ChannelKind,

    /// Schedule id.
    pub id: String,

    /// Arm the schedule.
    #[arg(long, conflicts_with = "pause")]
    pub resume: bool,

    /// Disarm the schedule without deleting it.
    #[arg(long)]
    pub pause: bool,
}

/// Run a `carelay schedules` subcommand.
pub async fn run_schedules(
    ctx: &CliContext,
    command: ScheduleCommands,
    json: bool,
    plain: bool,
) -> Result<(), CarelayError> {
    ctx.require_token()?;
    match command {
        ScheduleCommands::List(args) => run_list(ctx, args, json, plain).await,
        ScheduleCommands::Create(args) => run_create(ctx, args, json, plain).await,
        ScheduleCommands::Delete(args) => run_delete(ctx, args, json, plain).await,
        ScheduleCommands::Toggle(args) => run_toggle(ctx, args, json, plain).await,
    }
}

async fn run_list(
    ctx: &CliContext,
    args: ListArgs,
    json: bool,
    plain: bool,
) -> Result<(), CarelayError> {
    ctx.ensure_enabled(args.channel)?;

    ctx.hub.schedules(args.channel, false).await;
    ctx.read_failure().await?;

    let schedules = if args.active {
        ctx.hub.active_schedules(args.channel).await
    } else if args.paused {
        ctx.hub.inactive_schedules(args.channel).await
    } else {
        ctx.hub.schedules_snapshot(args.channel).await
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&schedules).unwrap_or_else(|_| "[]".to_string())
        );
        return Ok(());
    }

    if schedules.is_empty() {
        println!("no schedules on {}", args.channel);
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    println!();
    println!("  {} schedules", args.channel);
    println!("  {}", "-".repeat(72));
    for schedule in &schedules {
        print_schedule(schedule, use_color);
    }
    println!();
    Ok(())
}

fn print_schedule(schedule: &Schedule, use_color: bool) {
    let when = schedule.scheduled_time.format("%Y-%m-%d %H:%M UTC");
    let to = schedule.recipients.join(", ");
    let state = if use_color {
        use colored::Colorize;
        if schedule.is_active {
            "active".green().to_string()
        } else {
            "paused".yellow().to_string()
        }
    } else if schedule.is_active {
        "active".to_string()
    } else {
        "paused".to_string()
    };
    println!(
        "    {:<12} {:<8} {when}  {:<8} {to}",
        schedule.id.0, schedule.recurrence, state
    );
}

async fn run_create(
    ctx: &CliContext,
    args: CreateArgs,
    json: bool,
    plain: bool,
) -> Result<(), CarelayError> {
    ctx.ensure_enabled(args.channel)?;

    let mut draft = ScheduleDraft::new(args.to, args.message, args.at);
    draft.recurrence = args.every;
    draft.subject = args.subject;
    draft.template_id = args.template.map(TemplateId);

    let created = ctx.hub.create_schedule(args.channel, &draft).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&created).unwrap_or_else(|_| "null".to_string())
        );
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    let id = created
        .map(|s| format!(" (id {})", s.id.0))
        .unwrap_or_default();
    if use_color {
        use colored::Colorize;
        println!("{} schedule created on {}{id}", "✓".green(), args.channel);
    } else {
        println!("[OK] schedule created on {}{id}", args.channel);
    }
    Ok(())
}

async fn run_delete(
    ctx: &CliContext,
    args: IdArgs,
    json: bool,
    plain: bool,
) -> Result<(), CarelayError> {
    ctx.ensure_enabled(args.channel)?;

    let id = ScheduleId(args.id);
    ctx.hub.delete_schedule(args.channel, &id).await?;

    if json {
        println!("{}", serde_json::json!({"deleted": id.0}));
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    if use_color {
        use colored::Colorize;
        println!("{} schedule {} deleted", "✓".green(), id.0);
    } else {
        println!("[OK] schedule {} deleted", id.0);
    }
    Ok(())
}

async fn run_toggle(
    ctx: &CliContext,
    args: ToggleArgs,
    json: bool,
    plain: bool,
) -> Result<(), CarelayError> {
    ctx.ensure_enabled(args.channel)?;

    if args.resume == args.pause {
        return Err(CarelayError::Validation(
            "pass exactly one of --resume or --pause".into(),
        ));
    }
    let active = args.resume;

    let id = ScheduleId(args.id);
    ctx.hub.toggle_schedule(args.channel, &id, active).await?;

    let verb = if active { "resumed" } else { "paused" };
    if json {
        println!(
            "{}",
            serde_json::json!({"schedule": id.0, "is_active": active})
        );
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    if use_color {
        use colored::Colorize;
        println!("{} schedule {} {verb}", "✓".green(), id.0);
    } else {
        println!("[OK] schedule {} {verb}", id.0);
    }
    Ok(())
}
