// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `carelay templates` command implementations.

use std::io::IsTerminal;

use carelay_core::types::{Template, TemplateTrigger};
use carelay_core::{CarelayError, ChannelKind};
use clap::{Args, Subcommand};

use crate::args::parse_channel;
use crate::context::CliContext;

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List templates for a channel.
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Channel to list.
    #[arg(long, value_parser = parse_channel)]
    pub channel: ChannelKind,
}

/// Run a `carelay templates` subcommand.
pub async fn run_templates(
    ctx: &CliContext,
    command: TemplateCommands,
    json: bool,
    plain: bool,
) -> Result<(), CarelayError> {
    ctx.require_token()?;
    let TemplateCommands::List(args) = command;
    ctx.ensure_enabled(args.channel)?;

    let templates = ctx.hub.templates(args.channel, false).await;
    ctx.read_failure().await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&templates).unwrap_or_else(|_| "[]".to_string())
        );
        return Ok(());
    }

    if templates.is_empty() {
        println!("no templates on {}", args.channel);
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    println!();
    println!("  {} templates", args.channel);
    println!("  {}", "-".repeat(72));
    for template in &templates {
        print_template(template, use_color);
    }
    println!();
    Ok(())
}

fn print_template(template: &Template, use_color: bool) {
    let trigger = match template.trigger() {
        TemplateTrigger::Manual => "manual",
        TemplateTrigger::Automatic => "automatic",
        TemplateTrigger::Inert => "inert",
    };
    let action = template.action_type.as_deref().unwrap_or("-");
    let preview: String = template.content.chars().take(40).collect();
    if use_color {
        use colored::Colorize;
        println!(
            "    {:<12} {:<24} {:<10} {:<20} {}",
            template.id.0,
            template.name,
            trigger.cyan(),
            action,
            preview.dimmed()
        );
    } else {
        println!(
            "    {:<12} {:<24} {:<10} {:<20} {preview}",
            template.id.0, template.name, trigger, action
        );
    }
}
