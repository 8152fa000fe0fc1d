// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Carelay - clinic messaging console for the ClinicPro backend.
//!
//! This is the binary entry point for the carelay CLI.

use std::io::IsTerminal;

use carelay_core::CarelayError;
use clap::{Parser, Subcommand};

mod args;
mod auth;
mod check;
mod context;
mod history;
mod schedules;
mod send;
mod templates;
mod watch;

use context::CliContext;

/// Carelay - clinic messaging console for the ClinicPro backend.
#[derive(Parser, Debug)]
#[command(name = "carelay", version, about, long_about = None)]
struct Cli {
    /// Emit structured JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    /// Disable colors and interactive decorations.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a backend session token locally.
    Login(auth::LoginArgs),
    /// Clear the stored session.
    Logout,
    /// Send a message now.
    Send(send::SendArgs),
    /// Manage scheduled messages.
    Schedules {
        #[command(subcommand)]
        command: schedules::ScheduleCommands,
    },
    /// List message templates.
    Templates {
        #[command(subcommand)]
        command: templates::TemplateCommands,
    },
    /// Show delivery history.
    History(history::HistoryArgs),
    /// Probe channel connectivity.
    Check(check::CheckArgs),
    /// Run in the foreground, keeping collections fresh and printing notices.
    Watch,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match carelay_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            carelay_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let plain = cli.plain;
    if let Err(e) = run(cli, config).await {
        report_error(&e, plain);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: carelay_config::CarelayConfig) -> Result<(), CarelayError> {
    let ctx = CliContext::build(config)?;
    let (json, plain) = (cli.json, cli.plain);

    match cli.command {
        Commands::Login(args) => auth::run_login(&ctx, args, json, plain),
        Commands::Logout => auth::run_logout(&ctx, json, plain),
        Commands::Send(args) => send::run_send(&ctx, args, json, plain).await,
        Commands::Schedules { command } => {
            schedules::run_schedules(&ctx, command, json, plain).await
        }
        Commands::Templates { command } => {
            templates::run_templates(&ctx, command, json, plain).await
        }
        Commands::History(args) => history::run_history(&ctx, args, json, plain).await,
        Commands::Check(args) => check::run_check(&ctx, args, json, plain).await,
        Commands::Watch => watch::run_watch(&ctx, json, plain).await,
    }
}

fn report_error(e: &CarelayError, plain: bool) {
    let use_color = !plain && std::io::stderr().is_terminal();
    if use_color {
        use colored::Colorize;
        eprintln!("{} {e}", "error:".red().bold());
    } else {
        eprintln!("error: {e}");
    }
    if matches!(e, CarelayError::SessionExpired) {
        eprintln!("run `carelay login --token <token>` to start a new session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelay_core::{ChannelKind, Recurrence};

    #[test]
    fn parses_send_with_repeated_recipients() {
        let cli = Cli::try_parse_from([
            "carelay", "send", "--channel", "email", "--to", "a@x.com", "--to", "b@x.com",
            "--message", "hi", "--subject", "Checkup",
        ])
        .unwrap();
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.channel, ChannelKind::Email);
                assert_eq!(args.to, vec!["a@x.com", "b@x.com"]);
                assert_eq!(args.subject.as_deref(), Some("Checkup"));
            }
            other => panic!("parsed {other:?}"),
        }
    }

    #[test]
    fn parses_schedule_create_with_recurrence() {
        let cli = Cli::try_parse_from([
            "carelay", "schedules", "create", "--channel", "sms", "--to", "+15550001111",
            "--message", "reminder", "--at", "2026-09-01T09:00:00Z", "--every", "weekly",
        ])
        .unwrap();
        match cli.command {
            Commands::Schedules {
                command: schedules::ScheduleCommands::Create(args),
            } => {
                assert_eq!(args.channel, ChannelKind::Sms);
                assert_eq!(args.every, Recurrence::Weekly);
            }
            other => panic!("parsed {other:?}"),
        }
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::try_parse_from([
            "carelay", "schedules", "list", "--channel", "whatsapp", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(!cli.plain);
    }

    #[test]
    fn toggle_rejects_both_directions_at_once() {
        let parsed = Cli::try_parse_from([
            "carelay", "schedules", "toggle", "--channel", "sms", "s1", "--pause", "--resume",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn unknown_channel_is_a_parse_error() {
        let parsed = Cli::try_parse_from([
            "carelay", "send", "--channel", "fax", "--to", "x", "--message", "hi",
        ]);
        assert!(parsed.is_err());
    }
}
