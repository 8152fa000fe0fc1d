// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `carelay login` and `carelay logout` command implementations.
//!
//! The backend issues tokens out of band; these commands only manage the
//! local session file. Login verifies nothing — `carelay check` is the probe.

use std::io::IsTerminal;

use carelay_core::CarelayError;
use clap::Args;
use serde::Serialize;

use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Bearer token for the backend session.
    #[arg(long)]
    pub token: String,

    /// Remember a username and password pair so an expired session can be
    /// re-established without digging out credentials.
    #[arg(long, num_args = 2, value_names = ["USER", "PASS"])]
    pub remember: Option<Vec<String>>,
}

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
struct SessionOutput {
    status: &'static str,
    session_file: String,
    remembered: bool,
}

/// Run `carelay login`.
pub fn run_login(
    ctx: &CliContext,
    args: LoginArgs,
    json: bool,
    plain: bool,
) -> Result<(), CarelayError> {
    ctx.session.set_token(args.token)?;

    let mut remembered = false;
    if let Some(pair) = args.remember
        && let [user, pass] = pair.as_slice()
    {
        ctx.session.remember(user.as_str(), pass.as_str())?;
        remembered = true;
    }

    let session_file = ctx.session.path().to_string_lossy().into_owned();
    if json {
        let out = SessionOutput {
            status: "logged in",
            session_file,
            remembered,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        if use_color {
            use colored::Colorize;
            println!("{} session stored in {session_file}", "✓".green());
        } else {
            println!("[OK] session stored in {session_file}");
        }
        if remembered {
            println!("     login remembered for re-authentication");
        }
    }

    Ok(())
}

/// Run `carelay logout`. Drops the token and any remembered login.
pub fn run_logout(ctx: &CliContext, json: bool, plain: bool) -> Result<(), CarelayError> {
    ctx.session.clear()?;

    let session_file = ctx.session.path().to_string_lossy().into_owned();
    if json {
        let out = SessionOutput {
            status: "logged out",
            session_file,
            remembered: false,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        if use_color {
            use colored::Colorize;
            println!("{} session cleared", "✓".green());
        } else {
            println!("[OK] session cleared");
        }
    }

    Ok(())
}
