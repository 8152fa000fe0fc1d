// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Value parsers shared across subcommand argument structs.

use std::str::FromStr;

use carelay_core::{ChannelKind, DeliveryStatus, Recurrence};
use chrono::{DateTime, Utc};

pub fn parse_channel(s: &str) -> Result<ChannelKind, String> {
    ChannelKind::from_str(s)
        .map_err(|_| format!("unknown channel '{s}' (expected whatsapp, email, or sms)"))
}

pub fn parse_recurrence(s: &str) -> Result<Recurrence, String> {
    Recurrence::from_str(s)
        .map_err(|_| format!("unknown recurrence '{s}' (expected once, daily, weekly, or monthly)"))
}

pub fn parse_status(s: &str) -> Result<DeliveryStatus, String> {
    DeliveryStatus::from_str(s)
        .map_err(|_| format!("unknown status '{s}' (expected sent, failed, or pending)"))
}

pub fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid time '{s}': {e} (expected RFC 3339, e.g. 2026-09-01T09:00:00Z)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_parse_case_insensitively() {
        assert_eq!(parse_channel("whatsapp").unwrap(), ChannelKind::WhatsApp);
        assert_eq!(parse_channel("SMS").unwrap(), ChannelKind::Sms);
        assert!(parse_channel("fax").is_err());
    }

    #[test]
    fn recurrence_and_status_parse() {
        assert_eq!(parse_recurrence("weekly").unwrap(), Recurrence::Weekly);
        assert_eq!(parse_status("failed").unwrap(), DeliveryStatus::Failed);
        assert!(parse_recurrence("fortnightly").is_err());
    }

    #[test]
    fn times_must_be_rfc3339() {
        let t = parse_time("2026-09-01T09:00:00Z").unwrap();
        assert_eq!(t.to_rfc3339(), "2026-09-01T09:00:00+00:00");
        assert!(parse_time("tomorrow at nine").is_err());
    }
}
