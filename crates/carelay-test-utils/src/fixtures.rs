// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON fixtures in the backend's wire shapes.
//!
//! Timestamps are fixed so assertions stay deterministic.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

/// A fixed future timestamp used by schedule fixtures.
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap()
}

/// A phone-channel schedule in the `phone`/`message` wire shape.
pub fn schedule_json(id: &str, phone: &str, message: &str) -> Value {
    json!({
        "id": id,
        "phone": phone,
        "message": message,
        "scheduled_time": "2026-09-01T09:00:00Z",
    })
}

/// An email schedule with list recipients and a subject.
pub fn email_schedule_json(id: &str, to: &[&str], subject: &str, body: &str) -> Value {
    json!({
        "id": id,
        "to": to,
        "subject": subject,
        "body": body,
        "scheduled_time": "2026-09-01T09:00:00Z",
    })
}

/// An inactive weekly schedule, for toggle and derived-view tests.
pub fn paused_schedule_json(id: &str, phone: &str) -> Value {
    json!({
        "id": id,
        "phone": phone,
        "message": "recurring reminder",
        "scheduled_time": "2026-09-01T09:00:00Z",
        "recurrence": "weekly",
        "is_active": false,
    })
}

/// A manual template (no action linkage).
pub fn template_json(id: &str, name: &str, content: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "content": content,
    })
}

/// A template wired to a system action with auto-send armed.
pub fn auto_template_json(id: &str, name: &str, action_type: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "content": "Hello {patient_name}",
        "action_type": action_type,
        "auto_send": true,
    })
}

/// A delivery-history row in the `recipient`/`timestamp` wire shape.
pub fn history_json(id: &str, recipient: &str, status: &str) -> Value {
    json!({
        "id": id,
        "recipient": recipient,
        "status": status,
        "timestamp": "2026-08-20T10:30:00Z",
    })
}

/// A successful connection probe body.
pub fn connected_json(provider: &str) -> Value {
    json!({"success": true, "provider": provider})
}

/// A send receipt body.
pub fn receipt_json(id: &str, status: &str) -> Value {
    json!({"id": id, "status": status})
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelay_core::{Schedule, Template, TemplateTrigger};

    #[test]
    fn fixtures_decode_into_domain_types() {
        let schedule: Schedule =
            serde_json::from_value(schedule_json("s1", "+15550001111", "hi")).unwrap();
        assert_eq!(schedule.id.0, "s1");
        assert_eq!(schedule.scheduled_time, fixture_time());
        assert!(schedule.is_active);

        let paused: Schedule =
            serde_json::from_value(paused_schedule_json("s2", "+15550001111")).unwrap();
        assert!(!paused.is_active);

        let template: Template =
            serde_json::from_value(auto_template_json("t1", "Booked", "appointment_created"))
                .unwrap();
        assert_eq!(template.trigger(), TemplateTrigger::Automatic);
    }
}
