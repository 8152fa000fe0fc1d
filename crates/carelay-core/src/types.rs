// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain entities shared across the Carelay workspace.
//!
//! Inbound wire shapes are deliberately tolerant: the backend is inconsistent
//! about field names across channels (`phone` vs `to`, `body` vs `message`,
//! single string vs list of recipients), so deserialization accepts the known
//! spellings and normalizes them into one set of entity types. Outbound
//! payloads are marshalled per channel through [`ChannelProfile`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a scheduled message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleId(pub String);

/// Unique identifier for a message template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub String);

/// Unique identifier for a sent message in the delivery history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// The three communication channels the backend exposes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    WhatsApp,
    Email,
    Sms,
}

impl ChannelKind {
    /// All channels, in the order the backend documents them.
    pub const ALL: [ChannelKind; 3] = [ChannelKind::WhatsApp, ChannelKind::Email, ChannelKind::Sms];

    /// URL path segment under which this channel's endpoints live.
    pub fn base_path(self) -> &'static str {
        match self {
            ChannelKind::WhatsApp => "whatsapp",
            ChannelKind::Email => "email",
            ChannelKind::Sms => "sms",
        }
    }

    /// Per-channel payload mapping used when marshalling outbound drafts.
    pub fn profile(self) -> &'static ChannelProfile {
        match self {
            ChannelKind::WhatsApp => &WHATSAPP_PROFILE,
            ChannelKind::Email => &EMAIL_PROFILE,
            ChannelKind::Sms => &SMS_PROFILE,
        }
    }
}

/// Describes how a channel names its payload fields and which optional
/// fields it understands. One static instance per [`ChannelKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelProfile {
    pub kind: ChannelKind,
    /// Wire name of the destination field (`phone` or `to`).
    pub recipient_field: &'static str,
    /// Wire name of the message body field (`message` or `body`).
    pub body_field: &'static str,
    /// Whether the channel carries a subject line.
    pub has_subject: bool,
    /// Whether the channel accepts cc/bcc lists.
    pub has_copy_fields: bool,
    /// Whether the destination may be a list of addresses.
    pub multi_recipient: bool,
}

static WHATSAPP_PROFILE: ChannelProfile = ChannelProfile {
    kind: ChannelKind::WhatsApp,
    recipient_field: "phone",
    body_field: "message",
    has_subject: false,
    has_copy_fields: false,
    multi_recipient: false,
};

static EMAIL_PROFILE: ChannelProfile = ChannelProfile {
    kind: ChannelKind::Email,
    recipient_field: "to",
    body_field: "body",
    has_subject: true,
    has_copy_fields: true,
    multi_recipient: true,
};

static SMS_PROFILE: ChannelProfile = ChannelProfile {
    kind: ChannelKind::Sms,
    recipient_field: "phone",
    body_field: "message",
    has_subject: false,
    has_copy_fields: false,
    multi_recipient: false,
};

/// How often a schedule repeats. Absent on the wire means [`Recurrence::Once`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    Once,
    Daily,
    Weekly,
    Monthly,
}

/// Delivery outcome recorded in the send history.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
    Pending,
}

/// A scheduled message as the backend reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    #[serde(
        alias = "phone",
        alias = "phone_number",
        alias = "to",
        default,
        deserialize_with = "string_or_list"
    )]
    pub recipients: Vec<String>,
    #[serde(alias = "body", default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "string_or_list", skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list", skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    /// Must be a well-formed timestamp; entries with invalid dates fail to
    /// decode and are skipped by the listing decoder.
    pub scheduled_time: DateTime<Utc>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Outbound payload for creating or updating a schedule. Marshalled through
/// the channel profile, never serialized directly.
#[derive(Debug, Clone)]
pub struct ScheduleDraft {
    pub recipients: Vec<String>,
    pub message: String,
    pub subject: Option<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub scheduled_time: DateTime<Utc>,
    pub recurrence: Recurrence,
    pub template_id: Option<TemplateId>,
}

impl ScheduleDraft {
    pub fn new(
        recipients: Vec<String>,
        message: impl Into<String>,
        scheduled_time: DateTime<Utc>,
    ) -> Self {
        Self {
            recipients,
            message: message.into(),
            subject: None,
            cc: Vec::new(),
            bcc: Vec::new(),
            scheduled_time,
            recurrence: Recurrence::Once,
            template_id: None,
        }
    }
}

/// A reusable message template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    #[serde(alias = "body", default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default)]
    pub auto_send: bool,
}

/// How a template gets used, derived from its action linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateTrigger {
    /// No action linkage; only ever sent by an explicit user action.
    Manual,
    /// Linked to a system action and fires without user involvement.
    Automatic,
    /// Linked to a system action but not armed to fire.
    Inert,
}

impl Template {
    pub fn trigger(&self) -> TemplateTrigger {
        match (&self.action_type, self.auto_send) {
            (None, _) => TemplateTrigger::Manual,
            (Some(_), true) => TemplateTrigger::Automatic,
            (Some(_), false) => TemplateTrigger::Inert,
        }
    }
}

/// Outbound payload for creating or updating a template.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateDraft {
    pub name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    pub auto_send: bool,
}

/// One row of the delivery history. Append-only from the client's view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: MessageId,
    #[serde(
        alias = "recipient",
        alias = "phone",
        alias = "to",
        default,
        deserialize_with = "string_or_list"
    )]
    pub recipients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(alias = "body", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: DeliveryStatus,
    #[serde(alias = "timestamp", alias = "created_at")]
    pub sent_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
}

/// Outbound payload for an immediate send. Marshalled through the channel
/// profile, never serialized directly.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub recipients: Vec<String>,
    pub body: String,
    pub subject: Option<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub template_id: Option<TemplateId>,
}

impl MessageDraft {
    /// Draft for the single-recipient channels (WhatsApp, SMS).
    pub fn text(recipient: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            recipients: vec![recipient.into()],
            body: body.into(),
            subject: None,
            cc: Vec::new(),
            bcc: Vec::new(),
            template_id: None,
        }
    }

    /// Draft for the email channel.
    pub fn email(to: Vec<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            recipients: to,
            body: body.into(),
            subject: Some(subject.into()),
            cc: Vec::new(),
            bcc: Vec::new(),
            template_id: None,
        }
    }

    pub fn with_cc(mut self, cc: Vec<String>) -> Self {
        self.cc = cc;
        self
    }

    pub fn with_bcc(mut self, bcc: Vec<String>) -> Self {
        self.bcc = bcc;
        self
    }

    pub fn with_template(mut self, id: TemplateId) -> Self {
        self.template_id = Some(id);
        self
    }
}

/// Tolerant decode of the backend's reply to a send or dispatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SendReceipt {
    pub id: Option<MessageId>,
    pub status: Option<DeliveryStatus>,
    #[serde(alias = "message")]
    pub detail: Option<String>,
}

/// Result of a channel connectivity probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionStatus {
    #[serde(alias = "success", alias = "ok")]
    pub connected: bool,
    #[serde(alias = "message")]
    pub detail: Option<String>,
    pub provider: Option<String>,
}

/// A system action type that can trigger a templated send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTrigger {
    #[serde(alias = "key", alias = "action_type")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request to fire a templated send keyed by a system action type.
#[derive(Debug, Clone, Serialize)]
pub struct ActionDispatch {
    pub action_type: String,
    pub channel: ChannelKind,
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

impl ActionDispatch {
    pub fn new(
        action_type: impl Into<String>,
        channel: ChannelKind,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            action_type: action_type.into(),
            channel,
            recipient: recipient.into(),
            variables: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Accepts a bare string, a list of strings, a number, or null. The backend
/// sends `to` as a list for email but a plain string everywhere else.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrList;

    impl<'de> serde::de::Visitor<'de> for StringOrList {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a string, a list of strings, or null")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::SeqAccess<'de>,
        {
            let mut out = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                out.push(item);
            }
            Ok(out)
        }
    }

    deserializer.deserialize_any(StringOrList)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn channel_kind_paths_and_profiles() {
        assert_eq!(ChannelKind::WhatsApp.base_path(), "whatsapp");
        assert_eq!(ChannelKind::Email.base_path(), "email");
        assert_eq!(ChannelKind::Sms.base_path(), "sms");

        let email = ChannelKind::Email.profile();
        assert_eq!(email.recipient_field, "to");
        assert!(email.has_subject && email.has_copy_fields && email.multi_recipient);

        let wa = ChannelKind::WhatsApp.profile();
        assert_eq!(wa.recipient_field, "phone");
        assert_eq!(wa.body_field, "message");
        assert!(!wa.multi_recipient);
    }

    #[test]
    fn channel_kind_display_round_trips() {
        for kind in ChannelKind::ALL {
            let s = kind.to_string();
            assert_eq!(ChannelKind::from_str(&s).unwrap(), kind);
            assert_eq!(s, kind.base_path());
        }
        // CLI input is case-insensitive.
        assert_eq!(ChannelKind::from_str("WhatsApp").unwrap(), ChannelKind::WhatsApp);
    }

    #[test]
    fn recurrence_defaults_to_once_when_absent() {
        let json = serde_json::json!({
            "id": "s1",
            "phone": "+15550001111",
            "message": "reminder",
            "scheduled_time": "2026-09-01T09:00:00Z"
        });
        let schedule: Schedule = serde_json::from_value(json).unwrap();
        assert_eq!(schedule.recurrence, Recurrence::Once);
        assert!(schedule.is_active);
        assert_eq!(schedule.recipients, vec!["+15550001111"]);
    }

    #[test]
    fn schedule_accepts_email_shape() {
        let json = serde_json::json!({
            "id": "s2",
            "to": ["a@clinic.test", "b@clinic.test"],
            "subject": "Checkup",
            "body": "See you Monday",
            "cc": "records@clinic.test",
            "scheduled_time": "2026-09-01T09:00:00Z",
            "recurrence": "weekly",
            "is_active": false
        });
        let schedule: Schedule = serde_json::from_value(json).unwrap();
        assert_eq!(schedule.recipients.len(), 2);
        assert_eq!(schedule.message, "See you Monday");
        assert_eq!(schedule.cc, vec!["records@clinic.test"]);
        assert_eq!(schedule.recurrence, Recurrence::Weekly);
        assert!(!schedule.is_active);
    }

    #[test]
    fn schedule_with_invalid_timestamp_fails_to_decode() {
        let json = serde_json::json!({
            "id": "s3",
            "phone": "+15550001111",
            "message": "x",
            "scheduled_time": "not-a-date"
        });
        assert!(serde_json::from_value::<Schedule>(json).is_err());
    }

    #[test]
    fn template_trigger_classification() {
        let mut t = Template {
            id: TemplateId("t1".into()),
            name: "Reminder".into(),
            content: "Hello".into(),
            subject: None,
            action_type: None,
            auto_send: false,
        };
        assert_eq!(t.trigger(), TemplateTrigger::Manual);

        t.action_type = Some("appointment_created".into());
        assert_eq!(t.trigger(), TemplateTrigger::Inert);

        t.auto_send = true;
        assert_eq!(t.trigger(), TemplateTrigger::Automatic);
    }

    #[test]
    fn template_accepts_body_alias_and_missing_auto_send() {
        let json = serde_json::json!({
            "id": "t2",
            "name": "Follow-up",
            "body": "How was your visit?"
        });
        let template: Template = serde_json::from_value(json).unwrap();
        assert_eq!(template.content, "How was your visit?");
        assert!(!template.auto_send);
        assert_eq!(template.trigger(), TemplateTrigger::Manual);
    }

    #[test]
    fn history_record_aliases() {
        let json = serde_json::json!({
            "id": "m1",
            "recipient": "+15550002222",
            "status": "sent",
            "timestamp": "2026-08-20T10:30:00Z"
        });
        let record: HistoryRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.recipients, vec!["+15550002222"]);
        assert_eq!(record.status, DeliveryStatus::Sent);
    }

    #[test]
    fn send_receipt_tolerates_any_shape() {
        let empty: SendReceipt = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(empty.id.is_none() && empty.status.is_none());

        let full: SendReceipt = serde_json::from_value(serde_json::json!({
            "id": "m9", "status": "pending", "message": "queued"
        }))
        .unwrap();
        assert_eq!(full.status, Some(DeliveryStatus::Pending));
        assert_eq!(full.detail.as_deref(), Some("queued"));
    }

    #[test]
    fn connection_status_accepts_success_alias() {
        let status: ConnectionStatus =
            serde_json::from_value(serde_json::json!({"success": true, "provider": "twilio"}))
                .unwrap();
        assert!(status.connected);
        assert_eq!(status.provider.as_deref(), Some("twilio"));
    }

    #[test]
    fn action_dispatch_serializes_channel_lowercase() {
        let dispatch = ActionDispatch::new("appointment_created", ChannelKind::Sms, "+15550003333");
        let json = serde_json::to_value(&dispatch).unwrap();
        assert_eq!(json["channel"], "sms");
        assert_eq!(json["action_type"], "appointment_created");
        assert!(json.get("variables").is_none());
    }
}
