// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Draft validation and per-channel payload marshalling.
//!
//! Validation runs before any network call: a draft that fails here never
//! reaches the wire. Marshalling maps the channel-neutral draft types onto
//! each channel's wire field names via its [`ChannelProfile`].

use std::sync::LazyLock;

use carelay_core::types::{ChannelProfile, MessageDraft, ScheduleDraft, TemplateDraft};
use carelay_core::CarelayError;
use regex::Regex;
use serde_json::{Map, Value, json};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").unwrap());

// Loose E.164-ish check: optional +, then digits with common separators.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 \-().]{5,18}$").unwrap());

fn check_recipients(recipients: &[String], profile: &ChannelProfile) -> Result<(), CarelayError> {
    if recipients.is_empty() {
        return Err(CarelayError::Validation(format!(
            "{}: at least one recipient is required",
            profile.kind
        )));
    }
    if !profile.multi_recipient && recipients.len() > 1 {
        return Err(CarelayError::Validation(format!(
            "{}: only a single recipient is supported",
            profile.kind
        )));
    }
    for recipient in recipients {
        check_address(recipient, profile)?;
    }
    Ok(())
}

fn check_address(address: &str, profile: &ChannelProfile) -> Result<(), CarelayError> {
    let ok = if profile.has_subject {
        // Subject-bearing channel means email addressing.
        EMAIL_RE.is_match(address)
    } else {
        PHONE_RE.is_match(address)
    };
    if ok {
        Ok(())
    } else {
        Err(CarelayError::Validation(format!(
            "{}: `{address}` is not a valid {}",
            profile.kind,
            if profile.has_subject { "email address" } else { "phone number" }
        )))
    }
}

fn check_copy_lists(
    cc: &[String],
    bcc: &[String],
    profile: &ChannelProfile,
) -> Result<(), CarelayError> {
    if !profile.has_copy_fields {
        if !cc.is_empty() || !bcc.is_empty() {
            return Err(CarelayError::Validation(format!(
                "{}: cc/bcc are not supported on this channel",
                profile.kind
            )));
        }
        return Ok(());
    }
    for address in cc.iter().chain(bcc) {
        check_address(address, profile)?;
    }
    Ok(())
}

/// Validates an immediate-send draft against a channel profile.
pub fn validate_message(draft: &MessageDraft, profile: &ChannelProfile) -> Result<(), CarelayError> {
    check_recipients(&draft.recipients, profile)?;
    check_copy_lists(&draft.cc, &draft.bcc, profile)?;

    if draft.subject.is_some() && !profile.has_subject {
        return Err(CarelayError::Validation(format!(
            "{}: this channel has no subject line",
            profile.kind
        )));
    }

    // A template reference stands in for literal content: the backend fills
    // the body (and subject, for email) at send time.
    if draft.template_id.is_none() {
        if draft.body.trim().is_empty() {
            return Err(CarelayError::Validation(format!(
                "{}: message body must not be empty",
                profile.kind
            )));
        }
        if profile.has_subject && draft.subject.as_deref().is_none_or(|s| s.trim().is_empty()) {
            return Err(CarelayError::Validation(format!(
                "{}: subject is required",
                profile.kind
            )));
        }
    }

    Ok(())
}

/// Validates a schedule draft against a channel profile.
pub fn validate_schedule(
    draft: &ScheduleDraft,
    profile: &ChannelProfile,
) -> Result<(), CarelayError> {
    check_recipients(&draft.recipients, profile)?;
    check_copy_lists(&draft.cc, &draft.bcc, profile)?;

    if draft.subject.is_some() && !profile.has_subject {
        return Err(CarelayError::Validation(format!(
            "{}: this channel has no subject line",
            profile.kind
        )));
    }
    if draft.template_id.is_none() && draft.message.trim().is_empty() {
        return Err(CarelayError::Validation(format!(
            "{}: message body must not be empty",
            profile.kind
        )));
    }

    Ok(())
}

/// Validates a template draft against a channel profile.
pub fn validate_template(
    draft: &TemplateDraft,
    profile: &ChannelProfile,
) -> Result<(), CarelayError> {
    if draft.name.trim().is_empty() {
        return Err(CarelayError::Validation("template name must not be empty".into()));
    }
    if draft.content.trim().is_empty() {
        return Err(CarelayError::Validation("template content must not be empty".into()));
    }
    if draft.subject.is_some() && !profile.has_subject {
        return Err(CarelayError::Validation(format!(
            "{}: templates on this channel have no subject",
            profile.kind
        )));
    }
    Ok(())
}

fn recipients_value(recipients: &[String], profile: &ChannelProfile) -> Value {
    if profile.multi_recipient {
        json!(recipients)
    } else {
        json!(recipients[0])
    }
}

/// Marshals a validated send draft into the channel's wire body.
pub fn message_body(draft: &MessageDraft, profile: &ChannelProfile) -> Value {
    let mut body = Map::new();
    body.insert(
        profile.recipient_field.to_string(),
        recipients_value(&draft.recipients, profile),
    );
    body.insert(profile.body_field.to_string(), json!(draft.body));
    if let Some(ref subject) = draft.subject {
        body.insert("subject".into(), json!(subject));
    }
    if !draft.cc.is_empty() {
        body.insert("cc".into(), json!(draft.cc));
    }
    if !draft.bcc.is_empty() {
        body.insert("bcc".into(), json!(draft.bcc));
    }
    if let Some(ref template_id) = draft.template_id {
        body.insert("template_id".into(), json!(template_id));
    }
    Value::Object(body)
}

/// Marshals a validated schedule draft into the channel's wire body.
pub fn schedule_body(draft: &ScheduleDraft, profile: &ChannelProfile) -> Value {
    let mut body = Map::new();
    body.insert(
        profile.recipient_field.to_string(),
        recipients_value(&draft.recipients, profile),
    );
    body.insert(profile.body_field.to_string(), json!(draft.message));
    if let Some(ref subject) = draft.subject {
        body.insert("subject".into(), json!(subject));
    }
    if !draft.cc.is_empty() {
        body.insert("cc".into(), json!(draft.cc));
    }
    if !draft.bcc.is_empty() {
        body.insert("bcc".into(), json!(draft.bcc));
    }
    body.insert("scheduled_time".into(), json!(draft.scheduled_time.to_rfc3339()));
    body.insert("recurrence".into(), json!(draft.recurrence));
    if let Some(ref template_id) = draft.template_id {
        body.insert("template_id".into(), json!(template_id));
    }
    Value::Object(body)
}

/// Marshals a validated template draft. Template field names are uniform
/// across channels, so this is plain serialization.
pub fn template_body(draft: &TemplateDraft) -> Value {
    json!(draft)
}

/// Body for the schedule active-flag toggle.
pub fn toggle_body(active: bool) -> Value {
    json!({ "is_active": active })
}
