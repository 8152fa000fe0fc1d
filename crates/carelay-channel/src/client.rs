// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic per-channel API facade.
//!
//! One [`ChannelClient`] type serves all three channels; the only per-channel
//! state is the [`ChannelKind`] it was constructed with. Every operation
//! validates outbound drafts locally, awaits the HTTP layer, decodes the
//! response, and logs failures before rethrowing, so callers need no
//! channel-specific error handling.

use std::sync::Arc;

use carelay_core::types::{
    ConnectionStatus, HistoryRecord, MessageDraft, Schedule, ScheduleDraft, ScheduleId,
    SendReceipt, Template, TemplateDraft, TemplateId,
};
use carelay_core::{CarelayError, ChannelKind, HistoryFilter, decode_listing};
use carelay_http::ApiClient;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::payload;

/// API facade for one communication channel.
#[derive(Debug, Clone)]
pub struct ChannelClient {
    api: Arc<ApiClient>,
    kind: ChannelKind,
}

impl ChannelClient {
    pub fn new(api: Arc<ApiClient>, kind: ChannelKind) -> Self {
        Self { api, kind }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    fn path(&self, suffix: &str) -> String {
        format!("{}/{}", self.kind.base_path(), suffix)
    }

    /// Sends a message immediately.
    pub async fn send(&self, draft: &MessageDraft) -> Result<SendReceipt, CarelayError> {
        let profile = self.kind.profile();
        payload::validate_message(draft, profile)?;

        let body = payload::message_body(draft, profile);
        let value = self
            .api
            .post(&self.path("send"), body)
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "send failed"))?;

        info!(channel = %self.kind, recipients = draft.recipients.len(), "message sent");
        Ok(decode_lenient(value, "send receipt"))
    }

    /// Lists this channel's scheduled messages.
    pub async fn schedules(&self) -> Result<Vec<Schedule>, CarelayError> {
        let value = self
            .api
            .get(&self.path("schedules"))
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "schedule listing failed"))?;
        Ok(decode_listing(value, "schedules"))
    }

    /// Fetches a single schedule by id.
    pub async fn schedule(&self, id: &ScheduleId) -> Result<Schedule, CarelayError> {
        let value = self
            .api
            .get(&self.path(&format!("schedules/{}", id.0)))
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "schedule fetch failed"))?;
        serde_json::from_value(value).map_err(|e| CarelayError::Decode {
            message: format!("schedule response did not decode: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Creates a schedule. Returns the created entity when the backend echoes
    /// it back; `None` when it answers with a bare acknowledgement.
    pub async fn create_schedule(
        &self,
        draft: &ScheduleDraft,
    ) -> Result<Option<Schedule>, CarelayError> {
        let profile = self.kind.profile();
        payload::validate_schedule(draft, profile)?;

        let body = payload::schedule_body(draft, profile);
        let value = self
            .api
            .post(&self.path("schedules"), body)
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "schedule create failed"))?;

        info!(channel = %self.kind, "schedule created");
        Ok(decode_echo(value, "schedule"))
    }

    /// Replaces an existing schedule.
    pub async fn update_schedule(
        &self,
        id: &ScheduleId,
        draft: &ScheduleDraft,
    ) -> Result<Option<Schedule>, CarelayError> {
        let profile = self.kind.profile();
        payload::validate_schedule(draft, profile)?;

        let body = payload::schedule_body(draft, profile);
        let value = self
            .api
            .put(&self.path(&format!("schedules/{}", id.0)), body)
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "schedule update failed"))?;

        info!(channel = %self.kind, id = %id.0, "schedule updated");
        Ok(decode_echo(value, "schedule"))
    }

    /// Deletes a schedule.
    pub async fn delete_schedule(&self, id: &ScheduleId) -> Result<(), CarelayError> {
        self.api
            .delete(&self.path(&format!("schedules/{}", id.0)))
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "schedule delete failed"))?;
        info!(channel = %self.kind, id = %id.0, "schedule deleted");
        Ok(())
    }

    /// Flips a schedule's active flag.
    pub async fn toggle_schedule(&self, id: &ScheduleId, active: bool) -> Result<(), CarelayError> {
        self.api
            .patch(
                &self.path(&format!("schedules/{}/toggle", id.0)),
                payload::toggle_body(active),
            )
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "schedule toggle failed"))?;
        info!(channel = %self.kind, id = %id.0, active, "schedule toggled");
        Ok(())
    }

    /// Lists this channel's message templates.
    pub async fn templates(&self) -> Result<Vec<Template>, CarelayError> {
        let value = self
            .api
            .get(&self.path("templates"))
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "template listing failed"))?;
        Ok(decode_listing(value, "templates"))
    }

    /// Creates a template. Echo semantics as [`Self::create_schedule`].
    pub async fn create_template(
        &self,
        draft: &TemplateDraft,
    ) -> Result<Option<Template>, CarelayError> {
        payload::validate_template(draft, self.kind.profile())?;

        let value = self
            .api
            .post(&self.path("templates"), payload::template_body(draft))
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "template create failed"))?;

        info!(channel = %self.kind, name = %draft.name, "template created");
        Ok(decode_echo(value, "template"))
    }

    /// Replaces an existing template.
    pub async fn update_template(
        &self,
        id: &TemplateId,
        draft: &TemplateDraft,
    ) -> Result<Option<Template>, CarelayError> {
        payload::validate_template(draft, self.kind.profile())?;

        let value = self
            .api
            .put(
                &self.path(&format!("templates/{}", id.0)),
                payload::template_body(draft),
            )
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "template update failed"))?;

        info!(channel = %self.kind, id = %id.0, "template updated");
        Ok(decode_echo(value, "template"))
    }

    /// Deletes a template.
    pub async fn delete_template(&self, id: &TemplateId) -> Result<(), CarelayError> {
        self.api
            .delete(&self.path(&format!("templates/{}", id.0)))
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "template delete failed"))?;
        info!(channel = %self.kind, id = %id.0, "template deleted");
        Ok(())
    }

    /// Queries the delivery history. Absent filter fields are omitted from
    /// the query string entirely.
    pub async fn history(&self, filter: &HistoryFilter) -> Result<Vec<HistoryRecord>, CarelayError> {
        let query = filter.query_string()?;
        let path = if query.is_empty() {
            self.path("messages")
        } else {
            format!("{}?{query}", self.path("messages"))
        };

        let value = self
            .api
            .get(&path)
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "history query failed"))?;
        Ok(decode_listing(value, "history"))
    }

    /// Probes the channel's provider connectivity.
    pub async fn test_connection(&self) -> Result<ConnectionStatus, CarelayError> {
        let value = self
            .api
            .get(&self.path("test-connection"))
            .await
            .inspect_err(|e| warn!(channel = %self.kind, error = %e, "connection probe failed"))?;
        Ok(decode_lenient(value, "connection status"))
    }
}

/// Decode for responses whose fields are all optional. Anything that is not
/// a matching object becomes the default value rather than an error.
fn decode_lenient<T>(value: Value, what: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    if value.is_null() {
        return T::default();
    }
    serde_json::from_value(value).unwrap_or_else(|e| {
        debug!(what, error = %e, "response did not match expected shape, using defaults");
        T::default()
    })
}

/// Decode for mutation responses: some endpoints echo the full entity, others
/// answer `{"success": true}` or an empty body. Only a decodable entity is
/// surfaced; everything else is `None`.
fn decode_echo<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Option<T> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(entity) => Some(entity),
        Err(e) => {
            debug!(what, error = %e, "mutation response is a bare acknowledgement");
            None
        }
    }
}
