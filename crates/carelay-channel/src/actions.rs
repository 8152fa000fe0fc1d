// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Action-trigger client.
//!
//! The backend roots its action endpoints under `/whatsapp/` for historical
//! reasons, but a dispatch names its own target channel in the payload, so
//! this client is channel-neutral from the caller's side.

use std::sync::Arc;

use carelay_core::types::{ActionDispatch, ActionTrigger, SendReceipt};
use carelay_core::{CarelayError, decode_listing};
use carelay_http::ApiClient;
use serde_json::Value;
use tracing::{info, warn};

const ACTION_TYPES_PATH: &str = "whatsapp/action-types";
const SEND_ACTION_PATH: &str = "whatsapp/send-action";

/// Client for system-action triggers and templated action sends.
#[derive(Debug, Clone)]
pub struct ActionClient {
    api: Arc<ApiClient>,
}

impl ActionClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Lists the system action types that can fire templated sends.
    pub async fn triggers(&self) -> Result<Vec<ActionTrigger>, CarelayError> {
        let value = self
            .api
            .get(ACTION_TYPES_PATH)
            .await
            .inspect_err(|e| warn!(error = %e, "action-type listing failed"))?;
        Ok(decode_listing(value, "action types"))
    }

    /// Fires a templated send for a system action.
    pub async fn dispatch(&self, action: &ActionDispatch) -> Result<SendReceipt, CarelayError> {
        if action.action_type.trim().is_empty() {
            return Err(CarelayError::Validation("action type must not be empty".into()));
        }
        if action.recipient.trim().is_empty() {
            return Err(CarelayError::Validation("action recipient must not be empty".into()));
        }

        let body = serde_json::to_value(action).map_err(|e| CarelayError::Internal(format!(
            "unencodable action dispatch: {e}"
        )))?;
        let value = self
            .api
            .post(SEND_ACTION_PATH, body)
            .await
            .inspect_err(|e| {
                warn!(action = %action.action_type, channel = %action.channel, error = %e,
                      "action dispatch failed");
            })?;

        info!(action = %action.action_type, channel = %action.channel, "action dispatched");
        Ok(decode_receipt(value))
    }
}

fn decode_receipt(value: Value) -> SendReceipt {
    if value.is_null() {
        return SendReceipt::default();
    }
    serde_json::from_value(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelay_config::model::BackendConfig;
    use carelay_core::ChannelKind;
    use carelay_http::{SessionExpiry, SessionStore};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn action_client(base_url: &str) -> (ActionClient, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let session = Arc::new(SessionStore::open(dir.path().join("session.json")).unwrap());
        let config = BackendConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            max_retries: 0,
        };
        let api = Arc::new(
            ApiClient::new(&config, session, Arc::new(SessionExpiry::new())).unwrap(),
        );
        (ActionClient::new(api), dir)
    }

    #[tokio::test]
    async fn triggers_decode_key_alias() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/whatsapp/action-types"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"key": "appointment_created", "label": "Appointment created"},
                {"action_type": "appointment_cancelled"},
            ])))
            .mount(&server)
            .await;

        let (client, _dir) = action_client(&server.uri());
        let triggers = client.triggers().await.unwrap();
        assert_eq!(triggers.len(), 2);
        assert_eq!(triggers[0].id, "appointment_created");
        assert_eq!(triggers[1].id, "appointment_cancelled");
    }

    #[tokio::test]
    async fn dispatch_posts_action_with_channel_selector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/whatsapp/send-action"))
            .and(body_json(json!({
                "action_type": "appointment_created",
                "channel": "sms",
                "recipient": "+15550001111",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "sent"})))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _dir) = action_client(&server.uri());
        let receipt = client
            .dispatch(&ActionDispatch::new(
                "appointment_created",
                ChannelKind::Sms,
                "+15550001111",
            ))
            .await
            .unwrap();
        assert_eq!(receipt.status, Some(carelay_core::DeliveryStatus::Sent));
    }

    #[tokio::test]
    async fn empty_action_type_rejected_locally() {
        let server = MockServer::start().await;

        let (client, _dir) = action_client(&server.uri());
        let err = client
            .dispatch(&ActionDispatch::new("", ChannelKind::Sms, "+15550001111"))
            .await
            .unwrap_err();
        assert!(matches!(err, CarelayError::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
