// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiremock-backed stand-in for the clinic backend.
//!
//! Wraps a [`MockServer`] with stub helpers for the endpoint shapes the
//! backend exposes. Tests that need call-count expectations or custom
//! matchers can mount raw [`Mock`]s on [`MockBackend::server`].

use carelay_core::ChannelKind;
use serde_json::Value;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock clinic backend listening on a local port.
pub struct MockBackend {
    server: MockServer,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the mock backend.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// The underlying server, for raw mocks and `expect(n)` assertions.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Stubs `GET /{channel}/schedules` with the given listing body.
    pub async fn stub_schedules(&self, kind: ChannelKind, body: Value) {
        self.stub_listing(kind, "schedules", body).await;
    }

    /// Stubs `GET /{channel}/templates` with the given listing body.
    pub async fn stub_templates(&self, kind: ChannelKind, body: Value) {
        self.stub_listing(kind, "templates", body).await;
    }

    /// Stubs `GET /{channel}/messages` with the given listing body.
    pub async fn stub_history(&self, kind: ChannelKind, body: Value) {
        self.stub_listing(kind, "messages", body).await;
    }

    async fn stub_listing(&self, kind: ChannelKind, collection: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/{}/{collection}", kind.base_path())))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Stubs `POST /{channel}/send` with the given receipt body.
    pub async fn stub_send(&self, kind: ChannelKind, receipt: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/{}/send", kind.base_path())))
            .respond_with(ResponseTemplate::new(200).set_body_json(receipt))
            .mount(&self.server)
            .await;
    }

    /// Stubs `GET /{channel}/test-connection` with the given probe body.
    pub async fn stub_connection(&self, kind: ChannelKind, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/{}/test-connection", kind.base_path())))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Stubs one method+path with a bare status code and empty body.
    pub async fn stub_status(&self, http_method: &str, request_path: &str, status: u16) {
        Mock::given(method(http_method))
            .and(path(request_path.to_string()))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Stubs one method+path with a status code and JSON body.
    pub async fn stub_json(&self, http_method: &str, request_path: &str, status: u16, body: Value) {
        Mock::given(method(http_method))
            .and(path(request_path.to_string()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answers every request with 401, simulating a dead session.
    pub async fn stub_all_unauthorized(&self) {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(401))
            .mount(&self.server)
            .await;
    }

    /// Number of received requests matching the method and path.
    pub async fn request_count(&self, http_method: &str, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| {
                requests
                    .iter()
                    .filter(|r| {
                        r.method.as_str().eq_ignore_ascii_case(http_method)
                            && r.url.path() == request_path
                    })
                    .count()
            })
            .unwrap_or(0)
    }

    /// Total number of received requests.
    pub async fn total_requests(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn stubbed_listing_is_served_and_counted() {
        let backend = MockBackend::start().await;
        backend
            .stub_schedules(ChannelKind::Sms, json!([{"id": "s1"}]))
            .await;

        let url = format!("{}/sms/schedules", backend.uri());
        let body: Value = reqwest::get(&url)
            .await
            .expect("request")
            .json()
            .await
            .expect("JSON body");
        assert_eq!(body[0]["id"], "s1");

        assert_eq!(backend.request_count("GET", "/sms/schedules").await, 1);
        assert_eq!(backend.request_count("GET", "/email/schedules").await, 0);
    }

    #[tokio::test]
    async fn unauthorized_stub_covers_every_path() {
        let backend = MockBackend::start().await;
        backend.stub_all_unauthorized().await;

        let url = format!("{}/email/templates", backend.uri());
        let status = reqwest::get(&url).await.expect("request").status();
        assert_eq!(status.as_u16(), 401);
        assert_eq!(backend.total_requests().await, 1);
    }
}
