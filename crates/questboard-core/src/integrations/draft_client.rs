//! Quest-draft collaborator -- turn free text into a best-effort draft.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;

use crate::draft::RawDraft;

/// Client for the natural-language drafting endpoint.
///
/// The response is a [`RawDraft`]; normalization (point snapping, assignee
/// resolution) happens in [`crate::draft`], not here.
pub struct DraftClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl DraftClient {
    pub fn new(endpoint: &str, timeout_ms: u64) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Draft a quest from free text.
    ///
    /// Same failure contract as the cheer client: any timeout, transport
    /// error, non-success status, or unparseable body returns `None`.
    pub async fn draft(&self, text: &str) -> Option<RawDraft> {
        if self.endpoint.is_empty() {
            return None;
        }

        let body = json!({ "text": text });
        let send = self.client.post(&self.endpoint).json(&body).send();
        let response = tokio::time::timeout(self.timeout, send).await.ok()?.ok()?;
        if !response.status().is_success() {
            return None;
        }

        tokio::time::timeout(self.timeout, response.json::<RawDraft>())
            .await
            .ok()?
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_a_draft_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/draft")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"title": "Mow the lawn", "points": 23, "recurrence": "weekly", "assignee": "Sar"}"#,
            )
            .create_async()
            .await;

        let client = DraftClient::new(&format!("{}/draft", server.url()), 2000);
        let raw = client.draft("mow the lawn every week, sar's job").await.unwrap();
        assert_eq!(raw.title.as_deref(), Some("Mow the lawn"));
        assert_eq!(raw.points, Some(23));
    }

    #[tokio::test]
    async fn malformed_payload_is_total_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/draft")
            .with_status(200)
            .with_body("null and void")
            .create_async()
            .await;

        let client = DraftClient::new(&format!("{}/draft", server.url()), 2000);
        assert!(client.draft("anything").await.is_none());
    }
}
