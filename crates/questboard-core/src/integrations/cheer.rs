//! Cheer collaborator -- fetch one celebratory sentence per completion.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Completion context sent to the cheer endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CheerRequest {
    pub task_title: String,
    pub points_earned: i64,
    pub total_points: i64,
    pub completions_today: usize,
    pub total_tasks_today: usize,
    pub time_of_day: String,
    pub milestone: Option<String>,
    pub completed_late: bool,
}

#[derive(Debug, Deserialize)]
struct CheerResponse {
    message: Option<String>,
}

/// Client for the cheer endpoint.
pub struct CheerClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl CheerClient {
    pub fn new(endpoint: &str, timeout_ms: u64) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Request a celebratory sentence for `request`.
    ///
    /// Returns `None` on timeout, transport error, non-success status, or an
    /// empty/unparseable body -- every failure mode degrades identically so
    /// the caller falls back to a local message. The timeout aborts the
    /// in-flight request; a hung endpoint cannot stall the completion flow.
    pub async fn generate(&self, request: &CheerRequest) -> Option<String> {
        if self.endpoint.is_empty() {
            return None;
        }

        let send = self.client.post(&self.endpoint).json(request).send();
        let response = tokio::time::timeout(self.timeout, send).await.ok()?.ok()?;
        if !response.status().is_success() {
            return None;
        }

        let body: CheerResponse =
            tokio::time::timeout(self.timeout, response.json()).await.ok()?.ok()?;
        let message = body.message?.trim().to_string();
        if message.is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CheerRequest {
        CheerRequest {
            task_title: "Dishes".to_string(),
            points_earned: 10,
            total_points: 60,
            completions_today: 1,
            total_tasks_today: 3,
            time_of_day: "evening".to_string(),
            milestone: Some("50-points".to_string()),
            completed_late: false,
        }
    }

    #[tokio::test]
    async fn returns_message_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/cheer")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Dishes destroyed. Nice!"}"#)
            .create_async()
            .await;

        let client = CheerClient::new(&format!("{}/cheer", server.url()), 2000);
        let message = client.generate(&request()).await;
        assert_eq!(message.as_deref(), Some("Dishes destroyed. Nice!"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_degrades_to_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/cheer")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = CheerClient::new(&format!("{}/cheer", server.url()), 2000);
        assert!(client.generate(&request()).await.is_none());
    }

    #[tokio::test]
    async fn empty_or_garbage_body_degrades_to_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/cheer")
            .with_status(200)
            .with_body(r#"{"message": "   "}"#)
            .create_async()
            .await;

        let client = CheerClient::new(&format!("{}/cheer", server.url()), 2000);
        assert!(client.generate(&request()).await.is_none());

        let mut server2 = mockito::Server::new_async().await;
        server2
            .mock("POST", "/cheer")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;
        let client2 = CheerClient::new(&format!("{}/cheer", server2.url()), 2000);
        assert!(client2.generate(&request()).await.is_none());
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_none() {
        // Nothing listens here; the connect error must not surface.
        let client = CheerClient::new("http://127.0.0.1:1/cheer", 500);
        assert!(client.generate(&request()).await.is_none());
    }

    #[tokio::test]
    async fn hung_endpoint_times_out_to_none() {
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept the connection, then never answer.
        tokio::spawn(async move {
            let _socket = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = CheerClient::new(&format!("http://{addr}/cheer"), 200);
        assert!(client.generate(&request()).await.is_none());
    }
}
