//! Gmail API v1 client

use super::mime::{build_mime, encode_raw};
use super::retry::{send_with_retry, RetryPolicy};
use super::token::TokenStore;
use super::MailSender;
use crate::bounce::{Mailbox, MessageSummary};
use crate::compose::ComposedMessage;
use crate::error::{ErrorCode, OutreachError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const PAGE_SIZE: u32 = 500;

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    #[serde(default)]
    messages: Vec<MessageStub>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageStub {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageDetail {
    #[serde(default)]
    id: String,
    #[serde(default)]
    payload: Option<MessagePayload>,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: String,
}

impl MessageDetail {
    fn header(&self, name: &str) -> String {
        self.payload
            .as_ref()
            .and_then(|p| p.headers.iter().find(|h| h.name.eq_ignore_ascii_case(name)))
            .map(|h| h.value.clone())
            .unwrap_or_default()
    }

    fn into_summary(self) -> MessageSummary {
        MessageSummary {
            from: self.header("From"),
            subject: self.header("Subject"),
            id: self.id,
        }
    }
}

/// Gmail client authorized by a token file
pub struct GmailClient {
    client: Client,
    tokens: TokenStore,
    policy: RetryPolicy,
    api_base: String,
}

impl GmailClient {
    pub fn new(token_path: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| OutreachError::send("Failed to create HTTP client").with_source(e))?;

        Ok(Self {
            client,
            tokens: TokenStore::new(token_path),
            policy: RetryPolicy::default(),
            api_base: API_BASE.to_string(),
        })
    }

    /// Retry policy for mailbox reads, trash and delete; sends never retry
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Point the client at another API root
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Issue an authorized request, refreshing the token once on 401
    ///
    /// A 401 means the request was not accepted, so repeating it with a
    /// fresh token cannot deliver a message twice.
    async fn execute<F>(&self, policy: &RetryPolicy, build: F) -> Result<Response>
    where
        F: Fn(&Client, &str) -> RequestBuilder,
    {
        let token = self.tokens.access_token(&self.client, false).await?;
        let response = send_with_retry(build(&self.client, &token), policy).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Gmail rejected the access token, refreshing");
        let token = self.tokens.access_token(&self.client, true).await?;
        let response = send_with_retry(build(&self.client, &token), policy).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(OutreachError::send_with_code(
                ErrorCode::SEND_AUTH_EXPIRED,
                "Gmail rejected the refreshed access token",
                None,
            )
            .with_status(401));
        }
        Ok(response)
    }

    async fn check(response: Response, recipient: Option<&str>) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(OutreachError::send_with_code(
            ErrorCode::SEND_REJECTED,
            format!("Gmail API error {}: {}", status, body.trim()),
            recipient.map(String::from),
        )
        .with_status(status.as_u16()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }
}

#[async_trait]
impl MailSender for GmailClient {
    async fn send(&self, to: &str, message: &ComposedMessage) -> Result<String> {
        let boundary = format!("=_outreach_{}", message.marker);
        let mime = build_mime(to, &message.subject, &message.text, &message.html, &boundary);
        let payload = json!({ "raw": encode_raw(&mime) });
        let url = self.url("messages/send");

        // A 5xx or timeout may arrive after Gmail already delivered the
        // message, so a send is attempted exactly once.
        let response = self
            .execute(&RetryPolicy::none(), |client, token| {
                client.post(&url).bearer_auth(token).json(&payload)
            })
            .await
            .map_err(|e| e.with_context(to))?;
        let response = Self::check(response, Some(to)).await?;

        let sent: SendResponse = response.json().await.map_err(|e| {
            OutreachError::send_with_code(
                ErrorCode::SEND_NO_MESSAGE_ID,
                "Unreadable send response",
                Some(to.to_string()),
            )
            .with_source(e)
        })?;

        if sent.id.is_empty() {
            return Err(OutreachError::send_with_code(
                ErrorCode::SEND_NO_MESSAGE_ID,
                "Gmail accepted the message but returned no id",
                Some(to.to_string()),
            ));
        }
        Ok(sent.id)
    }
}

#[async_trait]
impl Mailbox for GmailClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let url = self.url("messages");
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page_size = PAGE_SIZE.min(max_results.saturating_sub(ids.len()).max(1) as u32).to_string();
            let response = self
                .execute(&self.policy, |client, token| {
                    let mut req = client
                        .get(&url)
                        .bearer_auth(token)
                        .query(&[("q", query), ("maxResults", page_size.as_str())]);
                    if let Some(page) = page_token.as_deref() {
                        req = req.query(&[("pageToken", page)]);
                    }
                    req
                })
                .await?;
            let list: MessageListResponse = Self::check(response, None)
                .await?
                .json()
                .await
                .map_err(|e| OutreachError::send("Unreadable message list").with_source(e))?;

            ids.extend(list.messages.into_iter().map(|m| m.id));
            match list.next_page_token {
                Some(next) if ids.len() < max_results => page_token = Some(next),
                _ => break,
            }
        }

        ids.truncate(max_results);
        Ok(ids)
    }

    async fn summary(&self, id: &str) -> Result<MessageSummary> {
        let url = self.url(&format!("messages/{}", id));
        let response = self
            .execute(&self.policy, |client, token| {
                client.get(&url).bearer_auth(token).query(&[
                    ("format", "metadata"),
                    ("metadataHeaders", "From"),
                    ("metadataHeaders", "Subject"),
                ])
            })
            .await?;
        let detail: MessageDetail = Self::check(response, None)
            .await?
            .json()
            .await
            .map_err(|e| OutreachError::send("Unreadable message metadata").with_source(e))?;
        Ok(detail.into_summary())
    }

    async fn trash(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("messages/{}/trash", id));
        let response = self
            .execute(&self.policy, |client, token| client.post(&url).bearer_auth(token))
            .await?;
        Self::check(response, None).await.map(|_| ())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("messages/{}", id));
        let response = self
            .execute(&self.policy, |client, token| client.delete(&url).bearer_auth(token))
            .await?;
        Self::check(response, None).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubServer;
    use tempfile::TempDir;

    fn client_for(server: &StubServer, dir: &TempDir) -> GmailClient {
        let token_path = dir.path().join("token.json");
        std::fs::write(
            &token_path,
            r#"{"token": "t", "client_id": "c", "expiry": "2099-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        GmailClient::new(token_path).unwrap().with_api_base(server.url())
    }

    fn message() -> ComposedMessage {
        ComposedMessage {
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
            text: "Hi".to_string(),
            marker: "abc123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_server_error_is_not_repeated() {
        let server = StubServer::start(vec![(503, "{}"), (200, r#"{"id": "m2"}"#)])
            .await
            .unwrap();
        let dir = TempDir::new().unwrap();
        let client = client_for(&server, &dir);

        let err = client.send("jane@acme.com", &message()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::SEND_REJECTED);
        assert!(err.user_message().contains("503"));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("POST /messages/send"));
    }

    #[tokio::test]
    async fn test_send_returns_message_id() {
        let server = StubServer::start(vec![(200, r#"{"id": "m1"}"#)]).await.unwrap();
        let dir = TempDir::new().unwrap();
        let client = client_for(&server, &dir);

        let id = client.send("jane@acme.com", &message()).await.unwrap();
        assert_eq!(id, "m1");
    }

    #[tokio::test]
    async fn test_trash_retries_server_error() {
        let server = StubServer::start(vec![(503, "{}"), (200, "{}")]).await.unwrap();
        let dir = TempDir::new().unwrap();
        let client = client_for(&server, &dir).with_retry_policy(RetryPolicy {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 1,
        });

        client.trash("18c").await.unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.starts_with("POST /messages/18c/trash")));
    }

    #[test]
    fn test_message_detail_headers() {
        let detail: MessageDetail = serde_json::from_str(
            r#"{
                "id": "18c",
                "payload": {"headers": [
                    {"name": "from", "value": "Mail Delivery Subsystem <mailer-daemon@googlemail.com>"},
                    {"name": "Subject", "value": "Delivery Status Notification (Failure)"}
                ]}
            }"#,
        )
        .unwrap();

        let summary = detail.into_summary();
        assert_eq!(summary.id, "18c");
        assert!(summary.from.starts_with("Mail Delivery Subsystem"));
        assert_eq!(summary.subject, "Delivery Status Notification (Failure)");
    }

    #[test]
    fn test_message_list_defaults() {
        let list: MessageListResponse = serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).unwrap();
        assert!(list.messages.is_empty());
        assert!(list.next_page_token.is_none());
    }

    #[test]
    fn test_send_response() {
        let sent: SendResponse =
            serde_json::from_str(r#"{"id": "abc", "threadId": "t", "labelIds": ["SENT"]}"#).unwrap();
        assert_eq!(sent.id, "abc");
    }
}
