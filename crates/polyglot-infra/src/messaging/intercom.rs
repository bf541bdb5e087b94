//! IntercomClient -- concrete [`MessagingClient`] for the Intercom REST API.
//!
//! Both operations post to `/conversations/{id}/reply` as an admin:
//! `message_type = "note"` for internal notes, `"comment"` for user-visible replies.
//!
//! The access token is wrapped in [`secrecy::SecretString`] and is only
//! exposed when building the `Authorization` header.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use polyglot_core::messaging::MessagingClient;
use polyglot_types::error::MessagingError;

/// Connect timeout; the overall call deadline is applied by the caller.
const CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct ReplyRequest<'a> {
    message_type: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    admin_id: &'a str,
    body: &'a str,
}

/// Intercom conversation reply client.
///
/// Deliberately not `Debug`: it holds the access token.
#[derive(Clone)]
pub struct IntercomClient {
    client: reqwest::Client,
    token: SecretString,
    base_url: String,
}

impl IntercomClient {
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Result<Self, MessagingError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| MessagingError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn reply_url(&self, conversation_id: &str) -> String {
        format!("{}/conversations/{conversation_id}/reply", self.base_url)
    }

    async fn reply(
        &self,
        conversation_id: &str,
        message_type: &str,
        admin_id: &str,
        text: &str,
    ) -> Result<(), MessagingError> {
        let body = ReplyRequest {
            message_type,
            kind: "admin",
            admin_id,
            body: text,
        };

        let response = self
            .client
            .post(self.reply_url(conversation_id))
            .bearer_auth(self.token.expose_secret())
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| MessagingError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MessagingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(conversation_id, message_type, "intercom reply posted");
        Ok(())
    }
}

impl MessagingClient for IntercomClient {
    async fn add_note(
        &self,
        conversation_id: &str,
        admin_id: &str,
        text: &str,
    ) -> Result<(), MessagingError> {
        self.reply(conversation_id, "note", admin_id, text).await
    }

    async fn add_message(
        &self,
        conversation_id: &str,
        admin_id: &str,
        text: &str,
    ) -> Result<(), MessagingError> {
        self.reply(conversation_id, "comment", admin_id, text).await
    }
}
