//! Mail-provider admin API access.

use serde::Deserialize;
use std::time::Duration;

use crate::{api::error, modules::email_security::model::MailMessage};

#[async_trait::async_trait]
pub trait MailProvider {
    fn is_configured(&self) -> bool {
        true
    }

    /// Up to `max_results` messages in `user_email`'s mailbox matching `query`.
    async fn search_messages(
        &self,
        user_email: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<MailMessage>, error::SystemError>;

    /// Permanently removes one message.
    async fn delete_message(
        &self,
        user_email: &str,
        message_id: &str,
    ) -> Result<(), error::SystemError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    #[serde(default)]
    messages: Vec<MessageStub>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageStub {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageMetadata {
    id: String,
    thread_id: Option<String>,
    snippet: Option<String>,
    payload: Option<MessagePayload>,
}

#[derive(Deserialize)]
struct MessagePayload {
    #[serde(default)]
    headers: Vec<MessageHeader>,
}

#[derive(Deserialize)]
struct MessageHeader {
    name: String,
    value: String,
}

impl MessageMetadata {
    fn header(&self, name: &str) -> Option<String> {
        self.payload
            .as_ref()?
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.clone())
    }

    fn into_message(self, user_email: &str) -> MailMessage {
        MailMessage {
            from: self.header("From"),
            to: self.header("To"),
            subject: self.header("Subject"),
            date: self.header("Date"),
            user_email: user_email.to_string(),
            id: self.id,
            thread_id: self.thread_id,
            snippet: self.snippet,
        }
    }
}

/// Gmail admin API client authenticating with a bearer token that carries
/// domain-wide delegation.
pub struct GmailAdminClient {
    client: reqwest::Client,
    base_url: reqwest::Url,
    token: Option<String>,
}

const PAGE_SIZE: u32 = 100;

impl GmailAdminClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, error::SystemError> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| error::SystemError::internal(format!("Invalid MAIL_PROVIDER_URL: {e}")))?;
        Ok(Self { client, base_url, token })
    }

    fn messages_url(&self, user_email: &str, message_id: Option<&str>) -> Result<reqwest::Url, error::SystemError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| error::SystemError::internal("MAIL_PROVIDER_URL cannot be a base"))?;
            segments.pop_if_empty().extend(["gmail", "v1", "users", user_email, "messages"]);
            if let Some(id) = message_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn token(&self) -> Result<&str, error::SystemError> {
        self.token
            .as_deref()
            .ok_or_else(|| error::SystemError::internal("Mail provider token is not configured"))
    }

    async fn fetch_metadata(
        &self,
        user_email: &str,
        message_id: &str,
    ) -> Result<MessageMetadata, error::SystemError> {
        let url = self.messages_url(user_email, Some(message_id))?;
        let metadata = self
            .client
            .get(url)
            .bearer_auth(self.token()?)
            .query(&[
                ("format", "metadata"),
                ("metadataHeaders", "From"),
                ("metadataHeaders", "To"),
                ("metadataHeaders", "Subject"),
                ("metadataHeaders", "Date"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<MessageMetadata>()
            .await?;
        Ok(metadata)
    }
}

#[async_trait::async_trait]
impl MailProvider for GmailAdminClient {
    fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    async fn search_messages(
        &self,
        user_email: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<MailMessage>, error::SystemError> {
        let url = self.messages_url(user_email, None)?;
        let mut ids: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;

        while (ids.len() as u32) < max_results {
            let page_size = (max_results - ids.len() as u32).min(PAGE_SIZE).to_string();
            let mut request = self
                .client
                .get(url.clone())
                .bearer_auth(self.token()?)
                .query(&[("q", query), ("maxResults", page_size.as_str())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page =
                request.send().await?.error_for_status()?.json::<MessageListResponse>().await?;
            ids.extend(page.messages.into_iter().map(|m| m.id));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        ids.truncate(max_results as usize);

        let mut messages = Vec::with_capacity(ids.len());
        for id in ids {
            let metadata = self.fetch_metadata(user_email, &id).await?;
            messages.push(metadata.into_message(user_email));
        }
        Ok(messages)
    }

    async fn delete_message(
        &self,
        user_email: &str,
        message_id: &str,
    ) -> Result<(), error::SystemError> {
        let url = self.messages_url(user_email, Some(message_id))?;
        self.client.delete(url).bearer_auth(self.token()?).send().await?.error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_urls_escape_the_mailbox() {
        let client = GmailAdminClient::new("https://gmail.googleapis.com", None).unwrap();
        let url = client.messages_url("jane doe@example.com", Some("18c2f")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://gmail.googleapis.com/gmail/v1/users/jane%20doe@example.com/messages/18c2f"
        );
        assert!(!client.is_configured());
    }

    #[test]
    fn metadata_headers_map_to_message() {
        let metadata: MessageMetadata = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "threadId": "t1",
            "snippet": "Click here",
            "payload": { "headers": [
                { "name": "From", "value": "phish@bad.example" },
                { "name": "subject", "value": "Urgent" }
            ]}
        }))
        .unwrap();

        let message = metadata.into_message("ceo@example.com");
        assert_eq!(message.from.as_deref(), Some("phish@bad.example"));
        assert_eq!(message.subject.as_deref(), Some("Urgent"));
        assert_eq!(message.to, None);
        assert_eq!(message.user_email, "ceo@example.com");
    }
}
