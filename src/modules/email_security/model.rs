use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SearchMessagesQuery {
    #[validate(length(min = 1, max = 320))]
    pub sender: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub subject: Option<String>,
    pub after: Option<NaiveDate>,
    pub before: Option<NaiveDate>,
    /// Raw provider search syntax appended as-is.
    #[validate(length(min = 1, max = 1000))]
    pub query: Option<String>,
    #[validate(range(min = 1, max = 500, message = "max_results must be between 1 and 500"))]
    pub max_results: Option<u32>,
}

impl SearchMessagesQuery {
    /// Provider search string, `None` when no criterion was given.
    pub fn to_provider_query(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(sender) = self.sender.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            parts.push(format!("from:{}", sender));
        }
        if let Some(subject) = self.subject.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            parts.push(format!("subject:({})", subject));
        }
        if let Some(after) = self.after {
            parts.push(format!("after:{}", after.format("%Y/%m/%d")));
        }
        if let Some(before) = self.before {
            parts.push(format!("before:{}", before.format("%Y/%m/%d")));
        }
        if let Some(raw) = self.query.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            parts.push(raw.to_string());
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    pub id: String,
    pub thread_id: Option<String>,
    pub user_email: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub date: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxError {
    pub user_email: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub query: String,
    pub users_searched: usize,
    pub messages: Vec<MailMessage>,
    pub errors: Vec<MailboxError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    #[validate(email(message = "Invalid user email"))]
    pub user_email: String,
    #[validate(length(min = 1, max = 200, message = "Invalid message id"))]
    pub message_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeleteMessagesBody {
    #[validate(length(min = 1, max = 500, message = "Provide between 1 and 500 messages"), nested)]
    pub messages: Vec<MessageRef>,
    #[validate(length(max = 500, message = "Reason is too long"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedDelete {
    pub user_email: String,
    pub message_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub requested: usize,
    pub deleted: usize,
    pub failed: Vec<FailedDelete>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
    #[validate(range(min = 0, message = "Offset cannot be negative"))]
    pub offset: Option<i64>,
}
