use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        activity::{ActivityLogEntity, ActivityLogRepository, NewActivityLog},
        email_security::{
            model::{
                DeleteMessagesBody, DeleteResult, FailedDelete, HistoryQuery, MailboxError,
                SearchMessagesQuery, SearchResult,
            },
            provider::MailProvider,
            repository::DirectoryRepository,
        },
    },
};

const DEFAULT_MAX_RESULTS: u32 = 100;
const ACTION_PREFIX: &str = "email_security.";

/// Search and purge messages across an organization's mailboxes, with every
/// action recorded in the activity log.
#[derive(Clone)]
pub struct EmailSecurityService {
    directory: Arc<dyn DirectoryRepository + Send + Sync>,
    activity: Arc<dyn ActivityLogRepository + Send + Sync>,
    provider: Arc<dyn MailProvider + Send + Sync>,
}

impl EmailSecurityService {
    pub fn with_dependencies(
        directory: Arc<dyn DirectoryRepository + Send + Sync>,
        activity: Arc<dyn ActivityLogRepository + Send + Sync>,
        provider: Arc<dyn MailProvider + Send + Sync>,
    ) -> Self {
        EmailSecurityService { directory, activity, provider }
    }

    fn ensure_configured(&self) -> Result<(), error::SystemError> {
        if !self.provider.is_configured() {
            return Err(error::SystemError::bad_request("Mail provider is not configured"));
        }
        Ok(())
    }

    async fn audit(&self, log: NewActivityLog) {
        if let Err(e) = self.activity.create(&log).await {
            log::error!("Failed to record activity {}: {:?}", log.action, e);
        }
    }

    pub async fn search(
        &self,
        organization_id: Uuid,
        actor_id: Uuid,
        query: SearchMessagesQuery,
    ) -> Result<SearchResult, error::SystemError> {
        let provider_query = query.to_provider_query().ok_or_else(|| {
            error::SystemError::bad_request("Provide at least one search criterion")
        })?;
        self.ensure_configured()?;
        let max_results = query.max_results.unwrap_or(DEFAULT_MAX_RESULTS);

        let users = self.directory.find_active_user_emails(&organization_id).await?;

        let mut messages = Vec::new();
        let mut errors = Vec::new();
        for user_email in &users {
            match self.provider.search_messages(user_email, &provider_query, max_results).await {
                Ok(found) => messages.extend(found),
                Err(e) => {
                    log::warn!("Mailbox search failed for {}: {}", user_email, e);
                    errors.push(MailboxError { user_email: user_email.clone(), error: e.to_string() });
                }
            }
        }

        self.audit(NewActivityLog {
            organization_id,
            user_id: Some(actor_id),
            action: "email_security.search".to_string(),
            resource_type: "email".to_string(),
            resource_id: None,
            description: format!(
                "Searched {} mailboxes, {} messages matched",
                users.len(),
                messages.len()
            ),
            metadata: serde_json::json!({
                "query": provider_query,
                "usersSearched": users.len(),
                "results": messages.len(),
                "errors": errors.len(),
            }),
        })
        .await;

        Ok(SearchResult { query: provider_query, users_searched: users.len(), messages, errors })
    }

    /// Deletes messages one at a time; a failing item is reported and skipped.
    pub async fn delete(
        &self,
        organization_id: Uuid,
        actor_id: Uuid,
        body: DeleteMessagesBody,
    ) -> Result<DeleteResult, error::SystemError> {
        self.ensure_configured()?;

        let members: HashSet<String> = self
            .directory
            .find_active_user_emails(&organization_id)
            .await?
            .into_iter()
            .map(|e| e.to_lowercase())
            .collect();

        let requested = body.messages.len();
        let mut deleted = 0;
        let mut failed = Vec::new();
        for item in &body.messages {
            if !members.contains(&item.user_email.to_lowercase()) {
                failed.push(FailedDelete {
                    user_email: item.user_email.clone(),
                    message_id: item.message_id.clone(),
                    error: "User not in organization".to_string(),
                });
                continue;
            }

            match self.provider.delete_message(&item.user_email, &item.message_id).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    log::warn!(
                        "Failed to delete message {} for {}: {}",
                        item.message_id,
                        item.user_email,
                        e
                    );
                    failed.push(FailedDelete {
                        user_email: item.user_email.clone(),
                        message_id: item.message_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        self.audit(NewActivityLog {
            organization_id,
            user_id: Some(actor_id),
            action: "email_security.delete".to_string(),
            resource_type: "email".to_string(),
            resource_id: None,
            description: format!("Deleted {} of {} messages", deleted, requested),
            metadata: serde_json::json!({
                "requested": requested,
                "deleted": deleted,
                "failed": failed.len(),
                "reason": body.reason,
                "messages": body.messages,
            }),
        })
        .await;

        Ok(DeleteResult { requested, deleted, failed })
    }

    pub async fn history(
        &self,
        organization_id: Uuid,
        query: HistoryQuery,
    ) -> Result<Vec<ActivityLogEntity>, error::SystemError> {
        self.activity
            .find_by_action_prefix(
                &organization_id,
                ACTION_PREFIX,
                query.limit.unwrap_or(50),
                query.offset.unwrap_or(0),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        modules::email_security::model::MessageRef,
        test::{InMemoryActivityLogRepository, InMemoryDirectory, MockMailProvider},
    };

    struct Fixture {
        org: Uuid,
        actor: Uuid,
        activity: Arc<InMemoryActivityLogRepository>,
        provider: Arc<MockMailProvider>,
        service: EmailSecurityService,
    }

    fn fixture(provider: MockMailProvider) -> Fixture {
        let org = Uuid::new_v4();
        let directory =
            InMemoryDirectory::with_members(org, &["ada@example.com", "grace@example.com"]);
        let activity = Arc::new(InMemoryActivityLogRepository::default());
        let provider = Arc::new(provider);
        let service = EmailSecurityService::with_dependencies(
            Arc::new(directory),
            activity.clone(),
            provider.clone(),
        );
        Fixture { org, actor: Uuid::new_v4(), activity, provider, service }
    }

    fn by_sender() -> SearchMessagesQuery {
        SearchMessagesQuery { sender: Some("phish@bad.example".into()), ..Default::default() }
    }

    #[tokio::test]
    async fn search_collects_across_mailboxes_and_audits() {
        let f = fixture(
            MockMailProvider::default()
                .with_message("ada@example.com", "m1", "Invoice")
                .with_message("grace@example.com", "m2", "Invoice"),
        );

        let result = f.service.search(f.org, f.actor, by_sender()).await.unwrap();
        assert_eq!(result.query, "from:phish@bad.example");
        assert_eq!(result.users_searched, 2);
        assert_eq!(result.messages.len(), 2);
        assert!(result.errors.is_empty());
        assert_eq!(f.activity.actions(), vec!["email_security.search"]);
    }

    #[tokio::test]
    async fn failing_mailbox_is_reported_not_fatal() {
        let f = fixture(
            MockMailProvider::default()
                .with_message("ada@example.com", "m1", "Invoice")
                .failing_for("grace@example.com"),
        );

        let result = f.service.search(f.org, f.actor, by_sender()).await.unwrap();
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].user_email, "grace@example.com");
    }

    #[tokio::test]
    async fn search_needs_criteria_and_configuration() {
        let f = fixture(MockMailProvider::default());
        let err = f.service.search(f.org, f.actor, SearchMessagesQuery::default()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));

        let f = fixture(MockMailProvider { unconfigured: true, ..Default::default() });
        let err = f.service.search(f.org, f.actor, by_sender()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));
        assert!(f.activity.actions().is_empty());
    }

    #[tokio::test]
    async fn delete_skips_outsiders_and_counts_successes() {
        let f = fixture(MockMailProvider::default());
        let body = DeleteMessagesBody {
            messages: vec![
                MessageRef { user_email: "Ada@example.com".into(), message_id: "m1".into() },
                MessageRef { user_email: "mallory@other.example".into(), message_id: "m9".into() },
            ],
            reason: Some("phishing".into()),
        };

        let result = f.service.delete(f.org, f.actor, body).await.unwrap();
        assert_eq!(result.requested, 2);
        assert_eq!(result.deleted, 1);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].error, "User not in organization");
        assert_eq!(
            *f.provider.deleted.lock().unwrap(),
            vec![("Ada@example.com".to_string(), "m1".to_string())]
        );
    }

    #[tokio::test]
    async fn history_lists_only_email_security_actions() {
        let f = fixture(MockMailProvider::default());
        f.service.search(f.org, f.actor, by_sender()).await.unwrap();
        f.activity
            .create(&NewActivityLog {
                organization_id: f.org,
                user_id: None,
                action: "user.created".into(),
                resource_type: "user".into(),
                resource_id: None,
                description: "unrelated".into(),
                metadata: serde_json::json!({}),
            })
            .await
            .unwrap();
        let body = DeleteMessagesBody {
            messages: vec![MessageRef { user_email: "ada@example.com".into(), message_id: "m1".into() }],
            reason: None,
        };
        f.service.delete(f.org, f.actor, body).await.unwrap();

        let history = f.service.history(f.org, HistoryQuery::default()).await.unwrap();
        let actions: Vec<_> = history.iter().map(|l| l.action.as_str()).collect();
        assert_eq!(actions, vec!["email_security.delete", "email_security.search"]);

        let page = f
            .service
            .history(f.org, HistoryQuery { limit: Some(1), offset: Some(1) })
            .await
            .unwrap();
        assert_eq!(page[0].action, "email_security.search");
    }
}
