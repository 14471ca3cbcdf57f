use uuid::Uuid;

use crate::api::error;

#[async_trait::async_trait]
pub trait DirectoryRepository {
    /// Mailbox addresses of the organization's active users.
    async fn find_active_user_emails(
        &self,
        organization_id: &Uuid,
    ) -> Result<Vec<String>, error::SystemError>;
}
