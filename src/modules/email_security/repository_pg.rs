use uuid::Uuid;

use crate::{api::error, modules::email_security::repository::DirectoryRepository};

#[derive(Clone)]
pub struct DirectoryRepositoryPg {
    pool: sqlx::PgPool,
}

impl DirectoryRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DirectoryRepository for DirectoryRepositoryPg {
    async fn find_active_user_emails(
        &self,
        organization_id: &Uuid,
    ) -> Result<Vec<String>, error::SystemError> {
        let emails = sqlx::query_scalar::<_, String>(
            r#"
            SELECT email FROM organization_users
            WHERE organization_id = $1 AND is_active
            ORDER BY email
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(emails)
    }
}
