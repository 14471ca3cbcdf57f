use uuid::Uuid;

use crate::{
    api::error,
    modules::activity::{
        model::NewActivityLog, repository::ActivityLogRepository, schema::ActivityLogEntity,
    },
};

#[derive(Clone)]
pub struct ActivityLogRepositoryPg {
    pool: sqlx::PgPool,
}

impl ActivityLogRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ActivityLogRepository for ActivityLogRepositoryPg {
    async fn create(&self, log: &NewActivityLog) -> Result<ActivityLogEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, ActivityLogEntity>(
            r#"
            INSERT INTO activity_logs
                (id, organization_id, user_id, action, resource_type, resource_id, description, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(log.organization_id)
        .bind(log.user_id)
        .bind(&log.action)
        .bind(&log.resource_type)
        .bind(&log.resource_id)
        .bind(&log.description)
        .bind(&log.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn find_by_action_prefix(
        &self,
        organization_id: &Uuid,
        prefix: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLogEntity>, error::SystemError> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        let logs = sqlx::query_as::<_, ActivityLogEntity>(
            r#"
            SELECT * FROM activity_logs
            WHERE organization_id = $1 AND action LIKE $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(organization_id)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
