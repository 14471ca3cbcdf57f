use uuid::Uuid;

use crate::{
    api::error,
    modules::activity::{model::NewActivityLog, schema::ActivityLogEntity},
};

#[async_trait::async_trait]
pub trait ActivityLogRepository {
    async fn create(&self, log: &NewActivityLog) -> Result<ActivityLogEntity, error::SystemError>;

    /// Newest first, restricted to actions starting with `prefix`.
    async fn find_by_action_prefix(
        &self,
        organization_id: &Uuid,
        prefix: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLogEntity>, error::SystemError>;
}
