//! In-memory repositories and fixtures shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::{Mutex, Once};

use chrono::Utc;
use image::{ImageFormat, Rgba, RgbaImage};
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        activity::{ActivityLogEntity, ActivityLogRepository, NewActivityLog},
        email_security::{model::MailMessage, DirectoryRepository, MailProvider},
        license::repository::SettingsRepository,
        photo::{
            model::{NewPhotoAsset, NewPhotoSize, PhotoEntity, PhotoKind, PhotoUrls, StoredOriginal},
            repository::PhotoRepository,
            schema::{PhotoSizeEntity, PhotoUrlsRow},
        },
        public_file::{
            model::{NewPublicAsset, PublicAssetFilter},
            repository::PublicFileRepository,
            schema::PublicAssetEntity,
        },
        workflow::{
            model::{InsertWorkflow, ListWorkflowsQuery, UpdateWorkflow},
            repository::WorkflowRepository,
            schema::WorkflowEntity,
        },
    },
    utils::{Claims, UserRole},
    ENV,
};

static INIT_ENV: Once = Once::new();

/// Provide the required variables before `ENV` is first touched.
pub fn init_env() {
    INIT_ENV.call_once(|| {
        if std::env::var("SECRET_KEY").is_err() {
            std::env::set_var("SECRET_KEY", "test-secret");
        }
        if std::env::var("DATABASE_URL").is_err() {
            std::env::set_var("DATABASE_URL", "postgres://localhost/helios_test");
        }
    });
}

pub fn bearer_token(user_id: Uuid, organization_id: Uuid, role: UserRole) -> String {
    init_env();
    let token = Claims::new(&user_id, &organization_id, &role, 3600)
        .encode(ENV.jwt_secret.as_bytes())
        .unwrap();
    format!("Bearer {token}")
}

/// A `width` x `height` PNG with a horizontal gradient.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128, 255])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

const FORM_BOUNDARY: &str = "helios-form-boundary";

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct FormBody {
    body: Vec<u8>,
}

impl FormBody {
    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={FORM_BOUNDARY}")
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{FORM_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{FORM_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body.extend_from_slice(format!("--{FORM_BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

fn conflict(constraint: &str) -> error::SystemError {
    error::SystemError::Conflict(Some(error::DbErrorMeta {
        code: Some("23505".into()),
        constraint: Some(constraint.into()),
        message: "duplicate key value violates unique constraint".into(),
    }))
}

#[derive(Debug, Clone, Default)]
pub struct Owner {
    pub organization_id: Uuid,
    pub asset_id: Option<Uuid>,
    pub urls: PhotoUrlsRow,
}

#[derive(Default)]
pub struct InMemoryPhotoRepository {
    pub assets: Mutex<HashMap<Uuid, PublicAssetEntity>>,
    pub sizes: Mutex<Vec<PhotoSizeEntity>>,
    pub users: Mutex<HashMap<Uuid, Owner>>,
    pub organizations: Mutex<HashMap<Uuid, Owner>>,
}

impl InMemoryPhotoRepository {
    pub fn with_user(self, organization_id: Uuid, user_id: Uuid) -> Self {
        self.users.lock().unwrap().insert(user_id, Owner { organization_id, ..Default::default() });
        self
    }

    pub fn with_organization(self, organization_id: Uuid) -> Self {
        self.organizations
            .lock()
            .unwrap()
            .insert(organization_id, Owner { organization_id, ..Default::default() });
        self
    }

    pub fn asset_count(&self) -> usize {
        self.assets.lock().unwrap().len()
    }

    pub fn user(&self, user_id: &Uuid) -> Option<Owner> {
        self.users.lock().unwrap().get(user_id).cloned()
    }

    fn owners(&self, entity: PhotoEntity) -> &Mutex<HashMap<Uuid, Owner>> {
        match entity {
            PhotoEntity::User => &self.users,
            PhotoEntity::Organization => &self.organizations,
        }
    }
}

#[async_trait::async_trait]
impl PhotoRepository for InMemoryPhotoRepository {
    async fn insert_asset(
        &self,
        asset: &NewPhotoAsset,
    ) -> Result<PublicAssetEntity, error::SystemError> {
        let now = Utc::now();
        let entity = PublicAssetEntity {
            id: asset.id,
            organization_id: asset.organization_id,
            user_id: asset.user_id,
            asset_key: asset.asset_key.clone(),
            asset_type: asset.asset_type.to_string(),
            original_filename: None,
            mime_type: "image/webp".into(),
            size_bytes: 0,
            width: Some(asset.width),
            height: Some(asset.height),
            aspect_ratio: asset.aspect_ratio,
            storage_path: String::new(),
            public_url: String::new(),
            tags: Vec::new(),
            is_active: true,
            usage_count: 0,
            last_accessed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.assets.lock().unwrap().insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn attach_original(
        &self,
        asset_id: &Uuid,
        original: &StoredOriginal,
    ) -> Result<(), error::SystemError> {
        if let Some(asset) = self.assets.lock().unwrap().get_mut(asset_id) {
            asset.storage_path = original.storage_path.clone();
            asset.public_url = original.public_url.clone();
            asset.size_bytes = original.size_bytes;
        }
        Ok(())
    }

    async fn insert_size(
        &self,
        size: &NewPhotoSize,
    ) -> Result<PhotoSizeEntity, error::SystemError> {
        let entity = PhotoSizeEntity {
            id: Uuid::now_v7(),
            asset_id: size.asset_id,
            size_key: size.size.to_string(),
            width: size.size as i32,
            height: size.size as i32,
            storage_path: size.storage_path.clone(),
            public_url: size.public_url.clone(),
            file_size: size.file_size,
            created_at: Utc::now(),
        };
        self.sizes.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn owner_exists(
        &self,
        kind: PhotoKind,
        organization_id: &Uuid,
        owner_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let owners = self.owners(kind.into()).lock().unwrap();
        Ok(owners.get(owner_id).is_some_and(|o| o.organization_id == *organization_id))
    }

    async fn link_owner(
        &self,
        kind: PhotoKind,
        organization_id: &Uuid,
        owner_id: &Uuid,
        asset_id: &Uuid,
        urls: &PhotoUrls,
    ) -> Result<bool, error::SystemError> {
        let mut owners = self.owners(kind.into()).lock().unwrap();
        let Some(owner) =
            owners.get_mut(owner_id).filter(|o| o.organization_id == *organization_id)
        else {
            return Ok(false);
        };
        owner.asset_id = Some(*asset_id);
        owner.urls = PhotoUrlsRow {
            url_50: urls.get(&50).cloned(),
            url_100: urls.get(&100).cloned(),
            url_200: urls.get(&200).cloned(),
            url_400: urls.get(&400).cloned(),
        };
        Ok(true)
    }

    async fn find_asset(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<Option<PublicAssetEntity>, error::SystemError> {
        let assets = self.assets.lock().unwrap();
        Ok(assets.get(asset_id).filter(|a| a.organization_id == *organization_id).cloned())
    }

    async fn find_sizes(
        &self,
        asset_id: &Uuid,
    ) -> Result<Vec<PhotoSizeEntity>, error::SystemError> {
        let sizes = self.sizes.lock().unwrap();
        Ok(sizes.iter().filter(|s| s.asset_id == *asset_id).cloned().collect())
    }

    async fn unlink_owners(&self, asset_id: &Uuid) -> Result<(), error::SystemError> {
        for owners in [&self.users, &self.organizations] {
            for owner in owners.lock().unwrap().values_mut() {
                if owner.asset_id == Some(*asset_id) {
                    *owner = Owner { organization_id: owner.organization_id, ..Default::default() };
                }
            }
        }
        Ok(())
    }

    async fn delete_asset(&self, asset_id: &Uuid) -> Result<bool, error::SystemError> {
        self.sizes.lock().unwrap().retain(|s| s.asset_id != *asset_id);
        Ok(self.assets.lock().unwrap().remove(asset_id).is_some())
    }

    async fn find_photo_urls(
        &self,
        entity: PhotoEntity,
        organization_id: &Uuid,
        entity_id: &Uuid,
    ) -> Result<Option<PhotoUrlsRow>, error::SystemError> {
        let owners = self.owners(entity).lock().unwrap();
        Ok(owners
            .get(entity_id)
            .filter(|o| o.organization_id == *organization_id)
            .map(|o| o.urls.clone()))
    }
}

#[derive(Default)]
pub struct InMemoryPublicFileRepository {
    pub assets: Mutex<Vec<PublicAssetEntity>>,
}

impl InMemoryPublicFileRepository {
    pub fn len(&self) -> usize {
        self.assets.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl PublicFileRepository for InMemoryPublicFileRepository {
    async fn key_exists(
        &self,
        organization_id: &Uuid,
        asset_key: &str,
    ) -> Result<bool, error::SystemError> {
        let assets = self.assets.lock().unwrap();
        Ok(assets.iter().any(|a| a.organization_id == *organization_id && a.asset_key == asset_key))
    }

    async fn create(
        &self,
        asset: &NewPublicAsset,
    ) -> Result<PublicAssetEntity, error::SystemError> {
        let mut assets = self.assets.lock().unwrap();
        if assets
            .iter()
            .any(|a| a.organization_id == asset.organization_id && a.asset_key == asset.asset_key)
        {
            return Err(conflict("public_assets_organization_id_asset_key_key"));
        }

        let now = Utc::now();
        let entity = PublicAssetEntity {
            id: asset.id,
            organization_id: asset.organization_id,
            user_id: asset.user_id,
            asset_key: asset.asset_key.clone(),
            asset_type: "file".into(),
            original_filename: asset.original_filename.clone(),
            mime_type: asset.mime_type.clone(),
            size_bytes: asset.size_bytes,
            width: asset.width,
            height: asset.height,
            aspect_ratio: None,
            storage_path: asset.storage_path.clone(),
            public_url: asset.public_url.clone(),
            tags: asset.tags.clone(),
            is_active: true,
            usage_count: 0,
            last_accessed_at: None,
            created_at: now,
            updated_at: now,
        };
        assets.push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<Option<PublicAssetEntity>, error::SystemError> {
        let assets = self.assets.lock().unwrap();
        Ok(assets
            .iter()
            .find(|a| a.id == *asset_id && a.organization_id == *organization_id)
            .cloned())
    }

    async fn list(
        &self,
        organization_id: &Uuid,
        filter: &PublicAssetFilter,
    ) -> Result<Vec<PublicAssetEntity>, error::SystemError> {
        let assets = self.assets.lock().unwrap();
        let mut found: Vec<PublicAssetEntity> = assets
            .iter()
            .filter(|a| a.organization_id == *organization_id)
            .filter(|a| filter.include_inactive || a.is_active)
            .filter(|a| filter.asset_type.as_ref().is_none_or(|t| a.asset_type == *t))
            .filter(|a| filter.tag.as_ref().is_none_or(|t| a.tags.contains(t)))
            .filter(|a| {
                filter.search.as_ref().is_none_or(|s| {
                    let s = s.to_lowercase();
                    a.asset_key.to_lowercase().contains(&s)
                        || a.original_filename
                            .as_ref()
                            .is_some_and(|f| f.to_lowercase().contains(&s))
                })
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn record_usage(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<Option<PublicAssetEntity>, error::SystemError> {
        let mut assets = self.assets.lock().unwrap();
        Ok(assets
            .iter_mut()
            .find(|a| a.id == *asset_id && a.organization_id == *organization_id)
            .map(|a| {
                a.usage_count += 1;
                a.last_accessed_at = Some(Utc::now());
                a.clone()
            }))
    }

    async fn set_tags(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
        tags: &[String],
    ) -> Result<Option<PublicAssetEntity>, error::SystemError> {
        let mut assets = self.assets.lock().unwrap();
        Ok(assets
            .iter_mut()
            .find(|a| a.id == *asset_id && a.organization_id == *organization_id)
            .map(|a| {
                a.tags = tags.to_vec();
                a.clone()
            }))
    }

    async fn deactivate(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let mut assets = self.assets.lock().unwrap();
        match assets.iter_mut().find(|a| a.id == *asset_id && a.organization_id == *organization_id)
        {
            Some(a) => {
                a.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let mut assets = self.assets.lock().unwrap();
        let before = assets.len();
        assets.retain(|a| !(a.id == *asset_id && a.organization_id == *organization_id));
        Ok(assets.len() != before)
    }
}

#[derive(Default)]
pub struct InMemoryWorkflowRepository {
    pub workflows: Mutex<Vec<WorkflowEntity>>,
}

#[async_trait::async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn find_all(
        &self,
        organization_id: &Uuid,
        query: &ListWorkflowsQuery,
    ) -> Result<Vec<WorkflowEntity>, error::SystemError> {
        let workflows = self.workflows.lock().unwrap();
        let mut found: Vec<WorkflowEntity> = workflows
            .iter()
            .filter(|w| w.organization_id == *organization_id)
            .filter(|w| query.workflow_type.is_none_or(|t| w.workflow_type == t))
            .filter(|w| query.active.is_none_or(|a| w.is_active == a))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn find_by_id(
        &self,
        organization_id: &Uuid,
        id: &Uuid,
    ) -> Result<Option<WorkflowEntity>, error::SystemError> {
        let workflows = self.workflows.lock().unwrap();
        Ok(workflows.iter().find(|w| w.id == *id && w.organization_id == *organization_id).cloned())
    }

    async fn create(
        &self,
        workflow: &InsertWorkflow,
    ) -> Result<WorkflowEntity, error::SystemError> {
        let mut workflows = self.workflows.lock().unwrap();
        if workflows
            .iter()
            .any(|w| w.organization_id == workflow.organization_id && w.name == workflow.name)
        {
            return Err(conflict("workflows_organization_id_name_key"));
        }

        let now = Utc::now();
        let entity = WorkflowEntity {
            id: workflow.id,
            organization_id: workflow.organization_id,
            name: workflow.name.clone(),
            description: workflow.description.clone(),
            workflow_type: workflow.workflow_type,
            steps: sqlx::types::Json(workflow.steps.clone()),
            is_active: workflow.is_active,
            created_by: workflow.created_by,
            created_at: now,
            updated_at: now,
        };
        workflows.push(entity.clone());
        Ok(entity)
    }

    async fn update(
        &self,
        organization_id: &Uuid,
        id: &Uuid,
        workflow: &UpdateWorkflow,
    ) -> Result<Option<WorkflowEntity>, error::SystemError> {
        let mut workflows = self.workflows.lock().unwrap();
        let Some(entity) =
            workflows.iter_mut().find(|w| w.id == *id && w.organization_id == *organization_id)
        else {
            return Ok(None);
        };

        if let Some(name) = &workflow.name {
            entity.name = name.clone();
        }
        if let Some(description) = &workflow.description {
            entity.description = description.clone();
        }
        if let Some(workflow_type) = workflow.workflow_type {
            entity.workflow_type = workflow_type;
        }
        if let Some(steps) = &workflow.steps {
            entity.steps = sqlx::types::Json(steps.clone());
        }
        if let Some(is_active) = workflow.is_active {
            entity.is_active = is_active;
        }
        entity.updated_at = Utc::now();
        Ok(Some(entity.clone()))
    }

    async fn delete(&self, organization_id: &Uuid, id: &Uuid) -> Result<bool, error::SystemError> {
        let mut workflows = self.workflows.lock().unwrap();
        let before = workflows.len();
        workflows.retain(|w| !(w.id == *id && w.organization_id == *organization_id));
        Ok(workflows.len() != before)
    }
}

#[derive(Default)]
pub struct InMemoryActivityLogRepository {
    pub logs: Mutex<Vec<ActivityLogEntity>>,
}

impl InMemoryActivityLogRepository {
    pub fn actions(&self) -> Vec<String> {
        self.logs.lock().unwrap().iter().map(|l| l.action.clone()).collect()
    }
}

#[async_trait::async_trait]
impl ActivityLogRepository for InMemoryActivityLogRepository {
    async fn create(&self, log: &NewActivityLog) -> Result<ActivityLogEntity, error::SystemError> {
        let entity = ActivityLogEntity {
            id: Uuid::now_v7(),
            organization_id: log.organization_id,
            user_id: log.user_id,
            action: log.action.clone(),
            resource_type: log.resource_type.clone(),
            resource_id: log.resource_id.clone(),
            description: log.description.clone(),
            metadata: log.metadata.clone(),
            created_at: Utc::now(),
        };
        self.logs.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn find_by_action_prefix(
        &self,
        organization_id: &Uuid,
        prefix: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLogEntity>, error::SystemError> {
        let logs = self.logs.lock().unwrap();
        Ok(logs
            .iter()
            .rev()
            .filter(|l| l.organization_id == *organization_id && l.action.starts_with(prefix))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryDirectory {
    pub members: HashMap<Uuid, Vec<String>>,
}

impl InMemoryDirectory {
    pub fn with_members(organization_id: Uuid, emails: &[&str]) -> Self {
        let mut members = HashMap::new();
        members.insert(organization_id, emails.iter().map(|e| e.to_string()).collect());
        InMemoryDirectory { members }
    }
}

#[async_trait::async_trait]
impl DirectoryRepository for InMemoryDirectory {
    async fn find_active_user_emails(
        &self,
        organization_id: &Uuid,
    ) -> Result<Vec<String>, error::SystemError> {
        Ok(self.members.get(organization_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemorySettings {
    pub values: Mutex<HashMap<String, serde_json::Value>>,
}

#[async_trait::async_trait]
impl SettingsRepository for InMemorySettings {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, error::SystemError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), error::SystemError> {
        self.values.lock().unwrap().insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Mail provider serving canned mailboxes. Mailboxes listed in `failing`
/// error on every call.
#[derive(Default)]
pub struct MockMailProvider {
    pub unconfigured: bool,
    pub mailboxes: HashMap<String, Vec<MailMessage>>,
    pub failing: HashSet<String>,
    pub deleted: Mutex<Vec<(String, String)>>,
}

impl MockMailProvider {
    pub fn with_message(mut self, user_email: &str, id: &str, subject: &str) -> Self {
        self.mailboxes.entry(user_email.to_string()).or_default().push(MailMessage {
            id: id.to_string(),
            thread_id: None,
            user_email: user_email.to_string(),
            from: Some("phish@bad.example".into()),
            to: Some(user_email.to_string()),
            subject: Some(subject.to_string()),
            date: None,
            snippet: None,
        });
        self
    }

    pub fn failing_for(mut self, user_email: &str) -> Self {
        self.failing.insert(user_email.to_string());
        self
    }
}

#[async_trait::async_trait]
impl MailProvider for MockMailProvider {
    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn search_messages(
        &self,
        user_email: &str,
        _query: &str,
        max_results: u32,
    ) -> Result<Vec<MailMessage>, error::SystemError> {
        if self.failing.contains(user_email) {
            return Err(error::SystemError::internal("mailbox unavailable"));
        }
        Ok(self
            .mailboxes
            .get(user_email)
            .map(|m| m.iter().take(max_results as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_message(
        &self,
        user_email: &str,
        message_id: &str,
    ) -> Result<(), error::SystemError> {
        if self.failing.contains(user_email) {
            return Err(error::SystemError::internal("mailbox unavailable"));
        }
        self.deleted.lock().unwrap().push((user_email.to_string(), message_id.to_string()));
        Ok(())
    }
}
