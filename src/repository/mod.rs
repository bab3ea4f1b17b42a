//! Persistence layer
//!
//! Business logic talks to [`AssetStore`] and [`FolderStore`]; the Postgres
//! implementation is authoritative at runtime, the in-memory one backs tests.

pub mod asset_repo;
pub mod folder_repo;
pub mod memory;

pub use memory::MemoryStore;

use crate::{
    db::HealthStatus,
    error::Result,
    models::{
        asset::{Asset, AssetStatus},
        folder::{AssetFolder, FolderDeletion},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

/// Resolved partial update; `None` leaves the stored column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPatch {
    pub tags: Option<Vec<String>>,
    pub grafana_link: Option<Option<String>>,
    pub folder_id: Option<Option<String>>,
    pub configuration: Option<Value>,
}

impl AssetPatch {
    pub fn apply(&self, asset: &mut Asset) {
        if let Some(tags) = &self.tags {
            asset.tags = tags.clone();
        }
        if let Some(link) = &self.grafana_link {
            asset.grafana_link = link.clone();
        }
        if let Some(folder_id) = &self.folder_id {
            asset.folder_id = folder_id.clone();
        }
        if let Some(configuration) = &self.configuration {
            asset.configuration = configuration.clone();
        }
    }
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Assets ordered by name, optionally restricted to one folder
    async fn list_assets(&self, folder_id: Option<&str>) -> Result<Vec<Asset>>;

    async fn get_asset(&self, id: &str) -> Result<Option<Asset>>;

    async fn insert_asset(&self, asset: &Asset) -> Result<Asset>;

    async fn update_asset(&self, id: &str, patch: &AssetPatch) -> Result<Option<Asset>>;

    /// Replace the whole configuration object and refresh `last_checked`
    async fn replace_configuration(
        &self,
        id: &str,
        configuration: &Value,
        checked_at: DateTime<Utc>,
    ) -> Result<Option<Asset>>;

    /// Write a status together with its timestamp
    async fn set_status(
        &self,
        id: &str,
        status: AssetStatus,
        checked_at: DateTime<Utc>,
    ) -> Result<Option<Asset>>;

    async fn delete_asset(&self, id: &str) -> Result<bool>;

    async fn ping(&self) -> HealthStatus;
}

#[async_trait]
pub trait FolderStore: Send + Sync {
    /// Folders ordered by name
    async fn list_folders(&self) -> Result<Vec<AssetFolder>>;

    async fn get_folder(&self, id: &str) -> Result<Option<AssetFolder>>;

    async fn insert_folder(&self, folder: &AssetFolder) -> Result<AssetFolder>;

    /// Rename and re-parent. The parent chain is checked in the same
    /// critical section as the write, so concurrent moves cannot form a cycle.
    async fn update_folder(
        &self,
        id: &str,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<Option<AssetFolder>>;

    /// Unlink assets and child folders, then remove the folder, all or nothing.
    /// Returns `None` when the folder does not exist.
    async fn delete_folder(&self, id: &str) -> Result<Option<FolderDeletion>>;
}

/// PostgreSQL 仓库
#[derive(Clone)]
pub struct PgRepository {
    db: PgPool,
}

impl PgRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// 生成带前缀的唯一标识
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}
