//! In-memory store
//!
//! Same contract as the Postgres repository. Each operation runs under one
//! lock, which gives folder deletion the same all-or-nothing behaviour as the
//! transactional version.

use super::{AssetPatch, AssetStore, FolderStore};
use crate::{
    db::HealthStatus,
    error::{AppError, Result},
    models::{
        asset::{Asset, AssetStatus},
        folder::{check_parent_chain, AssetFolder, FolderDeletion},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    assets: HashMap<String, Asset>,
    folders: HashMap<String, AssetFolder>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| AppError::internal_error("memory store lock poisoned"))
    }
}

fn by_name<T>(items: &mut [T], key: impl Fn(&T) -> (&str, &str)) {
    items.sort_by(|a, b| key(a).cmp(&key(b)));
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn list_assets(&self, folder_id: Option<&str>) -> Result<Vec<Asset>> {
        let state = self.lock()?;
        let mut assets: Vec<Asset> = state
            .assets
            .values()
            .filter(|a| folder_id.map_or(true, |f| a.folder_id.as_deref() == Some(f)))
            .cloned()
            .collect();
        by_name(&mut assets, |a| (a.name.as_str(), a.id.as_str()));
        Ok(assets)
    }

    async fn get_asset(&self, id: &str) -> Result<Option<Asset>> {
        Ok(self.lock()?.assets.get(id).cloned())
    }

    async fn insert_asset(&self, asset: &Asset) -> Result<Asset> {
        let mut state = self.lock()?;
        if state.assets.contains_key(&asset.id) {
            return Err(AppError::internal_error("duplicate asset id"));
        }
        if let Some(folder_id) = &asset.folder_id {
            if !state.folders.contains_key(folder_id) {
                return Err(AppError::internal_error("asset references a missing folder"));
            }
        }
        state.assets.insert(asset.id.clone(), asset.clone());
        Ok(asset.clone())
    }

    async fn update_asset(&self, id: &str, patch: &AssetPatch) -> Result<Option<Asset>> {
        let mut state = self.lock()?;
        if let Some(Some(folder_id)) = &patch.folder_id {
            if !state.folders.contains_key(folder_id) {
                return Err(AppError::internal_error("asset references a missing folder"));
            }
        }
        let Some(asset) = state.assets.get_mut(id) else {
            return Ok(None);
        };
        patch.apply(asset);
        asset.updated_at = Utc::now();
        Ok(Some(asset.clone()))
    }

    async fn replace_configuration(
        &self,
        id: &str,
        configuration: &Value,
        checked_at: DateTime<Utc>,
    ) -> Result<Option<Asset>> {
        let mut state = self.lock()?;
        let Some(asset) = state.assets.get_mut(id) else {
            return Ok(None);
        };
        asset.configuration = configuration.clone();
        asset.last_checked = checked_at;
        asset.updated_at = Utc::now();
        Ok(Some(asset.clone()))
    }

    async fn set_status(
        &self,
        id: &str,
        status: AssetStatus,
        checked_at: DateTime<Utc>,
    ) -> Result<Option<Asset>> {
        let mut state = self.lock()?;
        let Some(asset) = state.assets.get_mut(id) else {
            return Ok(None);
        };
        asset.status = status;
        asset.last_checked = checked_at;
        asset.updated_at = Utc::now();
        Ok(Some(asset.clone()))
    }

    async fn delete_asset(&self, id: &str) -> Result<bool> {
        Ok(self.lock()?.assets.remove(id).is_some())
    }

    async fn ping(&self) -> HealthStatus {
        match self.lock() {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn list_folders(&self) -> Result<Vec<AssetFolder>> {
        let state = self.lock()?;
        let mut folders: Vec<AssetFolder> = state.folders.values().cloned().collect();
        by_name(&mut folders, |f| (f.name.as_str(), f.id.as_str()));
        Ok(folders)
    }

    async fn get_folder(&self, id: &str) -> Result<Option<AssetFolder>> {
        Ok(self.lock()?.folders.get(id).cloned())
    }

    async fn insert_folder(&self, folder: &AssetFolder) -> Result<AssetFolder> {
        let mut state = self.lock()?;
        if state.folders.contains_key(&folder.id) {
            return Err(AppError::internal_error("duplicate folder id"));
        }
        if let Some(parent_id) = &folder.parent_id {
            if !state.folders.contains_key(parent_id) {
                return Err(AppError::internal_error("folder references a missing parent"));
            }
        }
        state.folders.insert(folder.id.clone(), folder.clone());
        Ok(folder.clone())
    }

    async fn update_folder(
        &self,
        id: &str,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<Option<AssetFolder>> {
        let mut state = self.lock()?;
        if let Some(parent_id) = parent_id {
            let parents: HashMap<String, Option<String>> = state
                .folders
                .values()
                .map(|f| (f.id.clone(), f.parent_id.clone()))
                .collect();
            check_parent_chain(id, parent_id, &parents)?;
        }
        let Some(folder) = state.folders.get_mut(id) else {
            return Ok(None);
        };
        folder.name = name.to_string();
        folder.parent_id = parent_id.map(str::to_string);
        folder.updated_at = Utc::now();
        Ok(Some(folder.clone()))
    }

    async fn delete_folder(&self, id: &str) -> Result<Option<FolderDeletion>> {
        let mut state = self.lock()?;
        if !state.folders.contains_key(id) {
            return Ok(None);
        }

        let now = Utc::now();
        let mut deletion = FolderDeletion {
            detached_assets: 0,
            detached_folders: 0,
        };

        for asset in state.assets.values_mut() {
            if asset.folder_id.as_deref() == Some(id) {
                asset.folder_id = None;
                asset.updated_at = now;
                deletion.detached_assets += 1;
            }
        }
        for folder in state.folders.values_mut() {
            if folder.parent_id.as_deref() == Some(id) {
                folder.parent_id = None;
                folder.updated_at = now;
                deletion.detached_folders += 1;
            }
        }
        state.folders.remove(id);

        Ok(Some(deletion))
    }
}
