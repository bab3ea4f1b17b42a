//! 文件夹树管理服务

use crate::{
    error::{AppError, Result},
    models::folder::{
        check_parent_chain, AssetFolder, CreateFolderRequest, FolderDeletion,
        UpdateFolderRequest,
    },
    repository::{new_id, FolderStore},
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

pub struct FolderService {
    folders: Arc<dyn FolderStore>,
}

impl FolderService {
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self { folders }
    }

    /// 列出文件夹
    pub async fn list(&self) -> Result<Vec<AssetFolder>> {
        self.folders.list_folders().await
    }

    /// 获取文件夹
    pub async fn get(&self, id: &str) -> Result<AssetFolder> {
        self.folders
            .get_folder(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("folder {}", id)))
    }

    /// 创建文件夹
    pub async fn create(&self, req: CreateFolderRequest) -> Result<AssetFolder> {
        req.validate()?;
        let name = required_name(&req.name)?;

        let parent_id = match req.parent_id {
            Some(parent_id) => {
                let parent_id = non_empty_parent(&parent_id)?;
                if self.folders.get_folder(parent_id).await?.is_none() {
                    return Err(AppError::Validation(format!(
                        "parentId references a folder that does not exist: {}",
                        parent_id
                    )));
                }
                Some(parent_id.to_string())
            }
            None => None,
        };

        let now = Utc::now();
        let folder = AssetFolder {
            id: new_id("folder"),
            name,
            parent_id,
            created_at: now,
            updated_at: now,
        };

        let created = self.folders.insert_folder(&folder).await?;
        info!(folder_id = %created.id, name = %created.name, "Folder created");
        Ok(created)
    }

    /// 更新文件夹
    ///
    /// 校验顺序：名称非空、parentId 非空、不能以自身为父、父链无环且完整
    pub async fn update(&self, id: &str, req: UpdateFolderRequest) -> Result<AssetFolder> {
        req.validate()?;
        let current = self.get(id).await?;

        let name = match &req.name {
            Some(name) => required_name(name)?,
            None => current.name.clone(),
        };

        let parent_id = match &req.parent_id {
            None => current.parent_id.clone(),
            Some(None) => None,
            Some(Some(parent_id)) => Some(non_empty_parent(parent_id)?.to_string()),
        };

        if let Some(parent_id) = &parent_id {
            if parent_id == id {
                return Err(AppError::validation("a folder cannot be its own parent"));
            }

            let parents: HashMap<String, Option<String>> = self
                .folders
                .list_folders()
                .await?
                .into_iter()
                .map(|f| (f.id, f.parent_id))
                .collect();
            check_parent_chain(id, parent_id, &parents)?;
        }

        let updated = self
            .folders
            .update_folder(id, &name, parent_id.as_deref())
            .await?
            .ok_or_else(|| AppError::not_found(format!("folder {}", id)))?;

        info!(folder_id = %id, parent_id = ?updated.parent_id, "Folder updated");
        Ok(updated)
    }

    /// 删除文件夹，资产与子文件夹移到根级
    pub async fn delete(&self, id: &str) -> Result<FolderDeletion> {
        let deletion = self.folders.delete_folder(id).await?.ok_or_else(|| {
            warn!(folder_id = %id, "Delete requested for missing folder");
            AppError::not_found(format!("folder {}", id))
        })?;

        info!(
            folder_id = %id,
            detached_assets = deletion.detached_assets,
            detached_folders = deletion.detached_folders,
            "Folder deleted"
        );
        Ok(deletion)
    }
}

fn required_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }
    Ok(name.to_string())
}

fn non_empty_parent(parent_id: &str) -> Result<&str> {
    let parent_id = parent_id.trim();
    if parent_id.is_empty() {
        return Err(AppError::validation("parentId must be a non-empty string"));
    }
    Ok(parent_id)
}
