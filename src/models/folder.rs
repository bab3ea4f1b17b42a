//! Asset folder models

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Folder in the asset hierarchy; `parent_id = None` marks a root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssetFolder {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create folder request
#[derive(Debug, Clone, Default, Deserialize, validator::Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "name must be at most 255 characters"))]
    pub name: String,
    pub parent_id: Option<String>,
}

/// Update folder request
///
/// An absent `parentId` keeps the current parent, `null` moves the folder to
/// the root. An empty string is rejected.
#[derive(Debug, Clone, Default, Deserialize, validator::Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFolderRequest {
    #[validate(length(max = 255, message = "name must be at most 255 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    pub parent_id: Option<Option<String>>,
}

/// Outcome of a folder deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDeletion {
    pub detached_assets: u64,
    pub detached_folders: u64,
}

fn explicit<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// 沿 `parent_id` 向上走，直到根
///
/// 遇到 `folder_id` 本身即为环；遇到不存在的文件夹即为断链。跳数不超过
/// 文件夹总数，已有数据中的环也会被拒绝。
pub fn check_parent_chain(
    folder_id: &str,
    parent_id: &str,
    parents: &HashMap<String, Option<String>>,
) -> crate::error::Result<()> {
    let mut current = Some(parent_id);
    let mut hops = 0usize;

    while let Some(id) = current {
        if id == folder_id {
            return Err(AppError::Validation(format!(
                "circular dependency: folder {} is an ancestor of {}",
                folder_id, parent_id
            )));
        }
        let Some(next) = parents.get(id) else {
            return Err(AppError::Validation(format!(
                "invalid parent chain: folder {} does not exist",
                id
            )));
        };
        hops += 1;
        if hops > parents.len() {
            return Err(AppError::validation(
                "invalid parent chain: existing folders already form a cycle",
            ));
        }
        current = next.as_deref();
    }

    Ok(())
}
