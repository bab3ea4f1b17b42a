//! Folder repository (文件夹数据访问)

use super::{FolderStore, PgRepository};
use crate::{
    error::Result,
    models::folder::{check_parent_chain, AssetFolder, FolderDeletion},
};
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
impl FolderStore for PgRepository {
    /// 列出文件夹
    async fn list_folders(&self) -> Result<Vec<AssetFolder>> {
        let folders = sqlx::query_as::<_, AssetFolder>(
            "SELECT id, name, parent_id, created_at, updated_at FROM asset_folders ORDER BY name, id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(folders)
    }

    /// 获取文件夹
    async fn get_folder(&self, id: &str) -> Result<Option<AssetFolder>> {
        let folder = sqlx::query_as::<_, AssetFolder>(
            "SELECT id, name, parent_id, created_at, updated_at FROM asset_folders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(folder)
    }

    /// 创建文件夹
    async fn insert_folder(&self, folder: &AssetFolder) -> Result<AssetFolder> {
        let created = sqlx::query_as::<_, AssetFolder>(
            r#"
            INSERT INTO asset_folders (id, name, parent_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, parent_id, created_at, updated_at
            "#,
        )
        .bind(&folder.id)
        .bind(&folder.name)
        .bind(&folder.parent_id)
        .bind(folder.created_at)
        .bind(folder.updated_at)
        .fetch_one(&self.db)
        .await?;

        Ok(created)
    }

    /// 更新文件夹
    async fn update_folder(
        &self,
        id: &str,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<Option<AssetFolder>> {
        let mut tx = self.db.begin().await?;

        // 阻止其他事务在检查与写入之间改动父链
        sqlx::query("LOCK TABLE asset_folders IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        if let Some(parent_id) = parent_id {
            let parents: HashMap<String, Option<String>> =
                sqlx::query_as::<_, (String, Option<String>)>(
                    "SELECT id, parent_id FROM asset_folders",
                )
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .collect();
            check_parent_chain(id, parent_id, &parents)?;
        }

        let folder = sqlx::query_as::<_, AssetFolder>(
            r#"
            UPDATE asset_folders
            SET name = $2, parent_id = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, parent_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(parent_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(folder)
    }

    /// 删除文件夹
    ///
    /// 在同一事务内解除资产与子文件夹的引用后删除；任一步失败时事务随
    /// `tx` 释放而回滚
    async fn delete_folder(&self, id: &str) -> Result<Option<FolderDeletion>> {
        let mut tx = self.db.begin().await?;

        let exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM asset_folders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        if exists.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let detached_assets = sqlx::query(
            "UPDATE assets SET folder_id = NULL, updated_at = NOW() WHERE folder_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let detached_folders = sqlx::query(
            "UPDATE asset_folders SET parent_id = NULL, updated_at = NOW() WHERE parent_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("DELETE FROM asset_folders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(FolderDeletion {
            detached_assets,
            detached_folders,
        }))
    }
}
