//! Asset repository (资产数据访问)

use super::{AssetPatch, AssetStore, PgRepository};
use crate::{
    db::{self, HealthStatus},
    error::Result,
    models::asset::{Asset, AssetStatus},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

const ASSET_COLUMNS: &str = r#"id, name, type, status, last_checked, grafana_link,
    configuration, tags, folder_id, created_at, updated_at"#;

#[async_trait]
impl AssetStore for PgRepository {
    /// 列出资产
    async fn list_assets(&self, folder_id: Option<&str>) -> Result<Vec<Asset>> {
        let assets = if let Some(folder_id) = folder_id {
            sqlx::query_as::<_, Asset>(&format!(
                "SELECT {} FROM assets WHERE folder_id = $1 ORDER BY name, id",
                ASSET_COLUMNS
            ))
            .bind(folder_id)
            .fetch_all(&self.db)
            .await?
        } else {
            sqlx::query_as::<_, Asset>(&format!(
                "SELECT {} FROM assets ORDER BY name, id",
                ASSET_COLUMNS
            ))
            .fetch_all(&self.db)
            .await?
        };

        Ok(assets)
    }

    /// 获取资产
    async fn get_asset(&self, id: &str) -> Result<Option<Asset>> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            "SELECT {} FROM assets WHERE id = $1",
            ASSET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(asset)
    }

    /// 创建资产
    async fn insert_asset(&self, asset: &Asset) -> Result<Asset> {
        let created = sqlx::query_as::<_, Asset>(&format!(
            r#"
            INSERT INTO assets (
                id, name, type, status, last_checked, grafana_link,
                configuration, tags, folder_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            ASSET_COLUMNS
        ))
        .bind(&asset.id)
        .bind(&asset.name)
        .bind(asset.asset_type)
        .bind(asset.status)
        .bind(asset.last_checked)
        .bind(&asset.grafana_link)
        .bind(&asset.configuration)
        .bind(&asset.tags)
        .bind(&asset.folder_id)
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .fetch_one(&self.db)
        .await?;

        Ok(created)
    }

    /// 部分更新资产
    ///
    /// 每个字段带一个布尔开关，区分“未提供”与“显式置空”
    async fn update_asset(&self, id: &str, patch: &AssetPatch) -> Result<Option<Asset>> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            r#"
            UPDATE assets
            SET
                tags = CASE WHEN $2 THEN $3 ELSE tags END,
                grafana_link = CASE WHEN $4 THEN $5 ELSE grafana_link END,
                folder_id = CASE WHEN $6 THEN $7 ELSE folder_id END,
                configuration = CASE WHEN $8 THEN $9 ELSE configuration END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ASSET_COLUMNS
        ))
        .bind(id)
        .bind(patch.tags.is_some())
        .bind(patch.tags.clone().unwrap_or_default())
        .bind(patch.grafana_link.is_some())
        .bind(patch.grafana_link.clone().flatten())
        .bind(patch.folder_id.is_some())
        .bind(patch.folder_id.clone().flatten())
        .bind(patch.configuration.is_some())
        .bind(patch.configuration.clone().unwrap_or(Value::Null))
        .fetch_optional(&self.db)
        .await?;

        Ok(asset)
    }

    /// 整体替换抓取配置
    async fn replace_configuration(
        &self,
        id: &str,
        configuration: &Value,
        checked_at: DateTime<Utc>,
    ) -> Result<Option<Asset>> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            r#"
            UPDATE assets
            SET configuration = $2, last_checked = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ASSET_COLUMNS
        ))
        .bind(id)
        .bind(configuration)
        .bind(checked_at)
        .fetch_optional(&self.db)
        .await?;

        Ok(asset)
    }

    /// 更新状态（同时刷新检查时间）
    async fn set_status(
        &self,
        id: &str,
        status: AssetStatus,
        checked_at: DateTime<Utc>,
    ) -> Result<Option<Asset>> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            r#"
            UPDATE assets
            SET status = $2, last_checked = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ASSET_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .bind(checked_at)
        .fetch_optional(&self.db)
        .await?;

        Ok(asset)
    }

    /// 删除资产
    async fn delete_asset(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> HealthStatus {
        db::record_pool_metrics(&self.db);
        db::health_check(&self.db).await
    }
}
