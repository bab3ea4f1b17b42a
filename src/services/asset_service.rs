//! 资产服务
//! 资产的创建、部分更新、配置替换与删除

use crate::{
    error::{AppError, Result},
    models::asset::{
        normalize_ref, normalize_tags, Asset, AssetStatus, CreateAssetRequest,
        UpdateAssetRequest,
    },
    prometheus::{generate, Generated, GeneratorInput},
    repository::{new_id, AssetPatch, AssetStore, FolderStore},
};
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub struct AssetService {
    assets: Arc<dyn AssetStore>,
    folders: Arc<dyn FolderStore>,
}

impl AssetService {
    pub fn new(assets: Arc<dyn AssetStore>, folders: Arc<dyn FolderStore>) -> Self {
        Self { assets, folders }
    }

    /// 列出资产（按名称排序）
    pub async fn list(&self, folder_id: Option<&str>) -> Result<Vec<Asset>> {
        self.assets.list_assets(folder_id).await
    }

    /// 获取资产
    pub async fn get(&self, id: &str) -> Result<Asset> {
        self.assets
            .get_asset(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("asset {}", id)))
    }

    /// 创建资产
    ///
    /// 新资产状态为 pending；提供 param1 时由生成器产出初始抓取配置
    pub async fn create(&self, req: CreateAssetRequest) -> Result<Asset> {
        req.validate()?;

        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("name must not be empty"));
        }
        let asset_type = req
            .asset_type
            .ok_or_else(|| AppError::validation("type is required"))?;

        let folder_id = normalize_ref(req.folder_id);
        if let Some(folder_id) = &folder_id {
            self.require_folder(folder_id).await?;
        }

        let configuration = if normalize_ref(req.param1.clone()).is_some() {
            let input = GeneratorInput {
                asset_type: Some(asset_type),
                name: Some(name.clone()),
                param1: req.param1,
                param2: req.param2,
            };
            match generate(&input) {
                Generated::Job { job, .. } => job.to_value(),
                Generated::Incomplete { message } => return Err(AppError::Validation(message)),
            }
        } else {
            match req.configuration {
                Some(value) => require_object(value)?,
                None => Value::Object(Map::new()),
            }
        };

        let now = Utc::now();
        let asset = Asset {
            id: new_id("asset"),
            name,
            asset_type,
            status: AssetStatus::Pending,
            last_checked: now,
            grafana_link: normalize_ref(req.grafana_link),
            configuration,
            tags: normalize_tags(req.tags),
            folder_id,
            created_at: now,
            updated_at: now,
        };

        let created = self.assets.insert_asset(&asset).await?;
        info!(asset_id = %created.id, asset_type = %created.asset_type, "Asset created");
        Ok(created)
    }

    /// 部分更新资产
    ///
    /// 未出现的字段保持原值；`null` 或空字符串清空 folderId / grafanaLink
    pub async fn update(&self, id: &str, req: UpdateAssetRequest) -> Result<Asset> {
        let folder_id = req.folder_id.map(normalize_ref);
        if let Some(Some(folder_id)) = &folder_id {
            self.require_folder(folder_id).await?;
        }

        let configuration = match req.configuration {
            None => None,
            Some(None) => Some(Value::Object(Map::new())),
            Some(Some(value)) => Some(require_object(value)?),
        };

        let patch = AssetPatch {
            tags: req.tags.map(|tags| normalize_tags(tags.unwrap_or_default())),
            grafana_link: req.grafana_link.map(normalize_ref),
            folder_id,
            configuration,
        };

        let updated = self
            .assets
            .update_asset(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("asset {}", id)))?;

        info!(asset_id = %id, "Asset updated");
        Ok(updated)
    }

    /// 整体替换抓取配置并刷新检查时间
    pub async fn replace_configuration(&self, id: &str, configuration: Value) -> Result<Asset> {
        let configuration = require_object(configuration)?;

        let updated = self
            .assets
            .replace_configuration(id, &configuration, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found(format!("asset {}", id)))?;

        info!(asset_id = %id, "Asset configuration replaced");
        Ok(updated)
    }

    /// 删除资产
    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.assets.delete_asset(id).await? {
            return Err(AppError::not_found(format!("asset {}", id)));
        }
        info!(asset_id = %id, "Asset deleted");
        Ok(())
    }

    async fn require_folder(&self, folder_id: &str) -> Result<()> {
        if self.folders.get_folder(folder_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "folderId references a folder that does not exist: {}",
                folder_id
            )));
        }
        Ok(())
    }
}

fn require_object(value: Value) -> Result<Value> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(AppError::validation("configuration must be a JSON object"))
    }
}
