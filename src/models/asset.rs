//! Asset domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Kind of monitored asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "asset_type", rename_all = "snake_case")]
pub enum AssetType {
    Server,
    Network,
    Application,
    Database,
    Kubernetes,
    #[serde(rename = "PostgreSQL", alias = "postgresql")]
    Postgresql,
    #[serde(rename = "MySQL", alias = "mysql")]
    Mysql,
    #[serde(rename = "MongoDB", alias = "mongodb")]
    Mongodb,
    #[serde(rename = "Ubuntu Server", alias = "ubuntu_server")]
    UbuntuServer,
    #[serde(rename = "Windows Server", alias = "windows_server")]
    WindowsServer,
    Docker,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Server => "Server",
            AssetType::Network => "Network",
            AssetType::Application => "Application",
            AssetType::Database => "Database",
            AssetType::Kubernetes => "Kubernetes",
            AssetType::Postgresql => "PostgreSQL",
            AssetType::Mysql => "MySQL",
            AssetType::Mongodb => "MongoDB",
            AssetType::UbuntuServer => "Ubuntu Server",
            AssetType::WindowsServer => "Windows Server",
            AssetType::Docker => "Docker",
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reachability status, written by health probes or explicit updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "asset_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Connected,
    Disconnected,
    Error,
    Pending,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Connected => "connected",
            AssetStatus::Disconnected => "disconnected",
            AssetStatus::Error => "error",
            AssetStatus::Pending => "pending",
        }
    }
}

/// Monitored asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub status: AssetStatus,
    pub last_checked: DateTime<Utc>,
    pub grafana_link: Option<String>,
    /// One Prometheus job definition, `{}` when nothing is configured yet
    pub configuration: Value,
    /// Kept sorted and de-duplicated
    pub tags: Vec<String>,
    pub folder_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Whether the asset carries a job definition worth aggregating
    pub fn has_configuration(&self) -> bool {
        self.configuration
            .as_object()
            .is_some_and(|obj| !obj.is_empty())
    }
}

/// Create asset request
///
/// `param1`/`param2` feed the scrape config generator; when `param1` is given
/// the generated job replaces any `configuration` sent alongside it.
#[derive(Debug, Clone, Default, Deserialize, validator::Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "name must be at most 255 characters"))]
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: Option<AssetType>,
    pub grafana_link: Option<String>,
    pub configuration: Option<Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub folder_id: Option<String>,
    pub param1: Option<String>,
    pub param2: Option<String>,
}

/// Partial asset update
///
/// Every field distinguishes "absent" (outer `None`, keep the stored value)
/// from "explicitly null" (`Some(None)`). For `folderId` and `grafanaLink` an
/// empty string is treated the same as `null` and clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetRequest {
    #[serde(default, deserialize_with = "explicit")]
    pub tags: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "explicit")]
    pub grafana_link: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit")]
    pub folder_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit")]
    pub configuration: Option<Option<Value>>,
}

/// Wholesale configuration replacement
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceConfigurationRequest {
    pub configuration: Value,
}

/// Asset list filters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetListQuery {
    #[serde(alias = "folder_id")]
    pub folder_id: Option<String>,
}

/// 字段出现即为 `Some`，包括显式的 `null`
fn explicit<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// 空白字符串视为未设置
pub fn normalize_ref(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 去除空白标签，排序并去重
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}
