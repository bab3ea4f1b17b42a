//! 资产健康探测
//!
//! 一次性探测资产抓取配置中的首个目标，并把结果写回资产状态

use crate::{
    error::{AppError, Result},
    models::{asset::AssetStatus, scrape::ScrapeConfig},
    repository::AssetStore,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 探测结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub asset_id: String,
    pub status: AssetStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub last_checked: DateTime<Utc>,
}

pub struct HealthProber {
    assets: Arc<dyn AssetStore>,
    client: reqwest::Client,
    timeout: Duration,
}

impl HealthProber {
    pub fn new(assets: Arc<dyn AssetStore>, timeout: Duration) -> Self {
        Self {
            assets,
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// 探测资产并更新其状态
    pub async fn check(&self, asset_id: &str) -> Result<ProbeReport> {
        let asset = self
            .assets
            .get_asset(asset_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("asset {}", asset_id)))?;

        let target = ScrapeConfig::from_value(&asset.configuration)
            .and_then(|job| job.primary_target().map(str::to_string));

        let Some(target) = target else {
            warn!(asset_id = %asset_id, "Asset has no scrape target");
            return self
                .record(
                    asset_id,
                    AssetStatus::Error,
                    "No scrape target configured: static_configs has no targets".to_string(),
                    None,
                )
                .await;
        };

        let url = metrics_url(&target);
        debug!(asset_id = %asset_id, url = %url, "Probing asset");

        let (status, message) =
            match tokio::time::timeout(self.timeout, self.client.get(&url).send()).await {
                Ok(Ok(response)) if response.status().is_success() => (
                    AssetStatus::Connected,
                    format!("Target responded with HTTP {}", response.status().as_u16()),
                ),
                Ok(Ok(response)) => (
                    AssetStatus::Disconnected,
                    format!("Target returned HTTP {}", response.status().as_u16()),
                ),
                Ok(Err(e)) => (AssetStatus::Error, format!("Request to {} failed: {}", url, e)),
                Err(_) => (
                    AssetStatus::Error,
                    format!(
                        "Request to {} timed out after {} ms",
                        url,
                        self.timeout.as_millis()
                    ),
                ),
            };

        self.record(asset_id, status, message, Some(url)).await
    }

    async fn record(
        &self,
        asset_id: &str,
        status: AssetStatus,
        message: String,
        url: Option<String>,
    ) -> Result<ProbeReport> {
        let asset = self
            .assets
            .set_status(asset_id, status, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found(format!("asset {}", asset_id)))?;

        metrics::counter!("asset_probe_total", "status" => status.as_str()).increment(1);
        info!(asset_id = %asset_id, status = status.as_str(), message = %message, "Health check finished");

        Ok(ProbeReport {
            asset_id: asset.id,
            status: asset.status,
            message,
            url,
            last_checked: asset.last_checked,
        })
    }
}

/// 目标地址补全为可请求的 URL：缺省协议补 `http://`，末尾补 `/metrics`
pub fn metrics_url(target: &str) -> String {
    let target = target.trim();
    let target = target.strip_suffix('/').unwrap_or(target);
    let mut url = if target.contains("://") {
        target.to_string()
    } else {
        format!("http://{}", target)
    };
    if !url.ends_with("/metrics") {
        url.push_str("/metrics");
    }
    url
}
