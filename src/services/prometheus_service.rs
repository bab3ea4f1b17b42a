//! Prometheus 配置聚合与重载服务

use crate::{
    config::PrometheusConfig,
    error::{AppError, Result},
    prometheus::{aggregate, DocumentDefaults, PrometheusDocument},
    repository::AssetStore,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// 重载结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadOutcome {
    pub config_path: String,
    pub job_count: usize,
}

pub struct PrometheusService {
    assets: Arc<dyn AssetStore>,
    client: reqwest::Client,
    defaults: DocumentDefaults,
    config_path: PathBuf,
    reload_url: String,
    reload_timeout: Duration,
}

impl PrometheusService {
    pub fn new(assets: Arc<dyn AssetStore>, config: &PrometheusConfig) -> Self {
        Self {
            assets,
            client: reqwest::Client::new(),
            defaults: DocumentDefaults::from(config),
            config_path: PathBuf::from(&config.config_path),
            reload_url: format!("{}/-/reload", config.base_url.trim_end_matches('/')),
            reload_timeout: Duration::from_secs(config.reload_timeout_secs),
        }
    }

    pub fn defaults(&self) -> &DocumentDefaults {
        &self.defaults
    }

    /// 由当前全部资产构建聚合文档
    pub async fn build_document(&self) -> Result<PrometheusDocument> {
        let assets = self.assets.list_assets(None).await?;
        Ok(aggregate(&assets, &self.defaults))
    }

    /// 写入配置文件并通知 Prometheus 重载
    ///
    /// 文件写入成功而重载失败时不回滚文件，错误信息注明文件已写入
    pub async fn write_and_reload(&self) -> Result<ReloadOutcome> {
        let document = self.build_document().await?;
        let rendered = document
            .render()
            .map_err(|e| AppError::Internal(format!("failed to serialize configuration: {}", e)))?;

        write_atomically(&self.config_path, &rendered).await.map_err(|e| {
            error!(path = %self.config_path.display(), error = %e, "Failed to write Prometheus configuration");
            AppError::ConfigWrite(format!("{}: {}", self.config_path.display(), e))
        })?;

        info!(
            path = %self.config_path.display(),
            jobs = document.scrape_configs.len(),
            "Prometheus configuration written"
        );

        self.reload().await.map_err(|e| {
            error!(error = %e, "Prometheus reload failed after configuration was written");
            match e {
                AppError::Timeout(msg) => AppError::timeout(format!(
                    "configuration written to {} but {}",
                    self.config_path.display(),
                    msg
                )),
                other => AppError::Prometheus(format!(
                    "configuration written to {} but reload failed: {}",
                    self.config_path.display(),
                    other.user_message()
                )),
            }
        })?;

        Ok(ReloadOutcome {
            config_path: self.config_path.display().to_string(),
            job_count: document.scrape_configs.len(),
        })
    }

    /// 发送 `POST /-/reload`
    async fn reload(&self) -> Result<()> {
        let response = self
            .client
            .post(&self.reload_url)
            .timeout(self.reload_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::timeout(format!(
                        "reload request to {} timed out after {}s",
                        self.reload_url,
                        self.reload_timeout.as_secs()
                    ))
                } else {
                    AppError::Prometheus(format!("reload request to {} failed: {}", self.reload_url, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Prometheus(format!(
                "reload returned HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        info!(url = %self.reload_url, "Prometheus reloaded");
        Ok(())
    }
}

/// 先写临时文件再重命名，读者只会看到完整的旧文件或新文件
async fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("yml.tmp");
    tokio::fs::write(&tmp, contents).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}
