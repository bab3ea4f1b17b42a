//! Full Prometheus configuration document

use crate::{config::PrometheusConfig, models::asset::Asset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header written above the generated file
const FILE_HEADER: &str = "# Generated by prometheus-lens. Manual edits are overwritten on the next reload.\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSection {
    pub scrape_interval: String,
    pub evaluation_interval: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertingSection {
    pub alertmanagers: Vec<AlertmanagerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertmanagerConfig {
    pub static_configs: Vec<AlertmanagerTargets>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertmanagerTargets {
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusDocument {
    pub global: GlobalSection,
    pub scrape_configs: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerting: Option<AlertingSection>,
}

/// Fixed sections around the job list
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDefaults {
    pub scrape_interval: String,
    pub evaluation_interval: String,
    pub alertmanager_target: String,
}

impl Default for DocumentDefaults {
    fn default() -> Self {
        Self {
            scrape_interval: "15s".to_string(),
            evaluation_interval: "15s".to_string(),
            alertmanager_target: "alertmanager:9093".to_string(),
        }
    }
}

impl From<&PrometheusConfig> for DocumentDefaults {
    fn from(config: &PrometheusConfig) -> Self {
        Self {
            scrape_interval: config.scrape_interval.clone(),
            evaluation_interval: config.evaluation_interval.clone(),
            alertmanager_target: config.alertmanager_target.clone(),
        }
    }
}

impl DocumentDefaults {
    fn global(&self) -> GlobalSection {
        GlobalSection {
            scrape_interval: self.scrape_interval.clone(),
            evaluation_interval: self.evaluation_interval.clone(),
        }
    }

    fn alerting(&self) -> AlertingSection {
        AlertingSection {
            alertmanagers: vec![AlertmanagerConfig {
                static_configs: vec![AlertmanagerTargets {
                    targets: vec![self.alertmanager_target.clone()],
                }],
            }],
        }
    }
}

/// Combine every configured asset's job into one document.
///
/// Jobs keep the order of `assets`; callers pass assets in the store's
/// stable (name) order.
pub fn aggregate(assets: &[Asset], defaults: &DocumentDefaults) -> PrometheusDocument {
    PrometheusDocument {
        global: defaults.global(),
        scrape_configs: assets
            .iter()
            .filter(|asset| asset.has_configuration())
            .map(|asset| asset.configuration.clone())
            .collect(),
        alerting: Some(defaults.alerting()),
    }
}

/// Single-job document shown by the generator preview
pub fn preview(job: Value, defaults: &DocumentDefaults) -> PrometheusDocument {
    PrometheusDocument {
        global: defaults.global(),
        scrape_configs: vec![job],
        alerting: None,
    }
}

impl PrometheusDocument {
    /// Render the on-disk file.
    ///
    /// The body is JSON, which Prometheus' YAML loader accepts as flow style.
    pub fn render(&self) -> serde_json::Result<String> {
        let body = serde_json::to_string_pretty(self)?;
        Ok(format!("{}{}\n", FILE_HEADER, body))
    }
}
