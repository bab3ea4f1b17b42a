//! Scrape config generator
//!
//! Maps an asset type, a display name and two free-form parameters to a single
//! Prometheus job. Pure and deterministic.

use crate::models::{
    asset::AssetType,
    scrape::{
        KubernetesJob, KubernetesSdConfig, RelabelRule, ScrapeConfig, StaticJob, StaticTargets,
    },
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Map;
use std::collections::BTreeMap;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Address the SNMP job points at until an operator edits it
pub const SNMP_EXPORTER_PLACEHOLDER: &str = "snmp-exporter:9116";
pub const DEFAULT_SNMP_MODULE: &str = "if_mib";
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Generator input as sent by the wizard
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorInput {
    #[serde(rename = "type")]
    pub asset_type: Option<AssetType>,
    pub name: Option<String>,
    pub param1: Option<String>,
    pub param2: Option<String>,
}

/// Generator output
#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    /// Required input missing; nothing to emit yet
    Incomplete { message: String },
    Job {
        job: ScrapeConfig,
        /// Manual follow-ups the operator has to do after saving
        notes: Vec<String>,
    },
}

/// Job name: lowercase, whitespace runs collapsed to one underscore
pub fn job_name(name: &str) -> String {
    WHITESPACE
        .replace_all(name.trim(), "_")
        .to_lowercase()
}

/// Default exporter port for the types that have one
pub fn default_port(asset_type: AssetType) -> Option<u16> {
    match asset_type {
        AssetType::Server | AssetType::UbuntuServer => Some(9100),
        AssetType::WindowsServer => Some(9182),
        AssetType::Postgresql => Some(9187),
        AssetType::Mysql => Some(9104),
        AssetType::Mongodb => Some(9216),
        _ => None,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn generate(input: &GeneratorInput) -> Generated {
    let Some(asset_type) = input.asset_type else {
        return Generated::Incomplete {
            message: "type is required".to_string(),
        };
    };
    let Some(name) = non_empty(&input.name) else {
        return Generated::Incomplete {
            message: "name is required".to_string(),
        };
    };
    let Some(param1) = non_empty(&input.param1) else {
        return Generated::Incomplete {
            message: format!("param1 is required for {} assets", asset_type),
        };
    };
    let param2 = non_empty(&input.param2);
    let job_name = job_name(name);
    let mut notes = Vec::new();

    let job = match asset_type {
        AssetType::Server
        | AssetType::UbuntuServer
        | AssetType::WindowsServer
        | AssetType::Postgresql
        | AssetType::Mysql
        | AssetType::Mongodb => {
            let target = match (param2, default_port(asset_type)) {
                (Some(port), _) => format!("{}:{}", param1, port),
                (None, Some(port)) => format!("{}:{}", param1, port),
                (None, None) => param1.to_string(),
            };
            static_job(job_name, target, None)
        }
        AssetType::Application => {
            if let Some(hint) = param2 {
                notes.push(format!("param2 is not used for Application assets: {}", hint));
            }
            static_job(job_name, param1.to_string(), None)
        }
        AssetType::Docker => static_job(
            job_name,
            param1.to_string(),
            Some(param2.unwrap_or(DEFAULT_METRICS_PATH).to_string()),
        ),
        AssetType::Kubernetes => kubernetes_job(job_name, param1, param2),
        AssetType::Network => {
            notes.push(format!(
                "Replace {} in relabel_configs with the address of your SNMP exporter",
                SNMP_EXPORTER_PLACEHOLDER
            ));
            snmp_job(job_name, param1, param2.unwrap_or(DEFAULT_SNMP_MODULE))
        }
        AssetType::Database => {
            let target = match param2 {
                Some(port) => format!("{}:{}", param1, port),
                None => param1.to_string(),
            };
            static_job(job_name, target, None)
        }
    };

    Generated::Job { job, notes }
}

fn static_job(job_name: String, target: String, metrics_path: Option<String>) -> ScrapeConfig {
    ScrapeConfig::Static(StaticJob {
        job_name,
        metrics_path,
        params: BTreeMap::new(),
        static_configs: vec![StaticTargets {
            targets: vec![target],
            labels: BTreeMap::new(),
        }],
        relabel_configs: Vec::new(),
        extra: Map::new(),
    })
}

fn kubernetes_job(job_name: String, api_server: &str, token_file: Option<&str>) -> ScrapeConfig {
    let rule = |source: &[&str], action: &str| RelabelRule {
        source_labels: source.iter().map(|s| s.to_string()).collect(),
        action: Some(action.to_string()),
        ..RelabelRule::default()
    };

    ScrapeConfig::Kubernetes(KubernetesJob {
        job_name,
        kubernetes_sd_configs: vec![KubernetesSdConfig {
            role: "pod".to_string(),
            api_server: Some(api_server.to_string()),
            bearer_token_file: token_file.map(str::to_string),
        }],
        relabel_configs: vec![
            RelabelRule {
                regex: Some("true".to_string()),
                ..rule(&["__meta_kubernetes_pod_annotation_prometheus_io_scrape"], "keep")
            },
            RelabelRule {
                regex: Some("(.+)".to_string()),
                target_label: Some("__metrics_path__".to_string()),
                ..rule(&["__meta_kubernetes_pod_annotation_prometheus_io_path"], "replace")
            },
            RelabelRule {
                regex: Some(r"([^:]+)(?::\d+)?;(\d+)".to_string()),
                replacement: Some("$1:$2".to_string()),
                target_label: Some("__address__".to_string()),
                ..rule(
                    &["__address__", "__meta_kubernetes_pod_annotation_prometheus_io_port"],
                    "replace",
                )
            },
            RelabelRule {
                target_label: Some("kubernetes_namespace".to_string()),
                ..rule(&["__meta_kubernetes_namespace"], "replace")
            },
            RelabelRule {
                target_label: Some("kubernetes_pod_name".to_string()),
                ..rule(&["__meta_kubernetes_pod_name"], "replace")
            },
        ],
        extra: Map::new(),
    })
}

fn snmp_job(job_name: String, device: &str, module: &str) -> ScrapeConfig {
    let mut params = BTreeMap::new();
    params.insert("module".to_string(), vec![module.to_string()]);

    ScrapeConfig::Static(StaticJob {
        job_name,
        metrics_path: Some("/snmp".to_string()),
        params,
        static_configs: vec![StaticTargets {
            targets: vec![device.to_string()],
            labels: BTreeMap::new(),
        }],
        relabel_configs: vec![
            RelabelRule {
                source_labels: vec!["__address__".to_string()],
                target_label: Some("__param_target".to_string()),
                ..RelabelRule::default()
            },
            RelabelRule {
                source_labels: vec!["__param_target".to_string()],
                target_label: Some("instance".to_string()),
                ..RelabelRule::default()
            },
            RelabelRule {
                target_label: Some("__address__".to_string()),
                replacement: Some(SNMP_EXPORTER_PLACEHOLDER.to_string()),
                ..RelabelRule::default()
            },
        ],
        extra: Map::new(),
    })
}
