//! Typed view over stored Prometheus job definitions
//!
//! Known shapes (static targets, Kubernetes service discovery) are parsed into
//! structs; anything else is kept as a plain JSON object. Keys that the typed
//! structs do not name are carried in `extra` so a parsed job serializes back
//! with the same content.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single `scrape_configs` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScrapeConfig {
    Static(StaticJob),
    Kubernetes(KubernetesJob),
    Custom(Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticJob {
    pub job_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_path: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Vec<String>>,
    pub static_configs: Vec<StaticTargets>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relabel_configs: Vec<RelabelRule>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticTargets {
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubernetesJob {
    pub job_name: String,
    pub kubernetes_sd_configs: Vec<KubernetesSdConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relabel_configs: Vec<RelabelRule>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubernetesSdConfig {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelabelRule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl ScrapeConfig {
    /// Parse a stored configuration; `None` when it is not a JSON object
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn job_name(&self) -> Option<&str> {
        match self {
            ScrapeConfig::Static(job) => Some(&job.job_name),
            ScrapeConfig::Kubernetes(job) => Some(&job.job_name),
            ScrapeConfig::Custom(map) => map.get("job_name").and_then(Value::as_str),
        }
    }

    /// First target of the first `static_configs` group
    pub fn primary_target(&self) -> Option<&str> {
        match self {
            ScrapeConfig::Static(job) => job
                .static_configs
                .first()
                .and_then(|group| group.targets.first())
                .map(String::as_str),
            ScrapeConfig::Kubernetes(_) => None,
            ScrapeConfig::Custom(map) => map
                .get("static_configs")
                .and_then(Value::as_array)
                .and_then(|groups| groups.first())
                .and_then(|group| group.get("targets"))
                .and_then(Value::as_array)
                .and_then(|targets| targets.first())
                .and_then(Value::as_str),
        }
        .map(str::trim)
        .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_static_job_keeps_unknown_keys() {
        let value = json!({
            "job_name": "node",
            "scrape_interval": "30s",
            "static_configs": [{ "targets": ["10.0.0.5:9100"] }]
        });
        let parsed = ScrapeConfig::from_value(&value).unwrap();
        match &parsed {
            ScrapeConfig::Static(job) => {
                assert_eq!(job.extra.get("scrape_interval"), Some(&json!("30s")));
            }
            other => panic!("expected static job, got {:?}", other),
        }
        assert_eq!(parsed.to_value(), value);
        assert_eq!(parsed.primary_target(), Some("10.0.0.5:9100"));
    }

    #[test]
    fn test_parse_kubernetes_job() {
        let value = json!({
            "job_name": "k8s",
            "kubernetes_sd_configs": [{ "role": "pod", "api_server": "https://k8s:6443" }]
        });
        let parsed = ScrapeConfig::from_value(&value).unwrap();
        assert!(matches!(parsed, ScrapeConfig::Kubernetes(_)));
        assert_eq!(parsed.primary_target(), None);
        assert_eq!(parsed.job_name(), Some("k8s"));
    }

    #[test]
    fn test_custom_job_without_name_still_finds_target() {
        let value = json!({ "static_configs": [{ "targets": ["db:9187"] }] });
        let parsed = ScrapeConfig::from_value(&value).unwrap();
        assert!(matches!(parsed, ScrapeConfig::Custom(_)));
        assert_eq!(parsed.primary_target(), Some("db:9187"));
    }

    #[test]
    fn test_empty_static_configs_has_no_target() {
        let value = json!({ "job_name": "empty", "static_configs": [] });
        let parsed = ScrapeConfig::from_value(&value).unwrap();
        assert_eq!(parsed.primary_target(), None);
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(ScrapeConfig::from_value(&json!(["a"])).is_none());
        assert!(ScrapeConfig::from_value(&Value::Null).is_none());
    }
}
