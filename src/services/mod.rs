//! 业务服务层

pub mod asset_service;
pub mod folder_service;
pub mod probe_service;
pub mod prometheus_service;

pub use asset_service::AssetService;
pub use folder_service::FolderService;
pub use probe_service::{HealthProber, ProbeReport};
pub use prometheus_service::{PrometheusService, ReloadOutcome};
