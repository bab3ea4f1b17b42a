//! Prometheus 配置生成与聚合

pub mod document;
pub mod generator;

pub use document::{aggregate, preview, DocumentDefaults, PrometheusDocument};
pub use generator::{generate, job_name, Generated, GeneratorInput};
