//! Prometheus Lens 库
//! 资产清单、抓取配置生成与 Prometheus 配置管理

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod prometheus;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
