//! 数据模型模块
//! 资产、文件夹与 Prometheus 抓取配置

pub mod asset;
pub mod folder;
pub mod scrape;
