//! HTTP 处理器模块

pub mod asset;
pub mod folder;
pub mod health;
pub mod prometheus;
