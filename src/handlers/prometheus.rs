//! Prometheus 配置相关的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    prometheus::{self, Generated, GeneratorInput},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 生成抓取配置预览
///
/// 输入不完整时返回 `incomplete` 标记而不是错误
pub async fn generate_config(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GeneratorInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;

    let body = match prometheus::generate(&input) {
        Generated::Incomplete { message } => json!({
            "incomplete": true,
            "message": message
        }),
        Generated::Job { job, notes } => {
            let configuration = job.to_value();
            let preview = prometheus::preview(
                configuration.clone(),
                state.prometheus_service.defaults(),
            );
            json!({
                "incomplete": false,
                "jobName": job.job_name(),
                "configuration": configuration,
                "preview": preview,
                "notes": notes
            })
        }
    };

    Ok(Json(body))
}

/// 查看聚合后的完整配置
pub async fn aggregated_config(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let document = state.prometheus_service.build_document().await?;
    Ok(Json(document))
}

/// 写入配置文件并重载 Prometheus
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let outcome = state.prometheus_service.write_and_reload().await?;

    Ok(Json(json!({
        "message": "Prometheus configuration reloaded",
        "success": true,
        "configPath": outcome.config_path,
        "jobCount": outcome.job_count
    })))
}
