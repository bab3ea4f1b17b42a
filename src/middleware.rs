//! HTTP 中间件与应用状态
//! 请求追踪

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    repository::{AssetStore, FolderStore},
    services::{AssetService, FolderService, HealthProber, PrometheusService},
};

/// 应用状态
///
/// 所有服务共享同一个存储实现；Postgres 用于运行时，内存实现用于测试
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn AssetStore>,
    pub asset_service: Arc<AssetService>,
    pub folder_service: Arc<FolderService>,
    pub prometheus_service: Arc<PrometheusService>,
    pub prober: Arc<HealthProber>,
}

impl AppState {
    pub fn new<S>(config: AppConfig, store: Arc<S>) -> Self
    where
        S: AssetStore + FolderStore + 'static,
    {
        let assets: Arc<dyn AssetStore> = store.clone();
        let folders: Arc<dyn FolderStore> = store;

        Self {
            asset_service: Arc::new(AssetService::new(assets.clone(), folders.clone())),
            folder_service: Arc::new(FolderService::new(folders)),
            prometheus_service: Arc::new(PrometheusService::new(assets.clone(), &config.prometheus)),
            prober: Arc::new(HealthProber::new(
                assets.clone(),
                Duration::from_secs(config.probe.timeout_secs),
            )),
            store: assets,
            config,
        }
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // 指标标签只用静态字符串
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        let status_class = match status {
            200..=299 => "2xx",
            300..=399 => "3xx",
            400..=499 => "4xx",
            _ => "5xx",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_class)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
