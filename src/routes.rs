//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::{handlers, middleware::AppState};

/// 请求体上限（字节）
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    let api_routes = Router::new()
        // 资产
        .route(
            "/api/v1/assets",
            get(handlers::asset::list_assets).post(handlers::asset::create_asset),
        )
        .route(
            "/api/v1/assets/{id}",
            get(handlers::asset::get_asset)
                .put(handlers::asset::update_asset)
                .delete(handlers::asset::delete_asset),
        )
        .route(
            "/api/v1/assets/{id}/configuration",
            put(handlers::asset::replace_configuration),
        )
        .route(
            "/api/v1/assets/{id}/health-check",
            post(handlers::asset::check_asset_health),
        )
        // 文件夹
        .route(
            "/api/v1/folders",
            get(handlers::folder::list_folders).post(handlers::folder::create_folder),
        )
        .route(
            "/api/v1/folders/{id}",
            get(handlers::folder::get_folder)
                .put(handlers::folder::update_folder)
                .delete(handlers::folder::delete_folder),
        )
        // Prometheus
        .route(
            "/api/v1/prometheus/generate",
            post(handlers::prometheus::generate_config),
        )
        .route(
            "/api/v1/prometheus/config",
            get(handlers::prometheus::aggregated_config),
        )
        .route("/api/v1/prometheus/reload", post(handlers::prometheus::reload));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
