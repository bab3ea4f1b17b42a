//! 资产管理的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::asset::*,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 列出资产
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssetListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let folder_id = normalize_ref(query.folder_id);
    let assets = state.asset_service.list(folder_id.as_deref()).await?;

    Ok(Json(json!({
        "assets": assets,
        "count": assets.len()
    })))
}

/// 创建资产
pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateAssetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let asset = state.asset_service.create(req).await?;

    Ok(Json(json!({
        "message": "Asset created",
        "asset": asset
    })))
}

/// 获取资产详情
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let asset = state.asset_service.get(&id).await?;
    Ok(Json(asset))
}

/// 部分更新资产
pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateAssetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let asset = state.asset_service.update(&id, req).await?;

    Ok(Json(json!({
        "message": "Asset updated",
        "asset": asset
    })))
}

/// 替换资产抓取配置
pub async fn replace_configuration(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ReplaceConfigurationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let asset = state
        .asset_service
        .replace_configuration(&id, req.configuration)
        .await?;

    Ok(Json(json!({
        "message": "Configuration updated",
        "asset": asset
    })))
}

/// 删除资产
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.asset_service.delete(&id).await?;

    Ok(Json(json!({
        "message": "Asset deleted"
    })))
}

/// 触发一次健康探测
pub async fn check_asset_health(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let report = state.prober.check(&id).await?;
    Ok(Json(report))
}
