//! 文件夹管理的 HTTP 处理器

use crate::{error::AppError, middleware::AppState, models::folder::*};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 列出文件夹
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let folders = state.folder_service.list().await?;

    Ok(Json(json!({
        "folders": folders,
        "count": folders.len()
    })))
}

/// 创建文件夹
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateFolderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let folder = state.folder_service.create(req).await?;

    Ok(Json(json!({
        "message": "Folder created",
        "folder": folder
    })))
}

/// 获取文件夹详情
pub async fn get_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let folder = state.folder_service.get(&id).await?;
    Ok(Json(folder))
}

/// 更新文件夹
pub async fn update_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateFolderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let folder = state.folder_service.update(&id, req).await?;

    Ok(Json(json!({
        "message": "Folder updated",
        "folder": folder
    })))
}

/// 删除文件夹
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deletion = state.folder_service.delete(&id).await?;

    Ok(Json(json!({
        "message": "Folder deleted",
        "detachedAssets": deletion.detached_assets,
        "detachedFolders": deletion.detached_folders
    })))
}
