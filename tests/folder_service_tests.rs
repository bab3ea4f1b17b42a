//! 文件夹服务测试（内存存储）

use prometheus_lens::{
    error::AppError,
    models::{asset::CreateAssetRequest, asset::AssetType, folder::*},
    repository::{FolderStore, MemoryStore},
    services::{AssetService, FolderService},
};
use std::sync::Arc;

fn services() -> (FolderService, AssetService) {
    let store = Arc::new(MemoryStore::new());
    (
        FolderService::new(store.clone()),
        AssetService::new(store.clone(), store),
    )
}

async fn folder(service: &FolderService, name: &str, parent_id: Option<&str>) -> AssetFolder {
    service
        .create(CreateFolderRequest {
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
        })
        .await
        .unwrap()
}

fn move_to(parent_id: Option<&str>) -> UpdateFolderRequest {
    UpdateFolderRequest {
        name: None,
        parent_id: Some(parent_id.map(str::to_string)),
    }
}

#[tokio::test]
async fn test_create_and_list_folders() {
    let (folders, _) = services();

    let root = folder(&folders, "  Production ", None).await;
    let child = folder(&folders, "Databases", Some(&root.id)).await;

    assert!(root.id.starts_with("folder-"));
    assert_eq!(root.name, "Production");
    assert_eq!(root.parent_id, None);
    assert_eq!(child.parent_id.as_deref(), Some(root.id.as_str()));

    let listed = folders.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(folders.get(&child.id).await.unwrap(), child);
}

#[tokio::test]
async fn test_create_folder_rejects_blank_name_and_missing_parent() {
    let (folders, _) = services();

    let err = folders
        .create(CreateFolderRequest {
            name: "   ".to_string(),
            parent_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = folders
        .create(CreateFolderRequest {
            name: "Orphan".to_string(),
            parent_id: Some("folder-missing".to_string()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg.contains("does not exist")));

    assert!(folders.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_folder_cannot_be_its_own_parent() {
    let (folders, _) = services();
    let a = folder(&folders, "A", None).await;

    let err = folders.update(&a.id, move_to(Some(&a.id))).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg.contains("own parent")));
}

#[tokio::test]
async fn test_moving_under_descendant_is_rejected() {
    let (folders, _) = services();
    let a = folder(&folders, "A", None).await;
    let b = folder(&folders, "B", Some(&a.id)).await;
    let c = folder(&folders, "C", Some(&b.id)).await;

    let err = folders.update(&a.id, move_to(Some(&c.id))).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg.contains("circular dependency")));

    // 原有结构不变
    assert_eq!(folders.get(&a.id).await.unwrap().parent_id, None);
}

#[tokio::test]
async fn test_store_rejects_cycle_on_write() {
    let store = Arc::new(MemoryStore::new());
    let folders = FolderService::new(store.clone());
    let a = folder(&folders, "A", None).await;
    let b = folder(&folders, "B", None).await;

    // 两次移动各自通过了服务层检查，后写入的那次必须被存储层拒绝
    store.update_folder(&a.id, "A", Some(&b.id)).await.unwrap();
    let err = store
        .update_folder(&b.id, "B", Some(&a.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg.contains("circular dependency")));
    assert_eq!(store.get_folder(&b.id).await.unwrap().unwrap().parent_id, None);
}

#[tokio::test]
async fn test_concurrent_cross_moves_leave_a_tree() {
    let store = Arc::new(MemoryStore::new());
    let folders = Arc::new(FolderService::new(store.clone()));
    let a = folder(&folders, "A", None).await;
    let b = folder(&folders, "B", None).await;

    let (first, second) = tokio::join!(
        folders.update(&a.id, move_to(Some(&b.id))),
        folders.update(&b.id, move_to(Some(&a.id))),
    );
    assert_eq!(
        [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
        1
    );

    let a = folders.get(&a.id).await.unwrap();
    let b = folders.get(&b.id).await.unwrap();
    assert!(a.parent_id.is_none() || b.parent_id.is_none());
}

#[tokio::test]
async fn test_update_folder_moves_and_renames() {
    let (folders, _) = services();
    let a = folder(&folders, "A", None).await;
    let b = folder(&folders, "B", None).await;

    let moved = folders.update(&b.id, move_to(Some(&a.id))).await.unwrap();
    assert_eq!(moved.parent_id.as_deref(), Some(a.id.as_str()));
    assert_eq!(moved.name, "B");

    // 只改名时保留父级
    let renamed = folders
        .update(
            &b.id,
            UpdateFolderRequest {
                name: Some("Renamed".to_string()),
                parent_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Renamed");
    assert_eq!(renamed.parent_id.as_deref(), Some(a.id.as_str()));

    let root = folders.update(&b.id, move_to(None)).await.unwrap();
    assert_eq!(root.parent_id, None);
}

#[tokio::test]
async fn test_update_folder_rejects_empty_parent_and_name() {
    let (folders, _) = services();
    let a = folder(&folders, "A", None).await;

    let err = folders.update(&a.id, move_to(Some(""))).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = folders
        .update(
            &a.id,
            UpdateFolderRequest {
                name: Some(" ".to_string()),
                parent_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = folders.update(&a.id, move_to(Some("folder-missing"))).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg.contains("invalid parent chain")));
}

#[tokio::test]
async fn test_update_missing_folder_is_not_found() {
    let (folders, _) = services();
    let err = folders.update("folder-missing", move_to(None)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_folder_detaches_assets_and_children() {
    let (folders, assets) = services();
    let parent = folder(&folders, "Parent", None).await;
    let child = folder(&folders, "Child", Some(&parent.id)).await;

    let asset = assets
        .create(CreateAssetRequest {
            name: "web-01".to_string(),
            asset_type: Some(AssetType::Server),
            folder_id: Some(parent.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();

    let deletion = folders.delete(&parent.id).await.unwrap();
    assert_eq!(
        deletion,
        FolderDeletion {
            detached_assets: 1,
            detached_folders: 1,
        }
    );

    assert!(matches!(folders.get(&parent.id).await, Err(AppError::NotFound(_))));
    assert_eq!(folders.get(&child.id).await.unwrap().parent_id, None);
    assert_eq!(assets.get(&asset.id).await.unwrap().folder_id, None);
}

#[tokio::test]
async fn test_delete_missing_folder_is_not_found() {
    let (folders, _) = services();
    let err = folders.delete("folder-missing").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
