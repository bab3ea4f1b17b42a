//! 资产服务测试（内存存储）

use prometheus_lens::{
    error::AppError,
    models::{
        asset::*,
        folder::CreateFolderRequest,
    },
    repository::MemoryStore,
    services::{AssetService, FolderService},
};
use serde_json::json;
use std::sync::Arc;

fn services() -> (AssetService, FolderService) {
    let store = Arc::new(MemoryStore::new());
    (
        AssetService::new(store.clone(), store.clone()),
        FolderService::new(store),
    )
}

fn create_request(name: &str, asset_type: AssetType) -> CreateAssetRequest {
    CreateAssetRequest {
        name: name.to_string(),
        asset_type: Some(asset_type),
        ..Default::default()
    }
}

fn update_request(body: serde_json::Value) -> UpdateAssetRequest {
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn test_create_asset_generates_configuration() {
    let (assets, _) = services();

    let before = chrono::Utc::now();
    let asset = assets
        .create(CreateAssetRequest {
            param1: Some("10.0.0.5".to_string()),
            tags: vec!["prod".to_string(), " linux ".to_string(), "prod".to_string()],
            ..create_request("Web Server 01", AssetType::Server)
        })
        .await
        .unwrap();
    let after = chrono::Utc::now();

    assert!(asset.id.starts_with("asset-"));
    assert_eq!(asset.status, AssetStatus::Pending);
    assert!(before <= asset.last_checked && asset.last_checked <= after);
    assert_eq!(asset.tags, vec!["linux", "prod"]);
    assert_eq!(
        asset.configuration,
        json!({
            "job_name": "web_server_01",
            "static_configs": [{ "targets": ["10.0.0.5:9100"] }]
        })
    );
}

#[tokio::test]
async fn test_create_asset_without_params_has_empty_configuration() {
    let (assets, _) = services();

    let asset = assets
        .create(create_request("db-01", AssetType::Postgresql))
        .await
        .unwrap();

    assert_eq!(asset.configuration, json!({}));
    assert!(!asset.has_configuration());
    assert_eq!(asset.grafana_link, None);
    assert_eq!(asset.folder_id, None);
}

#[tokio::test]
async fn test_create_asset_validation() {
    let (assets, _) = services();

    let err = assets
        .create(CreateAssetRequest {
            name: "no-type".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg.contains("type")));

    let err = assets
        .create(create_request("  ", AssetType::Server))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = assets
        .create(CreateAssetRequest {
            configuration: Some(json!(["not", "an", "object"])),
            ..create_request("app", AssetType::Application)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = assets
        .create(CreateAssetRequest {
            folder_id: Some("folder-missing".to_string()),
            ..create_request("app", AssetType::Application)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg.contains("folder")));

    assert!(assets.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_assets_is_ordered_and_filterable() {
    let (assets, folders) = services();
    let folder = folders
        .create(CreateFolderRequest {
            name: "Edge".to_string(),
            parent_id: None,
        })
        .await
        .unwrap();

    assets.create(create_request("zeta", AssetType::Docker)).await.unwrap();
    assets
        .create(CreateAssetRequest {
            folder_id: Some(folder.id.clone()),
            ..create_request("alpha", AssetType::Network)
        })
        .await
        .unwrap();
    assets.create(create_request("mid", AssetType::Server)).await.unwrap();

    let names: Vec<String> = assets
        .list(None)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);

    let in_folder = assets.list(Some(&folder.id)).await.unwrap();
    assert_eq!(in_folder.len(), 1);
    assert_eq!(in_folder[0].name, "alpha");
}

#[tokio::test]
async fn test_update_asset_absent_fields_are_kept() {
    let (assets, folders) = services();
    let folder = folders
        .create(CreateFolderRequest {
            name: "Core".to_string(),
            parent_id: None,
        })
        .await
        .unwrap();
    let asset = assets
        .create(CreateAssetRequest {
            grafana_link: Some("https://grafana/d/abc".to_string()),
            folder_id: Some(folder.id.clone()),
            tags: vec!["a".to_string()],
            ..create_request("router", AssetType::Network)
        })
        .await
        .unwrap();

    let updated = assets
        .update(&asset.id, update_request(json!({ "tags": ["b", "a"] })))
        .await
        .unwrap();

    assert_eq!(updated.tags, vec!["a", "b"]);
    assert_eq!(updated.grafana_link.as_deref(), Some("https://grafana/d/abc"));
    assert_eq!(updated.folder_id.as_deref(), Some(folder.id.as_str()));
    assert_eq!(updated.configuration, asset.configuration);
}

#[tokio::test]
async fn test_update_asset_null_and_empty_clear_references() {
    let (assets, folders) = services();
    let folder = folders
        .create(CreateFolderRequest {
            name: "Core".to_string(),
            parent_id: None,
        })
        .await
        .unwrap();
    let asset = assets
        .create(CreateAssetRequest {
            grafana_link: Some("https://grafana/d/abc".to_string()),
            folder_id: Some(folder.id.clone()),
            configuration: Some(json!({ "job_name": "x", "static_configs": [] })),
            ..create_request("router", AssetType::Network)
        })
        .await
        .unwrap();

    let updated = assets
        .update(
            &asset.id,
            update_request(json!({
                "folderId": null,
                "grafanaLink": "",
                "configuration": null
            })),
        )
        .await
        .unwrap();

    assert_eq!(updated.folder_id, None);
    assert_eq!(updated.grafana_link, None);
    assert_eq!(updated.configuration, json!({}));
}

#[tokio::test]
async fn test_update_asset_rejects_unknown_folder() {
    let (assets, _) = services();
    let asset = assets.create(create_request("box", AssetType::Server)).await.unwrap();

    let err = assets
        .update(&asset.id, update_request(json!({ "folderId": "folder-missing" })))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = assets
        .update("asset-missing", update_request(json!({ "tags": [] })))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_replace_configuration_refreshes_last_checked() {
    let (assets, _) = services();
    let asset = assets.create(create_request("svc", AssetType::Application)).await.unwrap();

    let job = json!({
        "job_name": "svc",
        "static_configs": [{ "targets": ["svc:8080"] }]
    });
    let updated = assets.replace_configuration(&asset.id, job.clone()).await.unwrap();

    assert_eq!(updated.configuration, job);
    assert!(updated.last_checked >= asset.last_checked);

    let err = assets
        .replace_configuration(&asset.id, json!("text"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = assets
        .replace_configuration("asset-missing", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_asset() {
    let (assets, _) = services();
    let asset = assets.create(create_request("tmp", AssetType::Docker)).await.unwrap();

    assets.delete(&asset.id).await.unwrap();

    assert!(matches!(assets.get(&asset.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(assets.delete(&asset.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_configuration_update_keeps_identity_fields() {
    let (assets, _) = services();
    let asset = assets
        .create(CreateAssetRequest {
            tags: vec!["k8s".to_string()],
            ..create_request("cluster", AssetType::Kubernetes)
        })
        .await
        .unwrap();

    let via_replace = assets
        .replace_configuration(&asset.id, json!({ "job_name": "cluster", "kubernetes_sd_configs": [] }))
        .await
        .unwrap();
    let via_update = assets
        .update(&asset.id, update_request(json!({ "configuration": { "job_name": "other" } })))
        .await
        .unwrap();

    for updated in [via_replace, via_update] {
        assert_eq!(updated.id, asset.id);
        assert_eq!(updated.name, asset.name);
        assert_eq!(updated.asset_type, asset.asset_type);
        assert_eq!(updated.tags, asset.tags);
    }
}

#[tokio::test]
async fn test_folder_removal_keeps_generated_asset() {
    let (assets, folders) = services();

    let prod = folders
        .create(CreateFolderRequest {
            name: "Prod".to_string(),
            parent_id: None,
        })
        .await
        .unwrap();

    let started = chrono::Utc::now();
    let asset = assets
        .create(CreateAssetRequest {
            folder_id: Some(prod.id.clone()),
            param1: Some("10.0.0.9".to_string()),
            ..create_request("prod-node", AssetType::Server)
        })
        .await
        .unwrap();
    assert!(asset.last_checked >= started && asset.last_checked <= chrono::Utc::now());
    assert_eq!(
        asset.configuration["static_configs"][0]["targets"][0],
        "10.0.0.9:9100"
    );

    folders.delete(&prod.id).await.unwrap();

    let fetched = assets.get(&asset.id).await.unwrap();
    assert_eq!(fetched.folder_id, None);
    assert_eq!(fetched.configuration, asset.configuration);
    assert!(assets.list(Some(&prod.id)).await.unwrap().is_empty());
}
