//! Issues pre-signed upload URLs.
//!
//! The `file_name` query parameter is either a PDF name, a web page URL, a
//! `search:` query or a bare manifest name. URL and search inputs are
//! turned into a manifest of page URLs that the client uploads as JSON.

use aws_lambda_events::event::apigw::ApiGatewayProxyResponse;
use std::time::Duration;
use tracing::{debug, info};

use super::{UploadDeps, require_user};
use crate::error::{HandlerError, StorageError};
use crate::models::storage_key::document_folder;
use crate::models::{
    ApiGatewayEvent, ManifestEntry, UploadTarget, UploadUrlResponse, extension_for,
    json_response, normalize_name,
};
use crate::services::{ObjectStore, folder_in_use};
use crate::utils::short_suffix;

const COLLISION_SUFFIX_LEN: usize = 4;

fn key_for(user_id: &str, name: &str, extension: &str) -> String {
    format!(
        "{}/{}.{}",
        document_folder(user_id, name),
        name,
        extension
    )
}

/// Storage key `{user}/{name}/{name}.{ext}` for a new upload. When the
/// folder already holds objects of any document, the name gets a random
/// `-XXXX` suffix so every document owns its folder.
pub async fn create_key(
    store: &dyn ObjectStore,
    user_id: &str,
    file_name: &str,
    content_type: &str,
) -> Result<String, StorageError> {
    let extension = extension_for(content_type);
    let mut name = normalize_name(file_name, content_type);

    if folder_in_use(store, &document_folder(user_id, &name)).await? {
        name = format!("{}-{}", name, short_suffix(COLLISION_SUFFIX_LEN));
        debug!(%name, "key collision, renamed upload");
    }

    Ok(key_for(user_id, &name, extension))
}

/// Manifest content for URL and search inputs; empty otherwise.
async fn manifest_content(deps: &UploadDeps, target: &UploadTarget) -> Result<String, HandlerError> {
    let entries = match target {
        UploadTarget::Url { url, .. } => vec![ManifestEntry::new(url.clone())],
        UploadTarget::Search { query } => deps
            .search
            .search(query, deps.search_results)
            .await?
            .into_iter()
            .map(ManifestEntry::new)
            .collect(),
        UploadTarget::Pdf { .. } | UploadTarget::Manifest { .. } => return Ok(String::new()),
    };
    Ok(serde_json::to_string(&entries)?)
}

pub async fn handle(
    deps: &UploadDeps,
    event: ApiGatewayEvent,
) -> Result<ApiGatewayProxyResponse, HandlerError> {
    debug!(?event, "upload url request");
    let user_id = require_user(&event)?;
    let file_name_full = event
        .query_parameter("file_name")
        .ok_or_else(|| HandlerError::missing("query parameter file_name"))?;

    let target = UploadTarget::classify(file_name_full);
    let file_name = target.logical_name();
    let content_type = target.content_type();
    info!(user_id, file_name_full, %file_name, content_type, "issuing upload url");

    let content = manifest_content(deps, &target).await?;
    let key = create_key(deps.store.as_ref(), user_id, &file_name, content_type).await?;

    let presigned_url = deps
        .store
        .presign_put(
            &key,
            content_type,
            Duration::from_secs(deps.presign_expiry_secs),
        )
        .await?;
    info!(%key, "pre-signed upload url");

    Ok(json_response(&UploadUrlResponse {
        presignedurl: presigned_url,
        content_type: content_type.to_string(),
        content,
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::CONTENT_TYPE_PDF;
    use crate::models::storage_key::folder_of;
    use crate::services::{MemoryObjectStore, WebSearch};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct CannedSearch;

    #[async_trait]
    impl WebSearch for CannedSearch {
        async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, FetchError> {
            Ok((0..limit)
                .map(|i| format!("https://example.com/{}/{}", query.replace(' ', "-"), i))
                .collect())
        }
    }

    fn deps(store: Arc<MemoryObjectStore>) -> UploadDeps {
        UploadDeps {
            store,
            search: Arc::new(CannedSearch),
            presign_expiry_secs: 300,
            search_results: 5,
        }
    }

    async fn request(deps: &UploadDeps, file_name: &str) -> UploadUrlResponse {
        let event = ApiGatewayEvent::for_user("u1").with_query_parameter("file_name", file_name);
        let response = handle(deps, event).await.unwrap();
        assert_eq!(response.status_code, 200);
        serde_json::from_slice(response.body.as_deref().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_pdf_upload() {
        let store = Arc::new(MemoryObjectStore::new("bucket"));
        let body = request(&deps(store), "report.pdf").await;

        assert_eq!(body.content_type, CONTENT_TYPE_PDF);
        assert_eq!(body.content, "");
        assert!(body.presignedurl.starts_with("memory://bucket/u1/report/report.pdf?"));
        assert!(body.presignedurl.ends_with("expires=300"));
    }

    #[tokio::test]
    async fn test_pdf_name_with_slash_stays_one_segment() {
        let store = Arc::new(MemoryObjectStore::new("bucket"));
        let body = request(&deps(store), "docs/report.pdf").await;

        assert!(body.presignedurl.starts_with("memory://bucket/u1/docs_report/docs_report.pdf?"));
    }

    #[tokio::test]
    async fn test_url_upload() {
        let store = Arc::new(MemoryObjectStore::new("bucket"));
        let body = request(&deps(store), "https://docs.rs/tokio").await;

        assert_eq!(body.content_type, "application/json");
        assert_eq!(body.content, r#"[{"url":"https://docs.rs/tokio"}]"#);
        assert!(body.presignedurl.contains("/u1/docs_rs/docs_rs.json?"));
    }

    #[tokio::test]
    async fn test_search_upload() {
        let store = Arc::new(MemoryObjectStore::new("bucket"));
        let body = request(&deps(store), "SEARCH:rust async").await;

        let entries: Vec<ManifestEntry> = serde_json::from_str(&body.content).unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].url, "https://example.com/rust-async/0");
        assert!(body.presignedurl.contains("/u1/S_rust_async/S_rust_async.json?"));
    }

    #[tokio::test]
    async fn test_colliding_key_is_renamed() {
        let store = MemoryObjectStore::new("bucket");
        let fresh = create_key(&store, "u1", "report", CONTENT_TYPE_PDF).await.unwrap();
        assert_eq!(fresh, "u1/report/report.pdf");

        store.insert(fresh.clone(), b"%PDF".to_vec());
        let renamed = create_key(&store, "u1", "report", CONTENT_TYPE_PDF).await.unwrap();
        assert_ne!(renamed, fresh);

        let name = renamed
            .strip_prefix("u1/report-")
            .and_then(|rest| rest.split_once('/'))
            .map(|(suffix, _)| suffix)
            .unwrap();
        assert_eq!(name.chars().count(), 4);
        assert_eq!(renamed, format!("u1/report-{name}/report-{name}.pdf"));
    }

    #[tokio::test]
    async fn test_same_name_other_type_gets_own_folder() {
        let store = MemoryObjectStore::new("bucket");
        store.insert("u1/report/report.pdf", b"%PDF".to_vec());

        let manifest = create_key(&store, "u1", "report", "application/json").await.unwrap();
        assert!(manifest.starts_with("u1/report-"));
        assert!(manifest.ends_with(".json"));
        assert_ne!(folder_of(&manifest), Some("u1/report"));

        store.insert("u1/docs_rs/docs_rs.json", b"[]".to_vec());
        let pdf = create_key(&store, "u1", "docs_rs", CONTENT_TYPE_PDF).await.unwrap();
        assert_ne!(folder_of(&pdf), Some("u1/docs_rs"));
    }

    #[tokio::test]
    async fn test_prefix_sharing_name_is_not_a_collision() {
        let store = MemoryObjectStore::new("bucket");
        store.insert("u1/report-2024/report-2024.pdf", b"%PDF".to_vec());

        let key = create_key(&store, "u1", "report", CONTENT_TYPE_PDF).await.unwrap();
        assert_eq!(key, "u1/report/report.pdf");
    }

    #[tokio::test]
    async fn test_manifest_name_is_truncated() {
        let store = MemoryObjectStore::new("bucket");
        let key = create_key(&store, "u1", "my very long manifest name", "application/json")
            .await
            .unwrap();
        assert_eq!(key, "u1/my_very_long_manifes/my_very_long_manifes.json");
    }

    #[tokio::test]
    async fn test_missing_file_name() {
        let store = Arc::new(MemoryObjectStore::new("bucket"));
        let result = handle(&deps(store), ApiGatewayEvent::for_user("u1")).await;
        assert!(matches!(result, Err(HandlerError::BadRequest(_))));
    }
}
