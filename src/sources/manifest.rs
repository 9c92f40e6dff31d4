//! URL manifests: JSON lists of `{url}` entries produced for URL and
//! search uploads.

use tracing::{debug, info};

use super::LoadContext;
use crate::error::SourceError;
use crate::models::storage_key::{CONTENT_HTML, artifact_key, folder_of};
use crate::models::{LoadedDocument, ManifestEntry};
use crate::services::html_to_text;

const CONTENT_TYPE_HTML: &str = "text/html";

pub fn parse_manifest(body: &[u8]) -> Result<Vec<ManifestEntry>, SourceError> {
    Ok(serde_json::from_slice(body)?)
}

/// Concatenate fetched pages, each preceded by a `SOURCE: {url}` line.
pub fn combine_pages(pages: &[(String, String)]) -> String {
    pages
        .iter()
        .map(|(url, html)| format!("SOURCE: {}\n{}", url, html))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) async fn load(
    ctx: LoadContext<'_>,
    key: &str,
    body: &[u8],
) -> Result<Vec<LoadedDocument>, SourceError> {
    let entries = parse_manifest(body)?;

    let mut pages = Vec::with_capacity(entries.len());
    for entry in entries {
        let html = ctx.fetcher.fetch(&entry.url).await;
        pages.push((entry.url, html));
    }

    let combined = combine_pages(&pages);
    let content_key = match folder_of(key) {
        Some(folder) => artifact_key(folder, CONTENT_HTML),
        None => CONTENT_HTML.to_string(),
    };
    ctx.store
        .put(&content_key, combined.into_bytes(), CONTENT_TYPE_HTML)
        .await?;
    info!(key = %content_key, pages = pages.len(), "stored combined page content");

    let documents: Vec<LoadedDocument> = pages
        .into_iter()
        .filter_map(|(url, html)| {
            let text = html_to_text(&html);
            if text.trim().is_empty() {
                debug!(url, "page has no text");
                None
            } else {
                Some(LoadedDocument::new(text, url))
            }
        })
        .collect();

    if documents.is_empty() {
        return Err(SourceError::NoContent);
    }
    Ok(documents)
}
