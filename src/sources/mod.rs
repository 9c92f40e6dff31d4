//! Loaders that turn a stored upload into text.
//!
//! The extension of the upload's key selects the loader: `pdf` files are
//! extracted directly, `json` files are URL manifests whose pages are
//! fetched and persisted as `content.html` before extraction.

mod manifest;
mod pdf;

pub use manifest::{combine_pages, parse_manifest};
pub use pdf::extract_pdf_text;

use crate::error::SourceError;
use crate::models::LoadedDocument;
use crate::models::storage_key::extension_of;
use crate::services::{ObjectStore, PageFetcher};

/// Services a loader may call.
#[derive(Clone, Copy)]
pub struct LoadContext<'a> {
    pub store: &'a dyn ObjectStore,
    pub fetcher: &'a dyn PageFetcher,
}

/// Kind of content behind an uploaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    Pdf,
    UrlManifest,
}

impl DocumentSource {
    /// Resolve the loader for a key; `None` when the extension has none.
    pub fn from_key(key: &str) -> Option<Self> {
        match extension_of(key)?.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentSource::Pdf),
            "json" => Some(DocumentSource::UrlManifest),
            _ => None,
        }
    }

    /// Load text out of the raw bytes stored at `key`.
    pub async fn load(
        &self,
        ctx: LoadContext<'_>,
        key: &str,
        body: &[u8],
    ) -> Result<Vec<LoadedDocument>, SourceError> {
        match self {
            DocumentSource::Pdf => pdf::load(key, body),
            DocumentSource::UrlManifest => manifest::load(ctx, key, body).await,
        }
    }
}
