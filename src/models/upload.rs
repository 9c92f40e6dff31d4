//! Classification of the `file_name` parameter of the upload URL request.

use serde::Serialize;
use url::Url;

pub const CONTENT_TYPE_PDF: &str = "application/pdf";
pub const CONTENT_TYPE_JSON: &str = "application/json";

const SEARCH_PREFIX: &str = "search:";
const PDF_SUFFIX: &str = ".pdf";
const MANIFEST_NAME_LIMIT: usize = 20;

/// What the client asked to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// A page to fetch; the manifest holds the single URL.
    Url { url: String, host: String },
    /// A web search whose result URLs become the manifest.
    Search { query: String },
    /// A PDF the client uploads directly.
    Pdf { name: String },
    /// A manifest the client writes itself.
    Manifest { name: String },
}

impl UploadTarget {
    /// Classify the raw `file_name` parameter.
    pub fn classify(raw: &str) -> Self {
        let raw = raw.trim();

        let host = Url::parse(raw)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string));
        if let Some(host) = host {
            return UploadTarget::Url {
                url: raw.to_string(),
                host,
            };
        }

        if raw
            .get(..SEARCH_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SEARCH_PREFIX))
        {
            return UploadTarget::Search {
                query: raw[SEARCH_PREFIX.len()..].trim().to_string(),
            };
        }

        if let Some(stem) = strip_pdf_suffix(raw) {
            return UploadTarget::Pdf {
                name: stem.to_string(),
            };
        }

        UploadTarget::Manifest {
            name: raw.to_string(),
        }
    }

    /// Logical file name before key normalization.
    pub fn logical_name(&self) -> String {
        match self {
            UploadTarget::Url { host, .. } => host.replace('.', "_"),
            UploadTarget::Search { query } => format!("S_{}", query.replace(' ', "_")),
            UploadTarget::Pdf { name } | UploadTarget::Manifest { name } => name.clone(),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            UploadTarget::Pdf { .. } => CONTENT_TYPE_PDF,
            _ => CONTENT_TYPE_JSON,
        }
    }
}

fn strip_pdf_suffix(raw: &str) -> Option<&str> {
    let split = raw.len().checked_sub(PDF_SUFFIX.len())?;
    let (stem, suffix) = (raw.get(..split)?, raw.get(split..)?);
    (suffix.eq_ignore_ascii_case(PDF_SUFFIX) && !stem.is_empty()).then_some(stem)
}

/// Extension of the raw upload for a content type.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        CONTENT_TYPE_PDF => "pdf",
        CONTENT_TYPE_JSON => "json",
        _ => "txt",
    }
}

/// Normalize a logical name for a content type. Path separators become
/// `_` so the name stays a single key segment. Manifest names also have
/// spaces replaced and are capped at 20 characters.
pub fn normalize_name(name: &str, content_type: &str) -> String {
    let name = name.replace(['/', '\\'], "_");
    if content_type == CONTENT_TYPE_JSON {
        name.replace(' ', "_").chars().take(MANIFEST_NAME_LIMIT).collect()
    } else {
        name
    }
}

/// One entry of a URL manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ManifestEntry {
    pub url: String,
}

impl ManifestEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}
