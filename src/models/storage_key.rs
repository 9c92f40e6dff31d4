//! Object key layout: `{user}/{logical_file_name}/{artifact}`.

/// Combined HTML of URL and search inputs.
pub const CONTENT_HTML: &str = "content.html";
/// Serialized vector index structure.
pub const INDEX_STRUCTURE: &str = "index.usearch";
/// Chunk metadata companion of the index structure.
pub const INDEX_METADATA: &str = "index.json";

/// Folder of a key: everything before the last `/`.
pub fn folder_of(key: &str) -> Option<&str> {
    key.rsplit_once('/')
        .map(|(folder, _)| folder)
        .filter(|f| !f.is_empty())
}

/// Last path segment of a key.
pub fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Extension of the last path segment, without the dot.
pub fn extension_of(key: &str) -> Option<&str> {
    file_name_of(key)
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|e| !e.is_empty())
}

/// Folder of a document given its owner and logical file name.
pub fn document_folder(user_id: &str, logical_name: &str) -> String {
    format!("{}/{}", user_id, logical_name)
}

/// Key of an artifact stored next to the raw upload.
pub fn artifact_key(folder: &str, artifact: &str) -> String {
    format!("{}/{}", folder.trim_end_matches('/'), artifact)
}
