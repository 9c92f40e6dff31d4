use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing status of a document.
///
/// The embedding generator only ever writes `Processing`, `Ready` and
/// `Error`; `Uploaded` is written by the upload trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Ready,
    Error,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "UPLOADED",
            DocumentStatus::Processing => "PROCESSING",
            DocumentStatus::Ready => "READY",
            DocumentStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPLOADED" => Ok(DocumentStatus::Uploaded),
            "PROCESSING" => Ok(DocumentStatus::Processing),
            "READY" => Ok(DocumentStatus::Ready),
            "ERROR" => Ok(DocumentStatus::Error),
            other => Err(format!("unknown document status: {}", other)),
        }
    }
}

/// Reference from a document to one of its conversations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRef {
    pub conversationid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl ConversationRef {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversationid: conversation_id.into(),
            created: None,
        }
    }
}

/// A row of the document table, keyed by (`userid`, `documentid`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub userid: String,
    pub documentid: String,
    pub filename: String,
    /// Storage key of the raw upload. Rows written before keys were
    /// recorded only carry the filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub docstatus: DocumentStatus,
    #[serde(default)]
    pub conversations: Vec<ConversationRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesize: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl Document {
    pub fn new(
        user_id: impl Into<String>,
        document_id: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            userid: user_id.into(),
            documentid: document_id.into(),
            filename: filename.into(),
            key: None,
            docstatus: DocumentStatus::Uploaded,
            conversations: Vec::new(),
            filesize: None,
            pages: None,
            created: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversations.push(ConversationRef::new(conversation_id));
        self
    }

    /// Folder prefix holding every stored object of this document,
    /// including the trailing slash.
    pub fn folder_prefix(&self) -> String {
        match self.key.as_deref().and_then(super::storage_key::folder_of) {
            Some(folder) => format!("{}/", folder),
            None => format!("{}/{}/", self.userid, self.filename),
        }
    }
}
