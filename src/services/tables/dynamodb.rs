use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use std::collections::HashMap;

use super::{ChatHistoryStore, DocumentTable};
use crate::error::TableError;
use crate::models::{ChatMessage, ConversationRef, Document, DocumentStatus, Role};

type Item = HashMap<String, AttributeValue>;

fn request_error<E: std::error::Error>(e: E) -> TableError {
    TableError::RequestError(DisplayErrorContext(e).to_string())
}

fn s(value: impl Into<String>) -> AttributeValue {
    AttributeValue::S(value.into())
}

/// String attribute; numbers are accepted and kept in their text form.
fn string_attr(item: &Item, name: &str) -> Option<String> {
    match item.get(name)? {
        AttributeValue::S(v) | AttributeValue::N(v) => Some(v.clone()),
        _ => None,
    }
}

fn required_string(item: &Item, name: &str) -> Result<String, TableError> {
    string_attr(item, name)
        .ok_or_else(|| TableError::MalformedItem(format!("missing string attribute {name}")))
}

fn document_from_item(item: &Item) -> Result<Document, TableError> {
    let docstatus = match string_attr(item, "docstatus") {
        Some(status) => status.parse().map_err(TableError::MalformedItem)?,
        None => DocumentStatus::Uploaded,
    };

    let conversations = match item.get("conversations") {
        Some(AttributeValue::L(list)) => list
            .iter()
            .filter_map(|v| v.as_m().ok())
            .map(|m| {
                Ok(ConversationRef {
                    conversationid: required_string(m, "conversationid")?,
                    created: string_attr(m, "created"),
                })
            })
            .collect::<Result<Vec<_>, TableError>>()?,
        _ => Vec::new(),
    };

    Ok(Document {
        userid: required_string(item, "userid")?,
        documentid: required_string(item, "documentid")?,
        filename: required_string(item, "filename")?,
        key: string_attr(item, "key"),
        docstatus,
        conversations,
        filesize: string_attr(item, "filesize"),
        pages: string_attr(item, "pages"),
        created: string_attr(item, "created"),
    })
}

/// Document table stored in DynamoDB.
#[derive(Debug, Clone)]
pub struct DynamoDocumentTable {
    client: Client,
    table: String,
}

impl DynamoDocumentTable {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig, table: impl Into<String>) -> Self {
        Self::new(Client::new(sdk_config), table)
    }
}

#[async_trait]
impl DocumentTable for DynamoDocumentTable {
    async fn get(&self, user_id: &str, document_id: &str) -> Result<Option<Document>, TableError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("userid", s(user_id))
            .key("documentid", s(document_id))
            .send()
            .await
            .map_err(request_error)?;

        output.item().map(document_from_item).transpose()
    }

    async fn set_status(
        &self,
        user_id: &str,
        document_id: &str,
        status: DocumentStatus,
    ) -> Result<(), TableError> {
        self.client
            .update_item()
            .table_name(&self.table)
            .key("userid", s(user_id))
            .key("documentid", s(document_id))
            .update_expression("SET docstatus = :docstatus")
            .expression_attribute_values(":docstatus", s(status.as_str()))
            .send()
            .await
            .map_err(request_error)?;
        Ok(())
    }

    async fn delete(&self, user_id: &str, document_id: &str) -> Result<(), TableError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key("userid", s(user_id))
            .key("documentid", s(document_id))
            .send()
            .await
            .map_err(request_error)?;
        Ok(())
    }
}

fn message_to_attr(message: &ChatMessage) -> AttributeValue {
    let data = HashMap::from([
        ("type".to_string(), s(message.role.to_string())),
        ("content".to_string(), s(message.content.clone())),
    ]);
    AttributeValue::M(HashMap::from([
        ("type".to_string(), s(message.role.to_string())),
        ("data".to_string(), AttributeValue::M(data)),
    ]))
}

fn message_from_attr(value: &AttributeValue) -> Result<ChatMessage, TableError> {
    let entry = value
        .as_m()
        .map_err(|_| TableError::MalformedItem("history entry is not a map".to_string()))?;
    let role: Role = required_string(entry, "type")?
        .parse()
        .map_err(TableError::MalformedItem)?;
    let content = match entry.get("data") {
        Some(AttributeValue::M(data)) => required_string(data, "content")?,
        _ => return Err(TableError::MalformedItem("history entry without data".to_string())),
    };
    Ok(ChatMessage::new(role, content))
}

/// Conversation history in the layout LangChain's DynamoDB history uses:
/// one item per `SessionId` with a `History` list.
#[derive(Debug, Clone)]
pub struct DynamoChatHistory {
    client: Client,
    table: String,
}

impl DynamoChatHistory {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig, table: impl Into<String>) -> Self {
        Self::new(Client::new(sdk_config), table)
    }
}

#[async_trait]
impl ChatHistoryStore for DynamoChatHistory {
    async fn messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, TableError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("SessionId", s(session_id))
            .send()
            .await
            .map_err(request_error)?;

        match output.item().and_then(|item| item.get("History")) {
            Some(AttributeValue::L(entries)) => entries.iter().map(message_from_attr).collect(),
            _ => Ok(Vec::new()),
        }
    }

    async fn append(&self, session_id: &str, messages: &[ChatMessage]) -> Result<(), TableError> {
        if messages.is_empty() {
            return Ok(());
        }

        let entries = messages.iter().map(message_to_attr).collect();
        self.client
            .update_item()
            .table_name(&self.table)
            .key("SessionId", s(session_id))
            .update_expression("SET History = list_append(if_not_exists(History, :empty), :new)")
            .expression_attribute_values(":empty", AttributeValue::L(Vec::new()))
            .expression_attribute_values(":new", AttributeValue::L(entries))
            .send()
            .await
            .map_err(request_error)?;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<bool, TableError> {
        let output = self
            .client
            .delete_item()
            .table_name(&self.table)
            .key("SessionId", s(session_id))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(request_error)?;

        Ok(output.attributes().is_some_and(|a| !a.is_empty()))
    }
}
