//! Lambda event and response payloads.
//!
//! SQS events and proxy responses come from `aws_lambda_events`. The REST
//! proxy request only models the fields the handlers read, including the
//! Cognito claims under `requestContext.authorizer.claims`.

use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::apigw::ApiGatewayProxyResponse;
use http::HeaderMap;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE, HeaderValue,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use aws_lambda_events::event::sqs::{SqsEvent, SqsMessage};

/// API Gateway REST proxy event.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayEvent {
    #[serde(default)]
    pub request_context: RequestContext,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RequestContext {
    #[serde(default)]
    pub authorizer: Option<Authorizer>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Authorizer {
    #[serde(default)]
    pub claims: HashMap<String, serde_json::Value>,
}

impl ApiGatewayEvent {
    /// Subject claim of the Cognito authorizer.
    pub fn user_id(&self) -> Option<&str> {
        self.request_context
            .authorizer
            .as_ref()
            .and_then(|a| a.claims.get("sub"))
            .and_then(|v| v.as_str())
    }

    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|p| p.get(name))
            .map(String::as_str)
    }

    pub fn query_parameter(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|p| p.get(name))
            .map(String::as_str)
    }

    /// Builder used by tests and local invocations.
    pub fn for_user(user_id: &str) -> Self {
        let mut claims = HashMap::new();
        claims.insert("sub".to_string(), serde_json::Value::from(user_id));
        Self {
            request_context: RequestContext {
                authorizer: Some(Authorizer { claims }),
            },
            ..Default::default()
        }
    }

    pub fn with_path_parameter(mut self, name: &str, value: &str) -> Self {
        self.path_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_query_parameter(mut self, name: &str, value: &str) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A 200 proxy response with a JSON body and permissive CORS headers.
pub fn json_response<T: Serialize>(body: &T) -> Result<ApiGatewayProxyResponse, serde_json::Error> {
    let any = HeaderValue::from_static("*");
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, any.clone());
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, any.clone());
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, any);

    Ok(ApiGatewayProxyResponse {
        status_code: 200,
        headers,
        body: Some(Body::Text(serde_json::to_string(body)?)),
        ..Default::default()
    })
}

/// Body of an embedding request message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmbeddingMessage {
    pub documentid: String,
    pub user: String,
    pub key: String,
}

/// Response of the upload URL issuer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UploadUrlResponse {
    pub presignedurl: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub content: String,
}

/// Body of a generate response request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub file_name: String,
    pub prompt: String,
}

/// Response of the document deleter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeleteDocumentResponse {
    pub operation: String,
    pub document_id: String,
    pub conversation_ids: Vec<String>,
}
