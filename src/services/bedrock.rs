//! Thin wrapper around the Bedrock runtime `InvokeModel` call.

use aws_config::SdkConfig;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::InvokeError;

/// Foundation model id without an ARN path or a cross-region inference
/// prefix: `arn:...:inference-profile/us.meta.llama3-8b` becomes
/// `meta.llama3-8b`.
pub fn base_model_id(model_id: &str) -> &str {
    let id = model_id.rsplit_once('/').map_or(model_id, |(_, id)| id);
    match id.split_once('.') {
        Some((geo, rest)) if geo.len() == 2 || geo == "apac" => rest,
        _ => id,
    }
}

#[derive(Debug, Clone)]
pub struct BedrockRuntime {
    client: Client,
}

impl BedrockRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Client for the region hosting the models, which may differ from the
    /// region of the bucket and tables.
    pub fn from_sdk_config(sdk_config: &SdkConfig, region: &str) -> Self {
        let config = aws_sdk_bedrockruntime::config::Builder::from(sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        Self::new(Client::from_conf(config))
    }

    /// Invoke a model with a JSON body and decode its JSON response.
    pub async fn invoke_json<B, R>(&self, model_id: &str, body: &B) -> Result<R, InvokeError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)?;

        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|e| InvokeError::Request(DisplayErrorContext(e).to_string()))?;

        Ok(serde_json::from_slice(output.body().as_ref())?)
    }
}
