use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_BEDROCK_REGION: &str = "us-east-1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "amazon.titan-embed-text-v1";
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 300;
pub const DEFAULT_SEARCH_RESULTS: usize = 5;

/// Names of the environment variables read at cold start.
pub mod vars {
    pub const BUCKET: &str = "BUCKET";
    pub const REGION: &str = "REGION";
    pub const DOCUMENT_TABLE: &str = "DOCUMENT_TABLE";
    pub const MEMORY_TABLE: &str = "MEMORY_TABLE";
    pub const MODEL_ID: &str = "MODEL_ID";
    pub const BEDROCK_REGION: &str = "BEDROCK_REGION";
    pub const EMBEDDING_MODEL_ID: &str = "EMBEDDING_MODEL_ID";
    pub const CHUNK_SIZE: &str = "CHUNK_SIZE";
    pub const CHUNK_OVERLAP: &str = "CHUNK_OVERLAP";
    pub const RETRIEVAL_K: &str = "RETRIEVAL_K";
    pub const PRESIGN_EXPIRY_SECS: &str = "PRESIGN_EXPIRY_SECS";
    pub const SEARCH_RESULTS: &str = "SEARCH_RESULTS";
    pub const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
}

/// Source of configuration values.
///
/// The process environment in production, a map in tests.
pub trait Env {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl Env for std::collections::HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        std::collections::HashMap::get(self, name).cloned()
    }
}

fn required(env: &dyn Env, name: &'static str) -> Result<String, ConfigError> {
    env.get(name).ok_or(ConfigError::MissingVar(name))
}

fn optional<T: FromStr>(env: &dyn Env, name: &'static str, default: T) -> Result<T, ConfigError> {
    match env.get(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidVar { name, value }),
        None => Ok(default),
    }
}

/// Settings for the Bedrock runtime client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedrockConfig {
    pub region: String,
    pub embedding_model_id: String,
}

impl BedrockConfig {
    pub fn from_env(env: &dyn Env) -> Result<Self, ConfigError> {
        Ok(Self {
            region: optional(env, vars::BEDROCK_REGION, DEFAULT_BEDROCK_REGION.to_string())?,
            embedding_model_id: optional(
                env,
                vars::EMBEDDING_MODEL_ID,
                DEFAULT_EMBEDDING_MODEL.to_string(),
            )?,
        })
    }
}

/// Chunking parameters, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    100
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl ChunkingConfig {
    pub fn from_env(env: &dyn Env) -> Result<Self, ConfigError> {
        Ok(Self {
            chunk_size: optional(env, vars::CHUNK_SIZE, default_chunk_size())?,
            chunk_overlap: optional(env, vars::CHUNK_OVERLAP, default_chunk_overlap())?,
        })
    }
}

fn default_http_timeout() -> u64 {
    30
}

/// Configuration of the upload URL issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub bucket: String,
    pub region: String,
    pub presign_expiry_secs: u64,
    pub search_results: usize,
    pub http_timeout_secs: u64,
}

impl UploadConfig {
    pub fn from_env(env: &dyn Env) -> Result<Self, ConfigError> {
        Ok(Self {
            bucket: required(env, vars::BUCKET)?,
            region: required(env, vars::REGION)?,
            presign_expiry_secs: optional(
                env,
                vars::PRESIGN_EXPIRY_SECS,
                DEFAULT_PRESIGN_EXPIRY_SECS,
            )?,
            search_results: optional(env, vars::SEARCH_RESULTS, DEFAULT_SEARCH_RESULTS)?,
            http_timeout_secs: optional(env, vars::HTTP_TIMEOUT_SECS, default_http_timeout())?,
        })
    }
}

/// Configuration of the embedding generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingsConfig {
    pub bucket: String,
    pub document_table: String,
    pub bedrock: BedrockConfig,
    pub chunking: ChunkingConfig,
    pub http_timeout_secs: u64,
}

impl EmbeddingsConfig {
    pub fn from_env(env: &dyn Env) -> Result<Self, ConfigError> {
        Ok(Self {
            bucket: required(env, vars::BUCKET)?,
            document_table: required(env, vars::DOCUMENT_TABLE)?,
            bedrock: BedrockConfig::from_env(env)?,
            chunking: ChunkingConfig::from_env(env)?,
            http_timeout_secs: optional(env, vars::HTTP_TIMEOUT_SECS, default_http_timeout())?,
        })
    }
}

/// Configuration of the response generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseConfig {
    pub bucket: String,
    pub memory_table: String,
    pub model_id: String,
    pub bedrock: BedrockConfig,
    pub retrieval_k: usize,
}

impl ResponseConfig {
    pub fn from_env(env: &dyn Env) -> Result<Self, ConfigError> {
        Ok(Self {
            bucket: required(env, vars::BUCKET)?,
            memory_table: required(env, vars::MEMORY_TABLE)?,
            model_id: required(env, vars::MODEL_ID)?,
            bedrock: BedrockConfig::from_env(env)?,
            retrieval_k: optional(env, vars::RETRIEVAL_K, 4)?,
        })
    }
}

/// Configuration of the document deleter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfig {
    pub bucket: String,
    pub document_table: String,
    pub memory_table: String,
}

impl DeleteConfig {
    pub fn from_env(env: &dyn Env) -> Result<Self, ConfigError> {
        Ok(Self {
            bucket: required(env, vars::BUCKET)?,
            document_table: required(env, vars::DOCUMENT_TABLE)?,
            memory_table: required(env, vars::MEMORY_TABLE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_upload_config_requires_region() {
        let result = UploadConfig::from_env(&env(&[("BUCKET", "docs")]));
        assert!(matches!(result, Err(ConfigError::MissingVar("REGION"))));
    }

    #[test]
    fn test_upload_config_defaults() {
        let config =
            UploadConfig::from_env(&env(&[("BUCKET", "docs"), ("REGION", "eu-west-1")])).unwrap();
        assert_eq!(config.bucket, "docs");
        assert_eq!(config.presign_expiry_secs, 300);
        assert_eq!(config.search_results, 5);
    }

    #[test]
    fn test_response_config_requires_model_id() {
        let result =
            ResponseConfig::from_env(&env(&[("BUCKET", "docs"), ("MEMORY_TABLE", "memory")]));
        assert!(matches!(result, Err(ConfigError::MissingVar("MODEL_ID"))));
    }

    #[test]
    fn test_bedrock_defaults() {
        let config = BedrockConfig::from_env(&env(&[])).unwrap();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.embedding_model_id, "amazon.titan-embed-text-v1");
    }

    #[test]
    fn test_invalid_tunable() {
        let result = ChunkingConfig::from_env(&env(&[("CHUNK_SIZE", "lots")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidVar { name: "CHUNK_SIZE", .. })
        ));
    }

    #[test]
    fn test_delete_config() {
        let config = DeleteConfig::from_env(&env(&[
            ("BUCKET", "docs"),
            ("DOCUMENT_TABLE", "documents"),
            ("MEMORY_TABLE", "memory"),
        ]))
        .unwrap();
        assert_eq!(config.document_table, "documents");
        assert_eq!(config.memory_table, "memory");
    }
}
