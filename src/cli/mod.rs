//! Command line of the handler binary.

use clap::{Parser, ValueEnum};

/// Serverless handlers for chatting with uploaded documents.
#[derive(Debug, Parser)]
#[command(name = "docchat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Handler served by this process
    #[arg(value_enum, env = "DOCCHAT_HANDLER")]
    pub handler: Handler,

    #[arg(
        long,
        value_enum,
        env = "LOG_FORMAT",
        default_value_t = LogFormat::Json,
        help = "Log output format"
    )]
    pub log_format: LogFormat,

    #[arg(long, short = 'v', help = "Enable debug logging")]
    pub verbose: bool,
}

/// Available handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Handler {
    /// Issue pre-signed upload URLs (API Gateway)
    UploadUrl,
    /// Build document vector indexes (SQS)
    Embeddings,
    /// Answer questions about a document (API Gateway)
    Respond,
    /// Delete a document and its conversations (API Gateway)
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Text,
}
