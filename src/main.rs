use anyhow::Result;
use clap::Parser;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use tracing::info;
use tracing_subscriber::EnvFilter;

use docchat::cli::{Cli, Handler, LogFormat};
use docchat::handlers::{
    DeleteDeps, EmbeddingDeps, ResponseDeps, UploadDeps, delete, embeddings, response, upload_url,
};
use docchat::models::{
    ApiGatewayEvent, DeleteConfig, EmbeddingsConfig, ProcessEnv, ResponseConfig, SqsEvent,
    UploadConfig,
};

fn init_tracing(format: LogFormat, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match format {
        // CloudWatch adds its own timestamps.
        LogFormat::Json => builder.json().without_time().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_format, cli.verbose);

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let env = ProcessEnv;
    info!(handler = ?cli.handler, "starting handler");

    let served = match cli.handler {
        Handler::UploadUrl => {
            let deps = UploadDeps::from_config(&sdk_config, &UploadConfig::from_env(&env)?)?;
            let deps = &deps;
            lambda_runtime::run(service_fn(
                move |event: LambdaEvent<ApiGatewayEvent>| async move {
                    Ok::<_, Error>(upload_url::handle(deps, event.payload).await?)
                },
            ))
            .await
        }
        Handler::Embeddings => {
            let deps =
                EmbeddingDeps::from_config(&sdk_config, &EmbeddingsConfig::from_env(&env)?)?;
            let deps = &deps;
            lambda_runtime::run(service_fn(move |event: LambdaEvent<SqsEvent>| async move {
                embeddings::handle(deps, event.payload).await?;
                Ok::<_, Error>(())
            }))
            .await
        }
        Handler::Respond => {
            let deps = ResponseDeps::from_config(&sdk_config, &ResponseConfig::from_env(&env)?)?;
            let deps = &deps;
            lambda_runtime::run(service_fn(
                move |event: LambdaEvent<ApiGatewayEvent>| async move {
                    Ok::<_, Error>(response::handle(deps, event.payload).await?)
                },
            ))
            .await
        }
        Handler::Delete => {
            let deps = DeleteDeps::from_config(&sdk_config, &DeleteConfig::from_env(&env)?);
            let deps = &deps;
            lambda_runtime::run(service_fn(
                move |event: LambdaEvent<ApiGatewayEvent>| async move {
                    Ok::<_, Error>(delete::handle(deps, event.payload).await?)
                },
            ))
            .await
        }
    };

    served.map_err(|e| anyhow::anyhow!(e))
}
