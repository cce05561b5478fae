use anyhow::{Context, Result};
use payload_relay::api::{self, ApiState};
use payload_relay::conf::{self, ApiSettings};
use payload_relay::queue::SqsQueue;
use payload_relay::secrets::SsmTokenStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Serve the submission endpoint: authenticate, validate, and forward
/// payloads to the queue.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let settings: ApiSettings =
        envy::from_env().context("Failed to read settings from the environment")?;
    let addr: SocketAddr = settings
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {:?}", settings.bind_address))?;

    let aws_config = conf::aws_service_config(settings.aws_region.clone()).await;
    let state = Arc::new(ApiState {
        token_store: Box::new(SsmTokenStore::new(
            aws_sdk_ssm::Client::new(&aws_config),
            settings.token_param_name,
        )),
        publisher: Box::new(SqsQueue::new(
            aws_sdk_sqs::Client::new(&aws_config),
            settings.sqs_queue_url,
        )),
    });

    info!("Listening on {:?}", addr);
    axum::Server::bind(&addr)
        .serve(api::router(state).into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("CTRL-C");
        })
        .await
        .context("Server terminated abnormally")?;
    Ok(())
}
