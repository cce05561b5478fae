use anyhow::{Context, Result};
use core::time::Duration;
use payload_relay::conf::{self, WorkerSettings};
use payload_relay::queue::SqsQueue;
use payload_relay::store::ObjectStore;
use payload_relay::worker::Archiver;
use tracing::info;

/// Drain the queue continuously, archiving each message to the
/// bucket.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let settings: WorkerSettings =
        envy::from_env().context("Failed to read settings from the environment")?;
    let aws_config = conf::aws_service_config(settings.aws_region.clone()).await;
    let archiver = Archiver::new(
        SqsQueue::new(
            aws_sdk_sqs::Client::new(&aws_config),
            settings.sqs_queue_url,
        ),
        ObjectStore::new(
            aws_sdk_s3::Client::new(&aws_config),
            settings.s3_bucket_name,
        ),
        Duration::from_secs(settings.poll_interval),
    );

    // Listen for abort signals
    let (stop_processing, mut should_stop) = tokio::sync::oneshot::channel();
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("CTRL-C");
            stop_processing.send(()).ok();
        }
    });

    // Continuously receive messages and archive each one
    loop {
        tokio::select! {
            _ = archiver.tick() => (),
            _ = &mut should_stop => break
        }
    }
    Ok(())
}
