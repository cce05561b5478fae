//! The archival loop: drain the queue, write each message to the
//! object store, acknowledge what was written.

use anyhow::Result;
use async_trait::async_trait;
use core::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Messages requested per poll.
const MAX_BATCH_SIZE: i32 = 5;

/// Server-side long-poll wait, in seconds.
const WAIT_TIME_SECONDS: i32 = 5;

/// A message pulled off the queue. The handle is the only identity
/// carried across the queue boundary; it is required to acknowledge.
pub struct ReceivedMessage {
    pub body: String,
    pub receipt_handle: String,
}

/// Source of queued messages, with explicit per-message
/// acknowledgement.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn receive(&self, max_messages: i32, wait_seconds: i32) -> Result<Vec<ReceivedMessage>>;
    async fn acknowledge(&self, receipt_handle: &str) -> Result<()>;
}

/// Destination for archived message bodies.
#[async_trait]
pub trait ObjectSink: Send + Sync {
    async fn put(&self, key: &str, body: &str) -> Result<()>;
}

/// Wrapper structure that executes successive archival cycles:
/// receive a batch of messages, store each body under a fresh key,
/// and acknowledge each stored message.
pub struct Archiver<S, K> {
    source: S,
    sink: K,
    poll_interval: Duration,
}

impl<S: MessageSource, K: ObjectSink> Archiver<S, K> {
    pub fn new(source: S, sink: K, poll_interval: Duration) -> Self {
        Archiver {
            source,
            sink,
            poll_interval,
        }
    }

    /// Perform a single pass of the archival cycle. Every failure is
    /// logged and absorbed; the pass always ends with the configured
    /// sleep, so a broken queue is retried at a fixed cadence rather
    /// than with backoff.
    #[instrument(skip(self))]
    pub async fn tick(&self) {
        let messages = match self.source.receive(MAX_BATCH_SIZE, WAIT_TIME_SECONDS).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Error while receiving messages from the queue: {:?}", e);
                Vec::new()
            }
        };
        for message in &messages {
            // Failures are per-message; the rest of the batch still
            // gets archived. An unacknowledged message reappears
            // after the visibility timeout and is archived again
            // under a different key.
            if let Err(e) = self.archive(message).await {
                warn!("Couldn't archive message: {:?}", e);
            }
        }
        sleep(self.poll_interval).await;
    }

    /// Store one message body under a fresh key, then acknowledge.
    /// The acknowledgement only happens after a successful write, so
    /// a crash in between reprocesses the message instead of losing
    /// it.
    async fn archive(&self, message: &ReceivedMessage) -> Result<()> {
        let key = format!("messages/{}.json", Uuid::new_v4());
        self.sink.put(&key, &message.body).await?;
        self.source.acknowledge(&message.receipt_handle).await?;
        info!("Archived message to {:?}", key);
        Ok(())
    }
}
