//! SQS-backed queue access, on both sides of the relay.

use crate::api::Publisher;
use crate::worker::{MessageSource, ReceivedMessage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_sqs::Client;
use tracing::warn;

/// A handle to one SQS queue. The ingestion side publishes to it; the
/// worker side receives from it and acknowledges by deleting.
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    pub fn new(client: Client, queue_url: String) -> Self {
        SqsQueue { client, queue_url }
    }
}

#[async_trait]
impl Publisher for SqsQueue {
    async fn publish(&self, body: &str) -> Result<()> {
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .with_context(|| format!("Failed to send message to queue {:?}", self.queue_url))?;
        Ok(())
    }
}

#[async_trait]
impl MessageSource for SqsQueue {
    async fn receive(&self, max_messages: i32, wait_seconds: i32) -> Result<Vec<ReceivedMessage>> {
        let result = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_seconds)
            .send()
            .await
            .with_context(|| {
                format!("Failed to receive messages from queue {:?}", self.queue_url)
            })?;
        Ok(result
            .messages()
            .unwrap_or_default()
            .iter()
            .filter_map(|message| match (message.body(), message.receipt_handle()) {
                (Some(body), Some(receipt_handle)) => Some(ReceivedMessage {
                    body: String::from(body),
                    receipt_handle: String::from(receipt_handle),
                }),
                _ => {
                    warn!("Ignoring message without body or receipt handle");
                    None
                }
            })
            .collect())
    }

    async fn acknowledge(&self, receipt_handle: &str) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .with_context(|| format!("Failed to delete message from queue {:?}", self.queue_url))?;
        Ok(())
    }
}
