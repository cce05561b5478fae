//! Defines configuration as read from the environment.

use aws_config::meta::region::RegionProviderChain;
use aws_config::SdkConfig;
use aws_sdk_sqs::config::Region;
use serde::Deserialize;
use std::env;

/// Default `bind_address` value.
fn default_bind_address() -> String {
    String::from("0.0.0.0:5000")
}

/// Default `poll_interval` value, in seconds.
fn default_poll_interval() -> u64 {
    10
}

/// Settings for the ingestion API. The configuration must be given as
/// environment variables.
#[derive(Deserialize)]
pub struct ApiSettings {
    /// The URL of the queue that accepted submissions are forwarded
    /// to.
    pub sqs_queue_url: String,

    /// The name of the parameter-store entry holding the expected
    /// submission token. The value is fetched with decryption on
    /// every request, so rotations take effect immediately.
    pub token_param_name: String,

    /// Overrides the region resolved from the default AWS provider
    /// chain.
    #[serde(default)]
    pub aws_region: Option<String>,

    /// The socket address the HTTP server listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

/// Settings for the archival worker. The configuration must be given
/// as environment variables.
#[derive(Deserialize)]
pub struct WorkerSettings {
    /// The URL of the queue that submissions are drained from.
    pub sqs_queue_url: String,

    /// The bucket that archived submissions are written to.
    pub s3_bucket_name: String,

    /// Overrides the region resolved from the default AWS provider
    /// chain.
    #[serde(default)]
    pub aws_region: Option<String>,

    /// Seconds to sleep between queue polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

/// Build the shared AWS service configuration. An explicit region
/// takes precedence over the default provider chain; `us-east-1` is
/// the final fallback. `AWS_ENDPOINT_URL` redirects all service calls,
/// which allows running against local AWS stand-ins.
pub async fn aws_service_config(region: Option<String>) -> SdkConfig {
    let region_provider = RegionProviderChain::first_try(region.map(Region::new))
        .or_default_provider()
        .or_else(Region::new("us-east-1"));
    let loader = aws_config::from_env().region(region_provider);
    if let Ok(endpoint_url) = env::var("AWS_ENDPOINT_URL") {
        loader
            .endpoint_url(
                if endpoint_url.starts_with("http://") || endpoint_url.starts_with("https://") {
                    endpoint_url
                } else {
                    format!("https://{}", endpoint_url)
                },
            )
            .load()
            .await
    } else {
        loader.load().await
    }
}
