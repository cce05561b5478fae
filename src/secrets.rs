//! Parameter-store access for the submission token.

use crate::api::TokenStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_ssm::Client;

/// Fetches the expected token from SSM by parameter name, decrypted.
/// There is no caching: rotation takes effect on the next request.
pub struct SsmTokenStore {
    client: Client,
    parameter_name: String,
}

impl SsmTokenStore {
    pub fn new(client: Client, parameter_name: String) -> Self {
        SsmTokenStore {
            client,
            parameter_name,
        }
    }
}

#[async_trait]
impl TokenStore for SsmTokenStore {
    async fn fetch_token(&self) -> Result<String> {
        let response = self
            .client
            .get_parameter()
            .name(&self.parameter_name)
            .with_decryption(true)
            .send()
            .await
            .with_context(|| format!("Failed to fetch parameter {:?}", self.parameter_name))?;
        response
            .parameter()
            .and_then(|parameter| parameter.value())
            .map(String::from)
            .with_context(|| format!("Parameter {:?} has no value", self.parameter_name))
    }
}
