//! Token provider boundary
//!
//! [`TokenProvider`] is the seam the reconciler fetches authorization tokens
//! through; [`EcrTokenProvider`] implements it on top of the AWS SDK using the
//! default credential chain (environment, profile, IRSA, instance metadata).

use crate::error::{Result, SyncError};
use crate::logging::Logger;
use async_trait::async_trait;
use aws_sdk_ecr::error::DisplayErrorContext;

/// One authorization token as returned by the provider
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationData {
    pub proxy_endpoint: String,
    pub raw_token: String,
    pub account_id: Option<String>,
}

impl AuthorizationData {
    pub fn new(proxy_endpoint: impl Into<String>, raw_token: impl Into<String>) -> Self {
        let proxy_endpoint = proxy_endpoint.into();
        let account_id = account_id_from_endpoint(&proxy_endpoint);
        Self {
            proxy_endpoint,
            raw_token: raw_token.into(),
            account_id,
        }
    }
}

impl std::fmt::Debug for AuthorizationData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationData")
            .field("proxy_endpoint", &self.proxy_endpoint)
            .field("raw_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Source of registry authorization tokens
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Fetch tokens for `registry_ids`; an empty slice means the default account.
    async fn fetch_tokens(&self, registry_ids: &[String]) -> Result<Vec<AuthorizationData>>;
}

/// `<account>.dkr.ecr.<region>.amazonaws.com` -> `<account>`
pub fn account_id_from_endpoint(endpoint: &str) -> Option<String> {
    let without_scheme = endpoint.split_once("://").map_or(endpoint, |(_, rest)| rest);
    let (account, _) = without_scheme.split_once(".dkr.ecr.")?;
    if !account.is_empty() && account.chars().all(|c| c.is_ascii_digit()) {
        Some(account.to_string())
    } else {
        None
    }
}

pub struct EcrTokenProvider {
    client: aws_sdk_ecr::Client,
    output: Logger,
}

impl EcrTokenProvider {
    /// Build a client from the default AWS configuration chain
    pub async fn from_env(output: Logger) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        if let Some(region) = config.region() {
            output.detail(&format!("Using AWS region {}", region));
        } else {
            output.warning("No AWS region configured; ECR requests will fail until one is set");
        }
        Self {
            client: aws_sdk_ecr::Client::new(&config),
            output,
        }
    }
}

#[async_trait]
impl TokenProvider for EcrTokenProvider {
    async fn fetch_tokens(&self, registry_ids: &[String]) -> Result<Vec<AuthorizationData>> {
        let mut request = self.client.get_authorization_token();
        if !registry_ids.is_empty() {
            self.output
                .detail(&format!("Requesting tokens for registries: {}", registry_ids.join(", ")));
            // Deprecated upstream, but still the only way to scope the call to accounts.
            #[allow(deprecated)]
            let scoped = request.set_registry_ids(Some(registry_ids.to_vec()));
            request = scoped;
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Provider(DisplayErrorContext(&e).to_string()))?;
        self.output.info("Returned from AWS GetAuthorizationToken call successfully");

        let mut tokens = Vec::new();
        for data in response.authorization_data() {
            match (data.proxy_endpoint(), data.authorization_token()) {
                (Some(endpoint), Some(token)) => {
                    if let Some(expires_at) = data.expires_at() {
                        self.output.detail(&format!(
                            "Token for {} expires at epoch {}",
                            endpoint,
                            expires_at.secs()
                        ));
                    }
                    tokens.push(AuthorizationData::new(endpoint, token));
                }
                _ => self
                    .output
                    .warning("Skipping authorization data without endpoint or token"),
            }
        }

        if tokens.is_empty() {
            return Err(SyncError::Provider(
                "Request did not return authorization data".to_string(),
            ));
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_from_endpoint() {
        assert_eq!(
            account_id_from_endpoint("https://012345678910.dkr.ecr.us-east-1.amazonaws.com"),
            Some("012345678910".to_string())
        );
        assert_eq!(
            account_id_from_endpoint("012345678910.dkr.ecr.eu-west-1.amazonaws.com"),
            Some("012345678910".to_string())
        );
        assert_eq!(account_id_from_endpoint("https://registry.example.com"), None);
        assert_eq!(account_id_from_endpoint("https://proxy.dkr.ecr.example.com"), None);
    }

    #[test]
    fn test_authorization_data_debug_redacts_token() {
        let data = AuthorizationData::new("https://1.dkr.ecr.us-east-1.amazonaws.com", "c2VjcmV0");
        let rendered = format!("{:?}", data);
        assert!(!rendered.contains("c2VjcmV0"));
        assert_eq!(data.account_id.as_deref(), Some("1"));
    }
}
