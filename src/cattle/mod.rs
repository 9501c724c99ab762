//! Cattle API boundary: registry directory and credential store
//!
//! The reconciler only sees the [`RegistryDirectory`] and [`CredentialStore`]
//! traits. [`CattleClient`] implements both over the Rancher Cattle REST API;
//! tests substitute in-memory fakes.

pub mod client;

use crate::error::Result;
use crate::token::DecodedCredential;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use client::{CattleClient, CattleClientBuilder};

/// Value written to the credential `email` field. Older Cattle versions
/// reject credentials without one; it carries no meaning.
pub const PLACEHOLDER_EMAIL: &str = "not-really@required.anymore";

/// Registry entry as stored by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryRecord {
    pub id: String,
    #[serde(default)]
    pub server_address: String,
}

/// Stored username/password for one registry
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub id: String,
    #[serde(default)]
    pub registry_id: String,
    #[serde(rename = "publicValue", default)]
    pub username: String,
    #[serde(rename = "secretValue", default)]
    pub password: String,
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("registry_id", &self.registry_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Query filters for list calls, sent as `key=value` query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOpts {
    pub filters: Vec<(String, String)>,
}

impl ListOpts {
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }
}

/// Lists and creates registry records
#[async_trait]
pub trait RegistryDirectory: Send + Sync {
    /// Every record matching `opts`, across all pages
    async fn list_registries(&self, opts: &ListOpts) -> Result<Vec<RegistryRecord>>;

    async fn create_registry(&self, server_address: &str) -> Result<RegistryRecord>;
}

/// Lists, creates and updates credential records keyed by registry id
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn list_credentials(&self, registry_id: &str) -> Result<Vec<CredentialRecord>>;

    async fn create_credential(
        &self,
        registry_id: &str,
        credential: &DecodedCredential,
    ) -> Result<CredentialRecord>;

    async fn update_credential(
        &self,
        credential_id: &str,
        credential: &DecodedCredential,
    ) -> Result<CredentialRecord>;
}
