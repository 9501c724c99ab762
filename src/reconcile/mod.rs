//! Token-to-credential reconciliation
//!
//! For every authorization token: decode it, resolve the target host, find the
//! first directory registry whose host matches, and either overwrite that
//! registry's single credential or, with auto-create enabled, create a new
//! registry and credential. Tokens are processed one after another and a
//! failure on one never stops the rest; every outcome lands in the
//! [`ReconciliationReport`].

pub mod report;

use crate::cattle::{CredentialStore, ListOpts, RegistryDirectory, RegistryRecord};
use crate::ecr::{AuthorizationData, TokenProvider};
use crate::error::{Result, SyncError};
use crate::logging::Logger;
use crate::token::{DecodedCredential, decode_token, resolve_entry_host, resolve_host};
use std::time::Instant;
use tracing::Instrument;

pub use report::{ReconciliationReport, SkipReason, TupleOutcome, TupleReport};

/// Process-wide reconciliation settings, fixed at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Provider accounts to request tokens for; empty means the default account
    pub registry_ids: Vec<String>,
    /// Create a registry and credential when nothing matches
    pub auto_create: bool,
    /// Host used for matching instead of the one parsed from addresses
    pub host_override: Option<String>,
}

impl ReconcileConfig {
    fn host_override(&self) -> Option<&str> {
        self.host_override.as_deref().filter(|h| !h.is_empty())
    }
}

/// One full pass: fetch tokens, then reconcile them.
///
/// Only a provider failure is returned as an error; everything after the
/// fetch is contained per token inside the report.
pub async fn sync_once(
    provider: &dyn TokenProvider,
    config: &ReconcileConfig,
    directory: &dyn RegistryDirectory,
    store: &dyn CredentialStore,
    output: &Logger,
) -> Result<ReconciliationReport> {
    output.section("Updating ECR Credentials");
    let start = Instant::now();

    let tokens = provider.fetch_tokens(&config.registry_ids).await?;
    output.info(&format!("Received {} authorization token(s)", tokens.len()));

    let report = reconcile(&tokens, config, directory, store, output).await;

    output.summary_kv("Reconciliation summary", &report.summary_items());
    output.info(&format!(
        "Pass finished in {}",
        output.format_duration(start.elapsed())
    ));
    Ok(report)
}

/// Reconcile already-fetched tokens against the directory and credential store
pub async fn reconcile(
    tokens: &[AuthorizationData],
    config: &ReconcileConfig,
    directory: &dyn RegistryDirectory,
    store: &dyn CredentialStore,
    output: &Logger,
) -> ReconciliationReport {
    let mut report = ReconciliationReport::default();

    for data in tokens {
        let span = tracing::info_span!(
            "token",
            endpoint = %data.proxy_endpoint,
            account = data.account_id.as_deref().unwrap_or("-")
        );
        let tuple = reconcile_token(data, config, directory, store, output)
            .instrument(span.clone())
            .await;
        span.in_scope(|| log_outcome(&tuple, output));
        report.push(tuple);
    }

    report
}

async fn reconcile_token(
    data: &AuthorizationData,
    config: &ReconcileConfig,
    directory: &dyn RegistryDirectory,
    store: &dyn CredentialStore,
    output: &Logger,
) -> TupleReport {
    let mut tuple = TupleReport {
        endpoint: data.proxy_endpoint.clone(),
        host: None,
        registry_id: None,
        outcome: TupleOutcome::Skipped(SkipReason::NoMatchingRegistry {
            host: String::new(),
        }),
    };

    let credential = match decode_token(&data.raw_token) {
        Ok(credential) => credential,
        Err(e) => {
            tuple.outcome = TupleOutcome::Failed(e.into());
            return tuple;
        }
    };

    let host = match resolve_host(&data.proxy_endpoint, config.host_override()) {
        Ok(host) => host,
        Err(e) => {
            tuple.outcome = TupleOutcome::Failed(e.into());
            return tuple;
        }
    };
    tuple.host = Some(host.clone());
    output.info(&format!("Looking for configured registry for host {}", host));

    let registries = match directory.list_registries(&ListOpts::default()).await {
        Ok(registries) => registries,
        Err(e) => {
            tuple.outcome = TupleOutcome::Failed(e);
            return tuple;
        }
    };
    output.detail(&format!("Directory holds {} registries", registries.len()));

    tuple.outcome = match find_registry(&registries, &host, config.host_override(), output) {
        Some(registry) => {
            tuple.registry_id = Some(registry.id.clone());
            update_credential(registry, &credential, store, output).await
        }
        None if config.auto_create => {
            let (registry_id, outcome) =
                create_registry(&host, &credential, directory, store, output).await;
            tuple.registry_id = registry_id;
            outcome
        }
        None => TupleOutcome::Skipped(SkipReason::NoMatchingRegistry { host }),
    };
    tuple
}

/// First registry in list order whose resolved host equals `host`.
/// Entries whose address cannot be parsed are skipped.
pub fn find_registry<'a>(
    registries: &'a [RegistryRecord],
    host: &str,
    host_override: Option<&str>,
    output: &Logger,
) -> Option<&'a RegistryRecord> {
    for registry in registries {
        match resolve_entry_host(&registry.server_address, host_override) {
            Ok(registry_host) if registry_host == host => return Some(registry),
            Ok(_) => {}
            Err(e) => output.warning(&format!(
                "Skipping registry {} with unparseable address: {}",
                registry.id, e
            )),
        }
    }
    None
}

async fn update_credential(
    registry: &RegistryRecord,
    credential: &DecodedCredential,
    store: &dyn CredentialStore,
    output: &Logger,
) -> TupleOutcome {
    let existing = match store.list_credentials(&registry.id).await {
        Ok(existing) => existing,
        Err(e) => return TupleOutcome::Failed(e),
    };

    let [current] = existing.as_slice() else {
        return TupleOutcome::Failed(SyncError::AmbiguousCredentialState {
            registry_id: registry.id.clone(),
            count: existing.len(),
        });
    };

    output.detail(&format!(
        "Updating credential {} for registry {}",
        current.id, registry.id
    ));
    match store.update_credential(&current.id, credential).await {
        Ok(updated) => TupleOutcome::Updated {
            registry_id: registry.id.clone(),
            credential_id: if updated.id.is_empty() {
                current.id.clone()
            } else {
                updated.id
            },
        },
        Err(e) => TupleOutcome::Failed(e),
    }
}

async fn create_registry(
    host: &str,
    credential: &DecodedCredential,
    directory: &dyn RegistryDirectory,
    store: &dyn CredentialStore,
    output: &Logger,
) -> (Option<String>, TupleOutcome) {
    output.info(&format!("No registry configured for {}, creating one", host));

    let registry = match directory.create_registry(host).await {
        Ok(registry) => registry,
        Err(e) => return (None, TupleOutcome::Failed(e)),
    };
    output.detail(&format!("Created registry {} for {}", registry.id, host));

    let outcome = match store.create_credential(&registry.id, credential).await {
        Ok(created) => TupleOutcome::Created {
            registry_id: registry.id.clone(),
            credential_id: created.id,
        },
        Err(e) => TupleOutcome::Failed(SyncError::PartialCreateFailure {
            registry_id: registry.id.clone(),
            reason: e.to_string(),
        }),
    };
    (Some(registry.id), outcome)
}

fn log_outcome(tuple: &TupleReport, output: &Logger) {
    let host = tuple.host.as_deref().unwrap_or("-");
    match &tuple.outcome {
        TupleOutcome::Updated {
            registry_id,
            credential_id,
        } => output.success(&format!(
            "Successfully updated credentials {} for registry {}; registry address: {}",
            credential_id, registry_id, host
        )),
        TupleOutcome::Created {
            registry_id,
            credential_id,
        } => output.success(&format!(
            "Created registry {} with credentials {}; registry address: {}",
            registry_id, credential_id, host
        )),
        TupleOutcome::Skipped(reason) => output.info(&format!("Skipped: {}", reason)),
        TupleOutcome::Failed(e) if e.needs_operator_attention() => output.error(&format!(
            "{} (operator attention required, kind={})",
            e,
            e.kind()
        )),
        TupleOutcome::Failed(e) => output.warning(&format!(
            "Failed to reconcile token (kind={}): {}",
            e.kind(),
            e
        )),
    }
}
