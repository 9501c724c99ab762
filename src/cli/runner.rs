//! Long-running sidecar loop
//!
//! Binds the health listener, checks the Cattle API is reachable, runs one
//! reconciliation pass immediately and then one per refresh interval. The
//! interval is measured from the end of a pass, so passes never overlap.

use crate::cattle::{CattleClient, CredentialStore, RegistryDirectory};
use crate::cli::config::AppConfig;
use crate::ecr::{EcrTokenProvider, TokenProvider};
use crate::error::{Result, SyncError};
use crate::health;
use crate::logging::Logger;
use crate::reconcile::sync_once;
use std::future::Future;
use std::time::Duration;

pub struct Runner {
    config: AppConfig,
    output: Logger,
}

impl Runner {
    pub fn new(config: AppConfig) -> Self {
        let output = Logger::new(config.verbose);
        Self { config, output }
    }

    pub async fn run(&self) -> Result<()> {
        self.output.section("ECR Credential Sync");
        self.output
            .summary_kv("Configuration", &self.config.summary_items());

        let port = self.config.listen_port;
        let listener = health::bind(port).await.map_err(|e| {
            SyncError::Io(format!("Error creating health check listener on port {}: {}", port, e))
        })?;
        let health_task = tokio::spawn(async move {
            if let Err(e) = health::serve(listener).await {
                tracing::error!(error = %e, "Health check listener stopped");
            }
        });

        let cattle = self.create_cattle_client().await?;
        let provider = EcrTokenProvider::from_env(self.output.clone()).await;

        let passes = self
            .run_schedule(&provider, &cattle, &cattle, shutdown_signal())
            .await;
        self.output.info(&format!("Stopping after {} pass(es)", passes));

        health_task.abort();
        Ok(())
    }

    async fn create_cattle_client(&self) -> Result<CattleClient> {
        let cattle = &self.config.cattle;
        let client = CattleClient::builder(cattle.url.clone())
            .with_keys(cattle.access_key.clone(), cattle.secret_key.clone())
            .with_timeout(Duration::from_secs(cattle.timeout))
            .with_logger(self.output.clone())
            .build()?;

        client.ping().await.map_err(|e| {
            SyncError::Configuration(format!("Cannot reach Cattle API at {}: {}", cattle.url, e))
        })?;
        self.output
            .success(&format!("Connected to Cattle API at {}", client.address()));
        Ok(client)
    }

    /// Run one pass now, then one per interval until `shutdown` resolves.
    /// Returns the number of passes run.
    pub async fn run_schedule(
        &self,
        provider: &dyn TokenProvider,
        directory: &dyn RegistryDirectory,
        store: &dyn CredentialStore,
        shutdown: impl Future<Output = ()>,
    ) -> usize {
        tokio::pin!(shutdown);
        let mut passes = 0;

        loop {
            self.run_pass(provider, directory, store).await;
            passes += 1;

            if self.config.run_once {
                break;
            }

            self.output.detail(&format!(
                "Next pass in {}",
                self.output.format_duration(self.config.refresh_interval)
            ));
            tokio::select! {
                _ = tokio::time::sleep(self.config.refresh_interval) => {}
                _ = &mut shutdown => {
                    self.output.info("Received shutdown signal");
                    break;
                }
            }
        }

        passes
    }

    async fn run_pass(
        &self,
        provider: &dyn TokenProvider,
        directory: &dyn RegistryDirectory,
        store: &dyn CredentialStore,
    ) {
        match sync_once(provider, &self.config.reconcile, directory, store, &self.output).await {
            Ok(report) => {
                for tuple in report.needs_attention() {
                    self.output.warning(&format!(
                        "Manual cleanup needed for {}: {:?}",
                        tuple.endpoint, tuple.outcome
                    ));
                }
            }
            Err(e) => self.output.error(&format!("Error updating ECR, {}", e)),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
