//! ECR Credential Sync Library
//!
//! Library root for the ecr-credential-sync sidecar, which propagates
//! short-lived AWS ECR authorization tokens into Cattle registry credentials.

pub mod cattle;
pub mod cli;
pub mod ecr;
pub mod error;
pub mod health;
pub mod logging;
pub mod reconcile;
pub mod token;

pub use error::{Result, SyncError};
pub use logging::Logger;
pub use reconcile::{ReconcileConfig, ReconciliationReport, reconcile, sync_once};
