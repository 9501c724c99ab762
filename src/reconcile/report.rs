//! Per-pass reconciliation report

use crate::error::SyncError;
use std::fmt;

/// Why a token was left alone without being an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No registry matched and auto-create is disabled
    NoMatchingRegistry { host: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoMatchingRegistry { host } => {
                write!(f, "no configured registry matches host {}", host)
            }
        }
    }
}

/// Terminal state of one token's pipeline
#[derive(Debug, Clone)]
pub enum TupleOutcome {
    Updated { registry_id: String, credential_id: String },
    Created { registry_id: String, credential_id: String },
    Skipped(SkipReason),
    Failed(SyncError),
}

impl TupleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TupleOutcome::Updated { .. } => "updated",
            TupleOutcome::Created { .. } => "created",
            TupleOutcome::Skipped(_) => "skipped",
            TupleOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TupleReport {
    /// Proxy endpoint of the originating token
    pub endpoint: String,
    /// Resolved match host, once known
    pub host: Option<String>,
    /// Registry touched or matched, once known
    pub registry_id: Option<String>,
    pub outcome: TupleOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct ReconciliationReport {
    pub tuples: Vec<TupleReport>,
}

impl ReconciliationReport {
    pub fn push(&mut self, report: TupleReport) {
        self.tuples.push(report);
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    fn count(&self, pred: impl Fn(&TupleOutcome) -> bool) -> usize {
        self.tuples.iter().filter(|t| pred(&t.outcome)).count()
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, TupleOutcome::Updated { .. }))
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, TupleOutcome::Created { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TupleOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TupleOutcome::Failed(_)))
    }

    /// Failures that leave state an operator has to fix by hand
    pub fn needs_attention(&self) -> Vec<&TupleReport> {
        self.tuples
            .iter()
            .filter(|t| {
                matches!(&t.outcome, TupleOutcome::Failed(e) if e.needs_operator_attention())
            })
            .collect()
    }

    pub fn summary_items(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Tokens", self.len().to_string()),
            ("Updated", self.updated().to_string()),
            ("Created", self.created().to_string()),
            ("Skipped", self.skipped().to_string()),
            ("Failed", self.failed().to_string()),
            ("Needs attention", self.needs_attention().len().to_string()),
        ]
    }
}
