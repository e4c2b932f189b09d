//! Table provisioning
//!
//! Creating the destination table is attempted once when the sink starts.
//! A failure stops the sink unless the caller opted to bypass it, in which
//! case it is reported to a [`DiagnosticSink`] and writes proceed on the
//! assumption that the table already exists.

use super::client::TableClient;
use super::error::{Result, TableSinkError};

/// Receives failures the sink recovers from on its own
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, message: &str, error: &dyn std::error::Error);
}

/// Reports through `tracing` at warn level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, message: &str, error: &dyn std::error::Error) {
        tracing::warn!(error = %error, "{}", message);
    }
}

/// Make sure the destination table exists
///
/// Returns `Ok(true)` when the table is known to exist and `Ok(false)` when
/// creation failed but `bypass` allowed the sink to continue.
///
/// # Errors
///
/// Returns [`TableSinkError::Provision`] when creation fails and `bypass` is
/// false.
pub async fn ensure_table(
    client: &dyn TableClient,
    bypass: bool,
    diagnostics: &dyn DiagnosticSink,
) -> Result<bool> {
    match client.ensure_table_exists().await {
        Ok(created) => {
            tracing::debug!(table = %client.table_name(), created, "table ready");
            Ok(true)
        }
        Err(e) if bypass => {
            diagnostics.report(
                &format!(
                    "failed to create table '{}', continuing because table creation validation is bypassed",
                    client.table_name()
                ),
                &e,
            );
            Ok(false)
        }
        Err(e) => Err(TableSinkError::Provision(e)),
    }
}
