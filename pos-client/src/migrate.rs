//! Schema migrations
//!
//! Schema setup is an explicit, versioned step run out-of-band (the
//! `pos-migrate` binary), never client-triggered runtime SQL. Each
//! migration is a named procedure already installed on the backend; the
//! runner applies the ones past the backend's recorded version, in order.

use std::sync::Arc;

use serde_json::json;

use shared::error::{PosError, PosResult};
use shared::response::ApiEnvelope;

use crate::http::RestClient;

/// A single versioned migration step
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: u32,
    pub procedure: &'static str,
}

/// All known migrations, in application order
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    procedure: "initialize_pos_schema_v1",
}];

/// Migrations that still need applying after `current`
fn pending_after(current: u32) -> Vec<Migration> {
    MIGRATIONS
        .iter()
        .copied()
        .filter(|m| m.version > current)
        .collect()
}

/// Applies pending schema migrations against the backend
pub struct MigrationRunner {
    client: Arc<RestClient>,
}

impl MigrationRunner {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }

    /// The schema version the backend reports
    ///
    /// A backend that predates version tracking reports 0.
    pub async fn current_version(&self) -> PosResult<u32> {
        let result: PosResult<ApiEnvelope<u32>> =
            self.client.rpc("schema_version_pos_v1", &json!({})).await;
        match result {
            Ok(envelope) => envelope.into_result(200),
            Err(PosError::NotFound { .. }) => Ok(0),
            Err(err) => Err(err),
        }
    }

    /// Apply all pending migrations in order, returning the versions applied
    pub async fn run(&self) -> PosResult<Vec<u32>> {
        let current = self.current_version().await?;
        tracing::info!(current, "backend schema version");

        let mut applied = Vec::new();
        for migration in pending_after(current) {
            let envelope: ApiEnvelope<String> = self
                .client
                .rpc(migration.procedure, &json!({}))
                .await?;
            let message = envelope.into_result(200)?;
            tracing::info!(
                version = migration.version,
                procedure = migration.procedure,
                %message,
                "applied migration"
            );
            applied.push(migration.version);
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_strictly_ordered() {
        let versions: Vec<u32> = MIGRATIONS.iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(versions, sorted, "migration versions must be strictly increasing");
        assert!(!versions.contains(&0), "version 0 means 'nothing applied'");
    }

    #[test]
    fn pending_skips_applied_versions() {
        assert_eq!(pending_after(0).len(), MIGRATIONS.len());
        let last = MIGRATIONS.last().unwrap().version;
        assert!(pending_after(last).is_empty());
    }
}
