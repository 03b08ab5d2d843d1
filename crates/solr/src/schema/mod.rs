//! Managed schema introspection and reconciliation.
//!
//! [`describe_schema`] reads the engine's current field listing and
//! [`define_schema`] diffs the desired fields against it. Under the `safe`
//! migration policy only missing fields are added: existing fields are never
//! deleted or retyped, and a desired field that disagrees with an existing
//! one is reported as a [`FieldConflict`] instead of being applied.

mod definition;
mod reconcile;

pub use definition::{FieldDefinition, FieldSpec, ObservedSchema, SchemaDefinition, SchemaField};
pub use reconcile::{
    FieldConflict, FieldDecision, SchemaCommands, SchemaPlan, SchemaReconciliation,
};

use tracing::{debug, info, warn};

use crate::config::MigrationPolicy;
use crate::core::SolrApi;
use crate::error::{AdapterResult, UpstreamError};
use crate::translate::ensure_success;

/// Reads the engine's current field definitions.
pub async fn describe_schema<C>(client: &C) -> AdapterResult<ObservedSchema>
where
    C: SolrApi + ?Sized,
{
    let body = client
        .schema_fields()
        .await
        .map_err(|e| UpstreamError::transport("describe", e))?;
    ensure_success("describe", &body)?;

    let observed = ObservedSchema::from_response(&body)?;
    debug!(fields = observed.len(), "Described managed schema");
    Ok(observed)
}

/// Reconciles the desired schema against the observed one.
///
/// Sends a single `add-field` batch when fields are missing and nothing
/// otherwise. Conflicts are logged and returned, never applied.
pub async fn define_schema<C>(
    client: &C,
    desired: &SchemaDefinition,
    observed: &ObservedSchema,
    policy: MigrationPolicy,
) -> AdapterResult<SchemaReconciliation>
where
    C: SolrApi + ?Sized,
{
    let plan = SchemaPlan::build(desired, observed, policy);
    let result = SchemaReconciliation::from_plan(&plan);

    for conflict in &result.conflicts {
        warn!(
            field = %conflict.name(),
            desired_type = %conflict.desired.field_type,
            observed_type = %conflict.observed.field_type,
            policy = %policy,
            "Schema field conflicts with engine definition; left unchanged"
        );
    }

    if let Some(commands) = plan.commands() {
        let body = client
            .update_schema(&commands)
            .await
            .map_err(|e| UpstreamError::transport("define", e))?;
        ensure_success("define", &body)?;

        info!(fields = ?result.added, "Added schema fields");
    } else {
        debug!(
            unchanged = result.unchanged.len(),
            conflicts = result.conflicts.len(),
            "Schema already up to date"
        );
    }

    Ok(result)
}
