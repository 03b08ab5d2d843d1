//! Desired-versus-observed schema reconciliation.

use serde::Serialize;
use serde_json::Value;

use crate::config::MigrationPolicy;

use super::definition::{ObservedSchema, SchemaDefinition, SchemaField};

/// The decision taken for one desired field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDecision {
    /// The field does not exist yet and will be added.
    Add(SchemaField),
    /// The field exists with a matching definition.
    Unchanged(String),
    /// The field exists with a different definition and is left alone.
    Conflict(FieldConflict),
}

/// A desired field whose definition disagrees with the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConflict {
    /// What the configuration asks for.
    pub desired: SchemaField,
    /// What the engine currently has.
    pub observed: SchemaField,
}

impl FieldConflict {
    /// Returns the conflicting field's name.
    pub fn name(&self) -> &str {
        &self.desired.name
    }
}

/// Per-field decisions for one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaPlan {
    /// Decisions in desired-field order.
    pub decisions: Vec<FieldDecision>,
}

impl SchemaPlan {
    /// Diffs the desired schema against the observed one.
    ///
    /// Observed fields that are not desired are never touched.
    pub fn build(
        desired: &SchemaDefinition,
        observed: &ObservedSchema,
        policy: MigrationPolicy,
    ) -> Self {
        let decisions = desired
            .fields()
            .into_iter()
            .map(|field| match (policy, observed.get(&field.name)) {
                (MigrationPolicy::Safe, None) => FieldDecision::Add(field),
                (MigrationPolicy::Safe, Some(existing)) if field.matches(existing) => {
                    FieldDecision::Unchanged(field.name)
                }
                (MigrationPolicy::Safe, Some(existing)) => FieldDecision::Conflict(FieldConflict {
                    desired: field,
                    observed: existing.clone(),
                }),
            })
            .collect();
        Self { decisions }
    }

    /// Fields to add.
    pub fn additions(&self) -> impl Iterator<Item = &SchemaField> {
        self.decisions.iter().filter_map(|decision| match decision {
            FieldDecision::Add(field) => Some(field),
            _ => None,
        })
    }

    /// Fields left unresolved.
    pub fn conflicts(&self) -> impl Iterator<Item = &FieldConflict> {
        self.decisions.iter().filter_map(|decision| match decision {
            FieldDecision::Conflict(conflict) => Some(conflict),
            _ => None,
        })
    }

    /// Fields already in place.
    pub fn unchanged(&self) -> impl Iterator<Item = &str> {
        self.decisions.iter().filter_map(|decision| match decision {
            FieldDecision::Unchanged(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Builds the engine command batch, or `None` when nothing needs sending.
    pub fn commands(&self) -> Option<SchemaCommands> {
        let add_field: Vec<Value> = self.additions().map(SchemaField::to_native).collect();
        if add_field.is_empty() {
            None
        } else {
            Some(SchemaCommands { add_field })
        }
    }
}

/// A batch of engine schema commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaCommands {
    /// Fields to create.
    #[serde(rename = "add-field")]
    pub add_field: Vec<Value>,
}

/// Outcome of a `define` run, kept for observability.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaReconciliation {
    /// Fields sent to the engine.
    pub added: Vec<String>,
    /// Fields that already matched.
    pub unchanged: Vec<String>,
    /// Fields whose definitions disagree with the engine.
    pub conflicts: Vec<FieldConflict>,
}

impl SchemaReconciliation {
    /// Summarizes a plan.
    pub fn from_plan(plan: &SchemaPlan) -> Self {
        Self {
            added: plan.additions().map(|field| field.name.clone()).collect(),
            unchanged: plan.unchanged().map(str::to_string).collect(),
            conflicts: plan.conflicts().cloned().collect(),
        }
    }

    /// Returns true if every desired field is in place.
    pub fn is_converged(&self) -> bool {
        self.conflicts.is_empty()
    }
}
