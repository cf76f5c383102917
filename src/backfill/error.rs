//! Errors raised by the tenant backfill and its companion operations.

use std::fmt;

use sea_orm::DbErr;
use thiserror::Error;

use crate::models::DomainTable;

/// The datastore operation a backfill failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillStep {
    BeginTransaction,
    EnsurePlan,
    EnsureTenant,
    ResolveTenant,
    EnsureAdminRole,
    EnsureSubscription,
    CommitTransaction,
    /// Pointing unowned rows of a table at the default tenant.
    AssignTenant(DomainTable),
    /// Clearing the tenant association during rollback.
    ClearTenant(DomainTable),
    CountUnassigned(DomainTable),
    InspectSupportRows,
}

impl fmt::Display for BackfillStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackfillStep::BeginTransaction => f.write_str("begin provisioning transaction"),
            BackfillStep::EnsurePlan => f.write_str("ensure default plan"),
            BackfillStep::EnsureTenant => f.write_str("ensure default tenant"),
            BackfillStep::ResolveTenant => f.write_str("resolve default tenant"),
            BackfillStep::EnsureAdminRole => f.write_str("ensure admin role"),
            BackfillStep::EnsureSubscription => f.write_str("ensure tenant subscription"),
            BackfillStep::CommitTransaction => f.write_str("commit provisioning transaction"),
            BackfillStep::AssignTenant(table) => write!(f, "assign tenant to {table}"),
            BackfillStep::ClearTenant(table) => write!(f, "clear tenant from {table}"),
            BackfillStep::CountUnassigned(table) => write!(f, "count unassigned {table}"),
            BackfillStep::InspectSupportRows => f.write_str("inspect support rows"),
        }
    }
}

/// Errors that abort a backfill, rollback or status run.
#[derive(Debug, Error)]
pub enum BackfillError {
    /// A datastore call failed; the run stopped at `step`.
    #[error("tenant backfill failed to {step}: {source}")]
    Database {
        step: BackfillStep,
        #[source]
        source: DbErr,
    },

    /// A support row was not found right after the step that guarantees it.
    #[error("{kind} '{key}' could not be resolved after provisioning")]
    MissingSupportRow { kind: &'static str, key: String },

    #[error("rollback refused for profile '{profile}'; pass --force to override")]
    RollbackRefused { profile: String },
}

impl BackfillError {
    /// The step a database failure happened in, if this is one.
    pub fn step(&self) -> Option<BackfillStep> {
        match self {
            BackfillError::Database { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Attach the running step to a datastore error.
pub(crate) trait StepContext<T> {
    fn at_step(self, step: BackfillStep) -> Result<T, BackfillError>;
}

impl<T> StepContext<T> for Result<T, DbErr> {
    fn at_step(self, step: BackfillStep) -> Result<T, BackfillError> {
        self.map_err(|source| BackfillError::Database { step, source })
    }
}
