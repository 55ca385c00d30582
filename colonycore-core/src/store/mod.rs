// colonycore-core/src/store/mod.rs
// ============================================================================
// Module: Persistent Store Contract
// Description: The transaction manager, change journal, snapshot, and
// read-only view types shared by every store adapter.
// Purpose: Let the memory and SQL adapters reuse one transaction/rules
// algorithm, guaranteeing behaviorally identical results.
// Dependencies: crate::{entities, rules}
// ============================================================================

//! ## Overview
//! [`PersistentStore::run_in_transaction`] is the sole write entry point.
//! Implementations build a working [`Snapshot`], hand the caller a
//! [`Transaction`] over it, then evaluate the rules engine against the
//! resulting state before committing or discarding it. The memory adapter
//! (`MemoryStore`, below) and the SQL adapter
//! (`colonycore_store_sqlite::SqliteStore`) both drive this same algorithm;
//! only snapshot load/publish differs between them.

pub mod journal;
pub mod memory;
pub mod snapshot;
pub mod transaction;
pub mod view;

use thiserror::Error;

use crate::entities::EntityError;
use crate::entities::EntityKind;
use crate::rules::RuleError;
use crate::rules::RuleOutcome;

pub use journal::Action;
pub use journal::ChangeRecord;
pub use memory::MemoryStore;
pub use snapshot::Snapshot;
pub use transaction::Transaction;
pub use view::RuleView;
pub use view::TransactionView;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the transaction manager and its store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entity of the given kind and id was found.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind searched for.
        kind: EntityKind,
        /// Identifier searched for.
        id: String,
    },
    /// A blocking rule violation aborted the transaction.
    #[error("transaction blocked by {} rule violation(s)", .0.violations.len())]
    RuleViolation(RuleOutcome),
    /// A rule itself reported an internal failure.
    #[error(transparent)]
    Rule(#[from] RuleError),
    /// An entity failed validation during encode/decode.
    #[error(transparent)]
    Entity(#[from] EntityError),
    /// The backing adapter failed (SQL connection, I/O, etc).
    #[error("store backend error: {0}")]
    Backend(String),
}

// ============================================================================
// SECTION: Persistent Store Trait
// ============================================================================

/// The contract every store adapter (memory, SQL) must satisfy.
///
/// # Invariants
/// - `run_in_transaction` either commits every change made by `body` or
///   none of them (atomicity on rule-violation or backend failure).
/// - `view`'s snapshot is never interleaved with a partially-applied write.
pub trait PersistentStore {
    /// Runs `body` against a fresh working transaction, evaluates the rules
    /// engine against the result, and commits only if no violation is
    /// blocking.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RuleViolation`] if a blocking violation is
    /// raised, or whatever error `body` itself returns (propagated without
    /// committing).
    fn run_in_transaction<F, R>(&self, body: F) -> Result<(R, RuleOutcome), StoreError>
    where
        F: FnOnce(&mut Transaction) -> Result<R, StoreError>;

    /// Runs `body` against a read-only view of the current committed state.
    ///
    /// # Errors
    ///
    /// Returns whatever error `body` itself returns.
    fn view<F, R>(&self, body: F) -> Result<R, StoreError>
    where
        F: FnOnce(&TransactionView<'_>) -> Result<R, StoreError>;
}
