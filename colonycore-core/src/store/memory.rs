// colonycore-core/src/store/memory.rs
// ============================================================================
// Module: Memory Store Adapter
// Description: The in-memory, copy-on-write reference implementation of
// PersistentStore.
// Purpose: Give the transaction manager algorithm a dependency-free adapter
// that is behaviorally identical to the SQL adapter.
// Dependencies: crate::{rules, store}
// ============================================================================

//! ## Overview
//! [`MemoryStore`] holds one live [`Snapshot`] behind a `RwLock`, replaced
//! wholesale under the write lock on commit (readers who already hold a
//! clone from [`MemoryStore::read_snapshot`] keep seeing their own
//! point-in-time view). Writes are serialized through a `Mutex<()>` write
//! lease so concurrent [`PersistentStore::run_in_transaction`] callers queue
//! FIFO.

use std::sync::Mutex;
use std::sync::RwLock;

use crate::rules::RuleRegistry;
use crate::store::PersistentStore;
use crate::store::StoreError;
use crate::store::Transaction;
use crate::store::TransactionView;
use crate::store::snapshot::Snapshot;

/// The in-memory reference [`PersistentStore`] adapter.
pub struct MemoryStore {
    /// The currently committed snapshot, read by `View` and by new
    /// transactions as their starting point.
    live: RwLock<Snapshot>,
    /// Serializes writers FIFO; holding this lock is "the write lease".
    write_lease: Mutex<()>,
    /// Rules evaluated against every transaction's working view at commit.
    rules: RuleRegistry,
}

impl MemoryStore {
    /// Creates an empty store using the required built-in rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(RuleRegistry::with_builtins())
    }

    /// Creates an empty store with a caller-supplied rule registry (used by
    /// the Plugin Installation Surface to append plugin rules after the
    /// built-ins).
    #[must_use]
    pub fn with_rules(rules: RuleRegistry) -> Self {
        Self { live: RwLock::new(Snapshot::new()), write_lease: Mutex::new(()), rules }
    }

    /// Returns a deep clone of the live, committed snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the internal lock was poisoned by
    /// a panicking holder (an internal invariant break, not caller error).
    fn read_snapshot(&self) -> Result<Snapshot, StoreError> {
        self.live.read().map(|guard| guard.clone()).map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentStore for MemoryStore {
    fn run_in_transaction<F, R>(&self, body: F) -> Result<(R, crate::rules::RuleOutcome), StoreError>
    where
        F: FnOnce(&mut Transaction) -> Result<R, StoreError>,
    {
        let _lease = self.write_lease.lock().map_err(|_| StoreError::Backend("memory store write lease poisoned".to_string()))?;
        let starting_snapshot = self.read_snapshot()?;
        let mut transaction = Transaction::new(starting_snapshot);
        let result = body(&mut transaction)?;
        let (working_snapshot, journal) = transaction.into_parts();
        let outcome = self.rules.evaluate_all(&working_snapshot, &journal)?;
        if outcome.has_blocking() {
            return Err(StoreError::RuleViolation(outcome));
        }
        let mut guard = self.live.write().map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))?;
        *guard = working_snapshot;
        drop(guard);
        Ok((result, outcome))
    }

    fn view<F, R>(&self, body: F) -> Result<R, StoreError>
    where
        F: FnOnce(&TransactionView<'_>) -> Result<R, StoreError>,
    {
        let guard = self.live.read().map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))?;
        let view = TransactionView::new(&guard);
        body(&view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Facility;
    use crate::entities::HousingUnit;
    use crate::entities::Organism;
    use crate::entities::OrganismStage;
    use crate::extension::Container;
    use crate::store::RuleView;

    fn new_facility() -> Facility {
        Facility { base: crate::entities::Base::placeholder(), code: "F1".to_string(), name: "Main".to_string(), zone: "A".to_string(), access_policy: "staff".to_string(), extensions: Container::new() }
    }

    #[test]
    fn commit_publishes_atomically_and_rolls_back_on_rule_violation() {
        let store = MemoryStore::new();
        let (facility, _) = store.run_in_transaction(|tx| Ok(tx.create_facility(new_facility()))).expect("facility create succeeds");

        let housing = HousingUnit { base: crate::entities::Base::placeholder(), name: "H1".to_string(), facility_id: facility.base.id.clone(), capacity: 1, environment: "tank".to_string(), state: "active".to_string() };
        let (housing, _) = store.run_in_transaction(|tx| Ok(tx.create_housing_unit(housing))).expect("housing create succeeds");

        let organism = |suffix: &str| Organism {
            base: crate::entities::Base::placeholder(),
            name: format!("O{suffix}"),
            species: "frog".to_string(),
            line: "wild-type".to_string(),
            stage: OrganismStage::Adult,
            cohort_id: None,
            housing_id: Some(housing.base.id.clone()),
            protocol_id: None,
            project_id: None,
            extensions: Container::new(),
        };

        store.run_in_transaction(|tx| Ok(tx.create_organism(organism("1")))).expect("first occupant fits capacity");

        let before_count = store.view(|view| Ok(view.as_rule_view().list_organisms().len())).expect("view succeeds");

        let blocked = store.run_in_transaction(|tx| Ok(tx.create_organism(organism("2"))));
        assert!(matches!(blocked, Err(StoreError::RuleViolation(_))));

        let after_count = store.view(|view| Ok(view.as_rule_view().list_organisms().len())).expect("view succeeds");
        assert_eq!(before_count, after_count, "blocked transaction must not change committed state");
    }

    #[test]
    fn readers_see_consistent_snapshot_never_partial() {
        let store = MemoryStore::new();
        store.run_in_transaction(|tx| Ok(tx.create_facility(new_facility()))).expect("facility create succeeds");
        let count = store.view(|view| Ok(view.as_rule_view().list_facilities().len())).expect("view succeeds");
        assert_eq!(count, 1);
    }
}
