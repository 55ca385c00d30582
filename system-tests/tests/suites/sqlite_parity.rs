// system-tests/tests/suites/sqlite_parity.rs
// ============================================================================
// Suite: SQLite Parity
// Description: The SQL-backed adapter enforces the same rules, and blocks
// the same way, as the in-memory reference adapter.
// ============================================================================

use colonycore_core::PersistentStore;
use colonycore_core::RuleView;
use colonycore_core::StoreError;
use colonycore_store_sqlite::SqliteStore;
use colonycore_store_sqlite::SqliteStoreConfig;

use crate::helpers;

#[test]
fn housing_capacity_blocks_the_same_way_as_the_memory_store() {
    let store = SqliteStore::open_in_memory().expect("in-memory sqlite store opens");

    let (facility, _) =
        store.run_in_transaction(|tx| Ok(tx.create_facility(helpers::facility("F1")))).expect("facility created");
    let (housing, _) = store
        .run_in_transaction(|tx| Ok(tx.create_housing_unit(helpers::housing_unit("H1", &facility.base.id, 1))))
        .expect("housing created");
    store
        .run_in_transaction(|tx| {
            Ok(tx.create_organism(helpers::organism("O1", &housing.base.id, colonycore_core::OrganismStage::Adult)))
        })
        .expect("first occupant fits");

    let blocked = store.run_in_transaction(|tx| {
        Ok(tx.create_organism(helpers::organism("O2", &housing.base.id, colonycore_core::OrganismStage::Adult)))
    });
    let Err(StoreError::RuleViolation(outcome)) = blocked else {
        panic!("expected a rule violation, got {blocked:?}");
    };
    assert!(outcome.violations.iter().any(|v| v.rule == "housing.capacity"));

    let occupant_count =
        store.view(|view| Ok(view.as_rule_view().list_organisms().len())).expect("view succeeds");
    assert_eq!(occupant_count, 1, "the backing table must not reflect the blocked transaction");
}

#[test]
fn a_file_backed_store_survives_reopening() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("colonycore.sqlite3");

    {
        let store = SqliteStore::open(SqliteStoreConfig::new(&path)).expect("store opens");
        store
            .run_in_transaction(|tx| Ok(tx.create_facility(helpers::facility("F1"))))
            .expect("facility created");
    }

    let reopened = SqliteStore::open(SqliteStoreConfig::new(&path)).expect("store reopens");
    let count = reopened.view(|view| Ok(view.as_rule_view().list_facilities().len())).expect("view succeeds");
    assert_eq!(count, 1, "the facility committed before closing must still be on disk");
}
