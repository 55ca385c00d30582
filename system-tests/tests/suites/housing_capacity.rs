// system-tests/tests/suites/housing_capacity.rs
// ============================================================================
// Suite: Housing Capacity
// Description: A housing unit at capacity blocks a second non-terminal
// occupant but still accepts the first.
// ============================================================================

use colonycore_core::MemoryStore;
use colonycore_core::PersistentStore;
use colonycore_core::RuleView;
use colonycore_core::StoreError;

use crate::helpers;

#[test]
fn second_occupant_over_capacity_is_blocked() {
    let store = MemoryStore::new();

    let (facility, _) =
        store.run_in_transaction(|tx| Ok(tx.create_facility(helpers::facility("F1")))).expect("facility created");
    let (housing, _) = store
        .run_in_transaction(|tx| Ok(tx.create_housing_unit(helpers::housing_unit("H1", &facility.base.id, 1))))
        .expect("housing created");

    let (organism_one, _) = store
        .run_in_transaction(|tx| {
            Ok(tx.create_organism(helpers::organism("O1", &housing.base.id, colonycore_core::OrganismStage::Adult)))
        })
        .expect("first occupant fits the unit's capacity");
    assert_eq!(organism_one.housing_id.as_deref(), Some(housing.base.id.as_str()));

    let blocked = store.run_in_transaction(|tx| {
        Ok(tx.create_organism(helpers::organism("O2", &housing.base.id, colonycore_core::OrganismStage::Adult)))
    });

    let Err(StoreError::RuleViolation(outcome)) = blocked else {
        panic!("expected a rule violation, got {blocked:?}");
    };
    assert!(outcome.has_blocking());
    let violation = outcome.violations.iter().find(|v| v.rule == "housing.capacity").expect("housing.capacity violation present");
    assert_eq!(violation.entity_id, housing.base.id);

    let occupant_count =
        store.view(|view| Ok(view.as_rule_view().list_organisms().len())).expect("view succeeds after the block");
    assert_eq!(occupant_count, 1, "the blocked transaction must not have been published");
}

#[test]
fn terminal_stage_occupants_do_not_count_against_capacity() {
    let store = MemoryStore::new();
    let (facility, _) =
        store.run_in_transaction(|tx| Ok(tx.create_facility(helpers::facility("F1")))).expect("facility created");
    let (housing, _) = store
        .run_in_transaction(|tx| Ok(tx.create_housing_unit(helpers::housing_unit("H1", &facility.base.id, 1))))
        .expect("housing created");

    store
        .run_in_transaction(|tx| {
            Ok(tx.create_organism(helpers::organism("O1", &housing.base.id, colonycore_core::OrganismStage::Deceased)))
        })
        .expect("a deceased occupant does not occupy a capacity slot");

    store
        .run_in_transaction(|tx| {
            Ok(tx.create_organism(helpers::organism("O2", &housing.base.id, colonycore_core::OrganismStage::Adult)))
        })
        .expect("the unit still has room for a living occupant");
}
