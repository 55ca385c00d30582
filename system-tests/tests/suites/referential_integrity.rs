// system-tests/tests/suites/referential_integrity.rs
// ============================================================================
// Suite: Referential Integrity & Delete Protection
// Description: Dangling references are blocked at create time; deletes of
// entities still referenced elsewhere are blocked too.
// ============================================================================

use colonycore_core::MemoryStore;
use colonycore_core::PersistentStore;
use colonycore_core::RuleView;
use colonycore_core::StoreError;

use crate::helpers;

#[test]
fn housing_unit_with_unknown_facility_is_blocked() {
    let store = MemoryStore::new();
    let blocked =
        store.run_in_transaction(|tx| Ok(tx.create_housing_unit(helpers::housing_unit("H1", "no-such-facility", 4))));
    let Err(StoreError::RuleViolation(outcome)) = blocked else {
        panic!("expected a rule violation, got {blocked:?}");
    };
    assert!(outcome.violations.iter().any(|v| v.rule == "refint.reference"));
}

#[test]
fn deleting_a_project_referenced_by_a_supply_item_is_blocked() {
    let store = MemoryStore::new();
    let (project, _) =
        store.run_in_transaction(|tx| Ok(tx.create_project(helpers::project("P1")))).expect("project created");
    store
        .run_in_transaction(|tx| Ok(tx.create_supply_item(helpers::supply_item("S1", vec![project.base.id.clone()]))))
        .expect("supply item created referencing the project");

    let blocked = store.run_in_transaction(|tx| tx.delete_project(&project.base.id));
    let Err(StoreError::RuleViolation(outcome)) = blocked else {
        panic!("expected a rule violation, got {blocked:?}");
    };
    let violation = outcome.violations.iter().find(|v| v.rule == "refint.project").expect("refint.project violation present");
    assert_eq!(violation.entity_id, project.base.id);

    let still_present =
        store.view(|view| Ok(view.as_rule_view().list_projects().iter().any(|p| p.base.id == project.base.id))).expect("view succeeds");
    assert!(still_present, "the blocked delete must not have been published");
}

#[test]
fn deleting_the_supply_item_first_then_the_project_succeeds() {
    let store = MemoryStore::new();
    let (project, _) =
        store.run_in_transaction(|tx| Ok(tx.create_project(helpers::project("P1")))).expect("project created");
    let (item, _) = store
        .run_in_transaction(|tx| Ok(tx.create_supply_item(helpers::supply_item("S1", vec![project.base.id.clone()]))))
        .expect("supply item created");

    store.run_in_transaction(|tx| tx.delete_supply_item(&item.base.id)).expect("supply item deletes cleanly");
    store.run_in_transaction(|tx| tx.delete_project(&project.base.id)).expect("project now deletes cleanly");
}

#[test]
fn organism_stage_cannot_leave_a_terminal_stage() {
    use colonycore_core::OrganismStage;

    let store = MemoryStore::new();
    let (facility, _) =
        store.run_in_transaction(|tx| Ok(tx.create_facility(helpers::facility("F1")))).expect("facility created");
    let (housing, _) = store
        .run_in_transaction(|tx| Ok(tx.create_housing_unit(helpers::housing_unit("H1", &facility.base.id, 4))))
        .expect("housing created");
    let (organism, _) = store
        .run_in_transaction(|tx| Ok(tx.create_organism(helpers::organism("O1", &housing.base.id, OrganismStage::Retired))))
        .expect("organism created retired");

    let blocked = store.run_in_transaction(|tx| {
        tx.update_organism(&organism.base.id, |organism| organism.stage = OrganismStage::Adult)
    });
    let Err(StoreError::RuleViolation(outcome)) = blocked else {
        panic!("expected a rule violation, got {blocked:?}");
    };
    assert!(outcome.violations.iter().any(|v| v.rule == "organism.stage_monotonic"));
}
