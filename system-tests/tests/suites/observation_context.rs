// system-tests/tests/suites/observation_context.rs
// ============================================================================
// Suite: Observation Context
// Description: An observation must set exactly one of
// procedure_id/organism_id/cohort_id.
// ============================================================================

use colonycore_core::Base;
use colonycore_core::Container;
use colonycore_core::MemoryStore;
use colonycore_core::Observation;
use colonycore_core::PersistentStore;
use colonycore_core::StoreError;

use crate::helpers;

fn contextless_observation() -> Observation {
    Observation {
        base: Base::placeholder(),
        recorded_at: colonycore_core::Timestamp::now(),
        observer: "alice".to_string(),
        procedure_id: None,
        organism_id: None,
        cohort_id: None,
        extensions: Container::new(),
    }
}

#[test]
fn observation_with_no_context_is_blocked() {
    let store = MemoryStore::new();
    let blocked = store.run_in_transaction(|tx| Ok(tx.create_observation(contextless_observation())));
    let Err(StoreError::RuleViolation(outcome)) = blocked else {
        panic!("expected a rule violation, got {blocked:?}");
    };
    assert!(outcome.violations.iter().any(|v| v.rule == "observation.context"));
}

#[test]
fn observation_with_exactly_one_context_commits() {
    let store = MemoryStore::new();
    let (facility, _) =
        store.run_in_transaction(|tx| Ok(tx.create_facility(helpers::facility("F1")))).expect("facility created");
    let (housing, _) = store
        .run_in_transaction(|tx| Ok(tx.create_housing_unit(helpers::housing_unit("H1", &facility.base.id, 4))))
        .expect("housing created");
    let (organism, _) = store
        .run_in_transaction(|tx| {
            Ok(tx.create_organism(helpers::organism("O1", &housing.base.id, colonycore_core::OrganismStage::Adult)))
        })
        .expect("organism created");

    let mut observation = contextless_observation();
    observation.organism_id = Some(organism.base.id);

    store.run_in_transaction(|tx| Ok(tx.create_observation(observation))).expect("single-context observation commits");
}
