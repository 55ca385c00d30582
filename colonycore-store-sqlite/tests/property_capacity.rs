// colonycore-store-sqlite/tests/property_capacity.rs
// ============================================================================
// Module: SQL Store Property-Based Tests
// Description: Property test driving randomized create sequences through
// the SQL-backed PersistentStore adapter, checking the housing capacity
// invariant holds after every commit or block, the way it must for the
// memory adapter (spec. 8 universal invariants).
// Purpose: Exercise the shared transaction/rules algorithm against the
// SQL adapter's own snapshot load/publish path, not just hand-picked
// scenarios.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use colonycore_core::Base;
use colonycore_core::Container;
use colonycore_core::Facility;
use colonycore_core::HousingUnit;
use colonycore_core::Organism;
use colonycore_core::OrganismStage;
use colonycore_core::PersistentStore;
use colonycore_core::RuleView;
use colonycore_core::StoreError;
use colonycore_store_sqlite::SqliteStore;
use proptest::prelude::*;

fn organism(housing_id: &str, stage: OrganismStage) -> Organism {
    Organism {
        base: Base::placeholder(),
        name: "subject".to_string(),
        species: "frog".to_string(),
        line: "wild-type".to_string(),
        stage,
        cohort_id: None,
        housing_id: Some(housing_id.to_string()),
        protocol_id: None,
        project_id: None,
        extensions: Container::new(),
    }
}

fn stage_strategy() -> impl Strategy<Value = OrganismStage> {
    prop_oneof![
        Just(OrganismStage::Planned),
        Just(OrganismStage::Juvenile),
        Just(OrganismStage::Adult),
        Just(OrganismStage::Retired),
        Just(OrganismStage::Deceased),
    ]
}

proptest! {
    /// Universal invariant (spec. 8): the count of non-terminal organisms
    /// housed in a unit never exceeds its capacity, no matter how many
    /// create attempts are interleaved with terminal-stage organisms that
    /// do not count against capacity.
    #[test]
    fn housing_capacity_holds_after_every_attempt(
        capacity in 0u64..4,
        stages in prop::collection::vec(stage_strategy(), 0..10),
    ) {
        let store = SqliteStore::open_in_memory().expect("in-memory schema initializes");

        let facility = store
            .run_in_transaction(|tx| Ok(tx.create_facility(Facility {
                base: Base::placeholder(),
                code: "F1".to_string(),
                name: "Main".to_string(),
                zone: "A".to_string(),
                access_policy: "staff".to_string(),
                extensions: Container::new(),
            })))
            .expect("facility create never blocks")
            .0;

        let housing = store
            .run_in_transaction(|tx| Ok(tx.create_housing_unit(HousingUnit {
                base: Base::placeholder(),
                name: "H1".to_string(),
                facility_id: facility.base.id.clone(),
                capacity,
                environment: "tank".to_string(),
                state: "active".to_string(),
            })))
            .expect("housing create never blocks")
            .0;

        for stage in stages {
            let _ = store.run_in_transaction(|tx| {
                tx.create_organism(organism(&housing.base.id, stage));
                Ok::<(), StoreError>(())
            });

            let non_terminal = store
                .view(|view| {
                    Ok(view
                        .as_rule_view()
                        .list_organisms()
                        .into_iter()
                        .filter(|o| o.housing_id.as_deref() == Some(housing.base.id.as_str()) && !o.stage.is_terminal())
                        .count())
                })
                .expect("view never fails");

            prop_assert!(u64::try_from(non_terminal).unwrap_or(u64::MAX) <= capacity);
        }
    }
}
