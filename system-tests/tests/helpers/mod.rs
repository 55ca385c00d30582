// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared entity builders and store fixtures for ColonyCore
// system-test suites.
// Purpose: Keep each suite focused on the scenario it exercises instead of
// re-deriving fixture entities.
// Dependencies: colonycore-core, colonycore-store-sqlite
// ============================================================================

#![allow(dead_code, reason = "shared helpers are reused across multiple test suites, never all by one")]

use colonycore_core::Base;
use colonycore_core::Container;
use colonycore_core::Facility;
use colonycore_core::HousingUnit;
use colonycore_core::Organism;
use colonycore_core::OrganismStage;
use colonycore_core::Project;
use colonycore_core::SupplyItem;

/// Builds an unsaved facility with the given code, ready for `create_facility`.
pub fn facility(code: &str) -> Facility {
    Facility {
        base: Base::placeholder(),
        code: code.to_string(),
        name: format!("Facility {code}"),
        zone: "A".to_string(),
        access_policy: "staff-only".to_string(),
        extensions: Container::new(),
    }
}

/// Builds an unsaved housing unit owned by `facility_id`.
pub fn housing_unit(name: &str, facility_id: &str, capacity: u64) -> HousingUnit {
    HousingUnit {
        base: Base::placeholder(),
        name: name.to_string(),
        facility_id: facility_id.to_string(),
        capacity,
        environment: "terrarium".to_string(),
        state: "active".to_string(),
    }
}

/// Builds an unsaved organism housed in `housing_id` at the given stage.
pub fn organism(name: &str, housing_id: &str, stage: OrganismStage) -> Organism {
    Organism {
        base: Base::placeholder(),
        name: name.to_string(),
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

/// Builds an unsaved project with the given code and no references yet.
pub fn project(code: &str) -> Project {
    Project {
        base: Base::placeholder(),
        code: code.to_string(),
        title: format!("Project {code}"),
        facility_ids: Vec::new(),
        protocol_ids: Vec::new(),
        organism_ids: Vec::new(),
        procedure_ids: Vec::new(),
        supply_item_ids: Vec::new(),
    }
}

/// Builds an unsaved supply item referencing `project_ids`.
pub fn supply_item(sku: &str, project_ids: Vec<String>) -> SupplyItem {
    SupplyItem {
        base: Base::placeholder(),
        sku: sku.to_string(),
        name: format!("Item {sku}"),
        quantity_on_hand: 10,
        unit: "box".to_string(),
        facility_ids: Vec::new(),
        project_ids,
        reorder_level: 2,
        extensions: Container::new(),
    }
}
