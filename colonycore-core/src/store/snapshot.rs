// colonycore-core/src/store/snapshot.rs
// ============================================================================
// Module: Snapshot
// Description: One indexed map per entity type, the unit of copy-on-write
// publication for both store adapters.
// Purpose: Give the transaction manager and both adapters a single shared
// representation of "the store's state at a point in time".
// ============================================================================

use std::collections::BTreeMap;

use crate::entities::BreedingUnit;
use crate::entities::Cohort;
use crate::entities::Facility;
use crate::entities::GenotypeMarker;
use crate::entities::HousingUnit;
use crate::entities::Line;
use crate::entities::Observation;
use crate::entities::Organism;
use crate::entities::Permit;
use crate::entities::Procedure;
use crate::entities::Project;
use crate::entities::Protocol;
use crate::entities::Sample;
use crate::entities::Strain;
use crate::entities::SupplyItem;
use crate::entities::Treatment;

/// One indexed map per entity type, keyed by entity id.
///
/// A `Snapshot` is the unit of copy-on-write publication: the memory
/// adapter replaces its live snapshot wholesale under its write lock on
/// commit; the SQL adapter loads one per transaction from the backing rows.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Facility rows.
    pub facilities: BTreeMap<String, Facility>,
    /// HousingUnit rows.
    pub housing_units: BTreeMap<String, HousingUnit>,
    /// Organism rows.
    pub organisms: BTreeMap<String, Organism>,
    /// Cohort rows.
    pub cohorts: BTreeMap<String, Cohort>,
    /// BreedingUnit rows.
    pub breeding_units: BTreeMap<String, BreedingUnit>,
    /// Procedure rows.
    pub procedures: BTreeMap<String, Procedure>,
    /// Treatment rows.
    pub treatments: BTreeMap<String, Treatment>,
    /// Observation rows.
    pub observations: BTreeMap<String, Observation>,
    /// Sample rows.
    pub samples: BTreeMap<String, Sample>,
    /// Protocol rows.
    pub protocols: BTreeMap<String, Protocol>,
    /// Permit rows.
    pub permits: BTreeMap<String, Permit>,
    /// Project rows.
    pub projects: BTreeMap<String, Project>,
    /// SupplyItem rows.
    pub supply_items: BTreeMap<String, SupplyItem>,
    /// Line rows.
    pub lines: BTreeMap<String, Line>,
    /// Strain rows.
    pub strains: BTreeMap<String, Strain>,
    /// GenotypeMarker rows.
    pub genotype_markers: BTreeMap<String, GenotypeMarker>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
