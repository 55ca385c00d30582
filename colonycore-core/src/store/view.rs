// colonycore-core/src/store/view.rs
// ============================================================================
// Module: Read-Only Views
// Description: The RuleView trait rules evaluate against, and the
// TransactionView type passed to View(ctx, fn) callers.
// Purpose: Expose List*/Find* accessors for every entity kind without
// granting write access.
// ============================================================================

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
use crate::store::snapshot::Snapshot;

/// Declares a pair of `list_*`/`find_*` accessors for one entity field on
/// [`RuleView`], plus the matching impl on [`Snapshot`].
macro_rules! view_accessors {
    ($($list:ident, $find:ident, $field:ident, $ty:ty),+ $(,)?) => {
        /// Read-only view over every entity kind, passed to rules and to
        /// `View(ctx, fn)` callers. All entities returned are deep clones;
        /// mutating them has no effect on stored state.
        pub trait RuleView {
            $(
                #[doc = concat!("Returns every ", stringify!($ty), ", in id order.")]
                fn $list(&self) -> Vec<$ty>;

                #[doc = concat!("Finds a single ", stringify!($ty), " by id.")]
                fn $find(&self, id: &str) -> Option<$ty>;
            )+
        }

        impl RuleView for Snapshot {
            $(
                fn $list(&self) -> Vec<$ty> {
                    self.$field.values().cloned().collect()
                }

                fn $find(&self, id: &str) -> Option<$ty> {
                    self.$field.get(id).cloned()
                }
            )+
        }
    };
}

view_accessors! {
    list_facilities, find_facility, facilities, Facility,
    list_housing_units, find_housing_unit, housing_units, HousingUnit,
    list_organisms, find_organism, organisms, Organism,
    list_cohorts, find_cohort, cohorts, Cohort,
    list_breeding_units, find_breeding_unit, breeding_units, BreedingUnit,
    list_procedures, find_procedure, procedures, Procedure,
    list_treatments, find_treatment, treatments, Treatment,
    list_observations, find_observation, observations, Observation,
    list_samples, find_sample, samples, Sample,
    list_protocols, find_protocol, protocols, Protocol,
    list_permits, find_permit, permits, Permit,
    list_projects, find_project, projects, Project,
    list_supply_items, find_supply_item, supply_items, SupplyItem,
    list_lines, find_line, lines, Line,
    list_strains, find_strain, strains, Strain,
    list_genotype_markers, find_genotype_marker, genotype_markers, GenotypeMarker,
}

/// A read-only handle on a snapshot, passed to `View(ctx, fn)` callers.
///
/// Distinct from [`RuleView`] only in that it is the caller-facing name;
/// both are backed by the same [`Snapshot`] and offer the same accessors.
pub struct TransactionView<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> TransactionView<'a> {
    /// Wraps a snapshot reference for read-only use.
    #[must_use]
    pub const fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Returns the underlying [`RuleView`] accessor surface.
    #[must_use]
    pub const fn as_rule_view(&self) -> &Snapshot {
        self.snapshot
    }
}
