// colonycore-core/src/store/transaction.rs
// ============================================================================
// Module: Transaction
// Description: Per-entity Create/Update/Delete over a working snapshot, with
// a change journal the rules engine consumes at commit.
// Purpose: The sole mutation surface handed to `RunInTransaction` closures.
// ============================================================================

use uuid::Uuid;

use crate::entities::AnyEntity;
use crate::entities::BreedingUnit;
use crate::entities::Cohort;
use crate::entities::EntityKind;
use crate::entities::Facility;
use crate::entities::GenotypeMarker;
use crate::entities::HasBase;
use crate::entities::HousingUnit;
use crate::entities::Line;
use crate::entities::NormalizeIdLists;
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
use crate::store::StoreError;
use crate::store::journal::ChangeRecord;
use crate::store::snapshot::Snapshot;
use crate::timestamp::Timestamp;

// ============================================================================
// SECTION: Generic Operation Helpers
// ============================================================================

/// Stamps a fresh id (if absent) and `created_at`/`updated_at`, normalizes
/// id-list fields, inserts into `map`, and appends a create record to
/// `journal`.
fn do_create<T>(map: &mut std::collections::BTreeMap<String, T>, journal: &mut Vec<ChangeRecord>, mut entity: T) -> T
where
    T: HasBase + NormalizeIdLists + Clone,
    AnyEntity: From<T>,
{
    let now = Timestamp::now();
    entity.normalize_id_lists();
    {
        let base = entity.base_mut();
        if base.id.is_empty() {
            base.id = Uuid::new_v4().to_string();
        }
        base.created_at = now;
        base.updated_at = now;
    }
    map.insert(entity.base().id.clone(), entity.clone());
    journal.push(ChangeRecord::created(AnyEntity::from(entity.clone())));
    entity
}

/// Applies `mutator` to a clone of the stored entity, normalizes id-list
/// fields, advances `updated_at` only if the mutation changed the entity,
/// and appends an update record.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] when `id` has no stored entity.
fn do_update<T>(
    map: &mut std::collections::BTreeMap<String, T>,
    journal: &mut Vec<ChangeRecord>,
    kind: EntityKind,
    id: &str,
    mutator: impl FnOnce(&mut T),
) -> Result<T, StoreError>
where
    T: HasBase + NormalizeIdLists + Clone + PartialEq,
    AnyEntity: From<T>,
{
    let before = map.get(id).cloned().ok_or_else(|| StoreError::NotFound { kind, id: id.to_string() })?;
    let mut after = before.clone();
    mutator(&mut after);
    after.normalize_id_lists();
    if after != before {
        after.base_mut().updated_at = Timestamp::now();
    }
    map.insert(id.to_string(), after.clone());
    journal.push(ChangeRecord::updated(AnyEntity::from(before), AnyEntity::from(after.clone())));
    Ok(after)
}

/// Removes the stored entity and appends a delete record.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] when `id` has no stored entity.
fn do_delete<T>(map: &mut std::collections::BTreeMap<String, T>, journal: &mut Vec<ChangeRecord>, kind: EntityKind, id: &str) -> Result<T, StoreError>
where
    T: HasBase + Clone,
    AnyEntity: From<T>,
{
    let removed = map.remove(id).ok_or_else(|| StoreError::NotFound { kind, id: id.to_string() })?;
    journal.push(ChangeRecord::deleted(AnyEntity::from(removed.clone())));
    Ok(removed)
}

// ============================================================================
// SECTION: Transaction
// ============================================================================

/// A lease+snapshot+journal scope handed to `RunInTransaction` closures.
///
/// All mutation goes through this type's per-entity methods; reads go
/// through [`Transaction::snapshot`], which implements
/// [`crate::store::RuleView`].
pub struct Transaction {
    snapshot: Snapshot,
    journal: Vec<ChangeRecord>,
}

impl Transaction {
    /// Opens a working transaction over a cloned snapshot.
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot, journal: Vec::new() }
    }

    /// Returns the working snapshot, usable as a [`crate::store::RuleView`].
    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Consumes the transaction, returning the final working snapshot and
    /// its accumulated journal.
    #[must_use]
    pub fn into_parts(self) -> (Snapshot, Vec<ChangeRecord>) {
        (self.snapshot, self.journal)
    }

    /// Returns the change journal accumulated so far.
    #[must_use]
    pub fn journal(&self) -> &[ChangeRecord] {
        &self.journal
    }
}

/// Declares `create_*`/`update_*`/`delete_*` methods on [`Transaction`] for
/// one entity kind.
macro_rules! entity_ops {
    ($create:ident, $update:ident, $delete:ident, $field:ident, $kind:expr, $ty:ty) => {
        impl Transaction {
            #[doc = concat!("Creates a new ", stringify!($ty), ", assigning an id if absent.")]
            pub fn $create(&mut self, entity: $ty) -> $ty {
                do_create(&mut self.snapshot.$field, &mut self.journal, entity)
            }

            #[doc = concat!("Updates an existing ", stringify!($ty), " by id.")]
            ///
            /// # Errors
            ///
            /// Returns [`StoreError::NotFound`] when `id` does not resolve.
            pub fn $update(&mut self, id: &str, mutator: impl FnOnce(&mut $ty)) -> Result<$ty, StoreError> {
                do_update(&mut self.snapshot.$field, &mut self.journal, $kind, id, mutator)
            }

            #[doc = concat!("Deletes an existing ", stringify!($ty), " by id.")]
            ///
            /// # Errors
            ///
            /// Returns [`StoreError::NotFound`] when `id` does not resolve.
            pub fn $delete(&mut self, id: &str) -> Result<$ty, StoreError> {
                do_delete(&mut self.snapshot.$field, &mut self.journal, $kind, id)
            }
        }
    };
}

entity_ops!(create_facility, update_facility, delete_facility, facilities, EntityKind::Facility, Facility);
entity_ops!(create_housing_unit, update_housing_unit, delete_housing_unit, housing_units, EntityKind::HousingUnit, HousingUnit);
entity_ops!(create_organism, update_organism, delete_organism, organisms, EntityKind::Organism, Organism);
entity_ops!(create_cohort, update_cohort, delete_cohort, cohorts, EntityKind::Cohort, Cohort);
entity_ops!(create_breeding_unit, update_breeding_unit, delete_breeding_unit, breeding_units, EntityKind::BreedingUnit, BreedingUnit);
entity_ops!(create_procedure, update_procedure, delete_procedure, procedures, EntityKind::Procedure, Procedure);
entity_ops!(create_treatment, update_treatment, delete_treatment, treatments, EntityKind::Treatment, Treatment);
entity_ops!(create_observation, update_observation, delete_observation, observations, EntityKind::Observation, Observation);
entity_ops!(create_sample, update_sample, delete_sample, samples, EntityKind::Sample, Sample);
entity_ops!(create_protocol, update_protocol, delete_protocol, protocols, EntityKind::Protocol, Protocol);
entity_ops!(create_permit, update_permit, delete_permit, permits, EntityKind::Permit, Permit);
entity_ops!(create_project, update_project, delete_project, projects, EntityKind::Project, Project);
entity_ops!(create_supply_item, update_supply_item, delete_supply_item, supply_items, EntityKind::SupplyItem, SupplyItem);
entity_ops!(create_line, update_line, delete_line, lines, EntityKind::Line, Line);
entity_ops!(create_strain, update_strain, delete_strain, strains, EntityKind::Strain, Strain);
entity_ops!(create_genotype_marker, update_genotype_marker, delete_genotype_marker, genotype_markers, EntityKind::GenotypeMarker, GenotypeMarker);
