// colonycore-core/src/rules/builtins.rs
// ============================================================================
// Module: Built-In Rules
// Description: The required baseline rules: referential
// integrity, housing capacity, protocol subject cap, delete protection,
// stage monotonicity, sample context, observation context, and permit
// window.
// Purpose: Gate every commit on the cross-entity invariants the type system
// cannot express.
// Dependencies: crate::{entities, store}
// ============================================================================

//! ## Overview
//! Each rule here is registered by [`crate::rules::RuleRegistry::with_builtins`]
//! in a fixed order; rule ordering is registration order and several
//! tests depend on it.

use crate::entities::EntityKind;
use crate::rules::Rule;
use crate::rules::RuleError;
use crate::rules::RuleOutcome;
use crate::rules::Severity;
use crate::rules::Violation;
use crate::store::RuleView;
use crate::store::journal::Action;
use crate::store::journal::ChangeRecord;

// ============================================================================
// SECTION: Referential Integrity
// ============================================================================

/// Every `*_id`/`*_ids[]` reference set by the change set must resolve in
/// the post-mutation view.
pub struct ReferentialIntegrity;

impl ReferentialIntegrity {
    /// Pushes a blocking violation for one unresolved reference.
    fn missing(outcome: &mut RuleOutcome, entity: &'static str, entity_id: &str, target: &str, id: &str) {
        outcome.violations.push(Violation {
            rule: "refint.reference",
            severity: Severity::Block,
            message: format!("{entity} {entity_id} references missing {target} {id}"),
            entity,
            entity_id: entity_id.to_string(),
        });
    }
}

impl Rule for ReferentialIntegrity {
    fn name(&self) -> &'static str {
        "refint.reference"
    }

    #[allow(clippy::too_many_lines, reason = "one straight-line check per cross-entity reference field in the entity model")]
    fn evaluate(&self, view: &dyn RuleView, changes: &[ChangeRecord]) -> Result<RuleOutcome, RuleError> {
        let mut outcome = RuleOutcome::empty();
        for change in changes {
            let Some(after) = change.after.as_ref() else { continue };
            match after {
                crate::entities::AnyEntity::HousingUnit(unit) => {
                    if view.find_facility(&unit.facility_id).is_none() {
                        Self::missing(&mut outcome, "housing_unit", &unit.base.id, "facility", &unit.facility_id);
                    }
                }
                crate::entities::AnyEntity::Organism(organism) => {
                    if let Some(id) = &organism.cohort_id
                        && view.find_cohort(id).is_none()
                    {
                        Self::missing(&mut outcome, "organism", &organism.base.id, "cohort", id);
                    }
                    if let Some(id) = &organism.housing_id
                        && view.find_housing_unit(id).is_none()
                    {
                        Self::missing(&mut outcome, "organism", &organism.base.id, "housing_unit", id);
                    }
                    if let Some(id) = &organism.protocol_id
                        && view.find_protocol(id).is_none()
                    {
                        Self::missing(&mut outcome, "organism", &organism.base.id, "protocol", id);
                    }
                    if let Some(id) = &organism.project_id
                        && view.find_project(id).is_none()
                    {
                        Self::missing(&mut outcome, "organism", &organism.base.id, "project", id);
                    }
                }
                crate::entities::AnyEntity::Cohort(cohort) => {
                    if let Some(id) = &cohort.project_id
                        && view.find_project(id).is_none()
                    {
                        Self::missing(&mut outcome, "cohort", &cohort.base.id, "project", id);
                    }
                    if let Some(id) = &cohort.housing_id
                        && view.find_housing_unit(id).is_none()
                    {
                        Self::missing(&mut outcome, "cohort", &cohort.base.id, "housing_unit", id);
                    }
                    if let Some(id) = &cohort.protocol_id
                        && view.find_protocol(id).is_none()
                    {
                        Self::missing(&mut outcome, "cohort", &cohort.base.id, "protocol", id);
                    }
                }
                crate::entities::AnyEntity::BreedingUnit(unit) => {
                    if let Some(id) = &unit.housing_id
                        && view.find_housing_unit(id).is_none()
                    {
                        Self::missing(&mut outcome, "breeding_unit", &unit.base.id, "housing_unit", id);
                    }
                    if let Some(id) = &unit.protocol_id
                        && view.find_protocol(id).is_none()
                    {
                        Self::missing(&mut outcome, "breeding_unit", &unit.base.id, "protocol", id);
                    }
                    for id in unit.female_ids.iter().chain(&unit.male_ids) {
                        if view.find_organism(id).is_none() {
                            Self::missing(&mut outcome, "breeding_unit", &unit.base.id, "organism", id);
                        }
                    }
                }
                crate::entities::AnyEntity::Procedure(procedure) => {
                    if view.find_protocol(&procedure.protocol_id).is_none() {
                        Self::missing(&mut outcome, "procedure", &procedure.base.id, "protocol", &procedure.protocol_id);
                    }
                    for id in &procedure.organism_ids {
                        if view.find_organism(id).is_none() {
                            Self::missing(&mut outcome, "procedure", &procedure.base.id, "organism", id);
                        }
                    }
                }
                crate::entities::AnyEntity::Treatment(treatment) => {
                    if view.find_procedure(&treatment.procedure_id).is_none() {
                        Self::missing(&mut outcome, "treatment", &treatment.base.id, "procedure", &treatment.procedure_id);
                    }
                    for id in &treatment.organism_ids {
                        if view.find_organism(id).is_none() {
                            Self::missing(&mut outcome, "treatment", &treatment.base.id, "organism", id);
                        }
                    }
                }
                crate::entities::AnyEntity::Observation(observation) => {
                    if let Some(id) = &observation.procedure_id
                        && view.find_procedure(id).is_none()
                    {
                        Self::missing(&mut outcome, "observation", &observation.base.id, "procedure", id);
                    }
                    if let Some(id) = &observation.organism_id
                        && view.find_organism(id).is_none()
                    {
                        Self::missing(&mut outcome, "observation", &observation.base.id, "organism", id);
                    }
                    if let Some(id) = &observation.cohort_id
                        && view.find_cohort(id).is_none()
                    {
                        Self::missing(&mut outcome, "observation", &observation.base.id, "cohort", id);
                    }
                }
                crate::entities::AnyEntity::Sample(sample) => {
                    if view.find_facility(&sample.facility_id).is_none() {
                        Self::missing(&mut outcome, "sample", &sample.base.id, "facility", &sample.facility_id);
                    }
                    if let Some(id) = &sample.organism_id
                        && view.find_organism(id).is_none()
                    {
                        Self::missing(&mut outcome, "sample", &sample.base.id, "organism", id);
                    }
                    if let Some(id) = &sample.cohort_id
                        && view.find_cohort(id).is_none()
                    {
                        Self::missing(&mut outcome, "sample", &sample.base.id, "cohort", id);
                    }
                }
                crate::entities::AnyEntity::Permit(permit) => {
                    for id in &permit.facility_ids {
                        if view.find_facility(id).is_none() {
                            Self::missing(&mut outcome, "permit", &permit.base.id, "facility", id);
                        }
                    }
                    for id in &permit.protocol_ids {
                        if view.find_protocol(id).is_none() {
                            Self::missing(&mut outcome, "permit", &permit.base.id, "protocol", id);
                        }
                    }
                }
                crate::entities::AnyEntity::Project(project) => {
                    for id in &project.facility_ids {
                        if view.find_facility(id).is_none() {
                            Self::missing(&mut outcome, "project", &project.base.id, "facility", id);
                        }
                    }
                    for id in &project.protocol_ids {
                        if view.find_protocol(id).is_none() {
                            Self::missing(&mut outcome, "project", &project.base.id, "protocol", id);
                        }
                    }
                    for id in &project.organism_ids {
                        if view.find_organism(id).is_none() {
                            Self::missing(&mut outcome, "project", &project.base.id, "organism", id);
                        }
                    }
                    for id in &project.procedure_ids {
                        if view.find_procedure(id).is_none() {
                            Self::missing(&mut outcome, "project", &project.base.id, "procedure", id);
                        }
                    }
                    for id in &project.supply_item_ids {
                        if view.find_supply_item(id).is_none() {
                            Self::missing(&mut outcome, "project", &project.base.id, "supply_item", id);
                        }
                    }
                }
                crate::entities::AnyEntity::SupplyItem(item) => {
                    for id in &item.facility_ids {
                        if view.find_facility(id).is_none() {
                            Self::missing(&mut outcome, "supply_item", &item.base.id, "facility", id);
                        }
                    }
                    for id in &item.project_ids {
                        if view.find_project(id).is_none() {
                            Self::missing(&mut outcome, "supply_item", &item.base.id, "project", id);
                        }
                    }
                }
                crate::entities::AnyEntity::Strain(strain) => {
                    if view.find_line(&strain.line_id).is_none() {
                        Self::missing(&mut outcome, "strain", &strain.base.id, "line", &strain.line_id);
                    }
                    for id in &strain.genotype_marker_ids {
                        if view.find_genotype_marker(id).is_none() {
                            Self::missing(&mut outcome, "strain", &strain.base.id, "genotype_marker", id);
                        }
                    }
                }
                crate::entities::AnyEntity::Line(line) => {
                    for id in &line.genotype_marker_ids {
                        if view.find_genotype_marker(id).is_none() {
                            Self::missing(&mut outcome, "line", &line.base.id, "genotype_marker", id);
                        }
                    }
                }
                crate::entities::AnyEntity::Facility(_) | crate::entities::AnyEntity::Protocol(_) | crate::entities::AnyEntity::GenotypeMarker(_) => {}
            }
        }
        Ok(outcome)
    }
}

// ============================================================================
// SECTION: Housing Capacity
// ============================================================================

/// For every `HousingUnit`, the count of non-terminal-stage organisms housed
/// there must not exceed its capacity.
pub struct HousingCapacity;

impl Rule for HousingCapacity {
    fn name(&self) -> &'static str {
        "housing.capacity"
    }

    fn evaluate(&self, view: &dyn RuleView, _changes: &[ChangeRecord]) -> Result<RuleOutcome, RuleError> {
        let mut outcome = RuleOutcome::empty();
        for unit in view.list_housing_units() {
            let occupants = view
                .list_organisms()
                .into_iter()
                .filter(|organism| organism.housing_id.as_deref() == Some(unit.base.id.as_str()) && !organism.stage.is_terminal())
                .count();
            if occupants as u64 > unit.capacity {
                outcome.violations.push(Violation {
                    rule: "housing.capacity",
                    severity: Severity::Block,
                    message: format!("housing_unit {} holds {occupants} organisms, exceeding capacity {}", unit.base.id, unit.capacity),
                    entity: "housing_unit",
                    entity_id: unit.base.id.clone(),
                });
            }
        }
        Ok(outcome)
    }
}

// ============================================================================
// SECTION: Protocol Subject Cap
// ============================================================================

/// Organisms bound to a protocol cannot exceed `Protocol.max_subjects`.
pub struct ProtocolSubjectCap;

impl Rule for ProtocolSubjectCap {
    fn name(&self) -> &'static str {
        "protocol.subject_cap"
    }

    fn evaluate(&self, view: &dyn RuleView, _changes: &[ChangeRecord]) -> Result<RuleOutcome, RuleError> {
        let mut outcome = RuleOutcome::empty();
        for protocol in view.list_protocols() {
            let subjects = view.list_organisms().into_iter().filter(|organism| organism.protocol_id.as_deref() == Some(protocol.base.id.as_str())).count();
            if subjects as u64 > protocol.max_subjects {
                outcome.violations.push(Violation {
                    rule: "protocol.subject_cap",
                    severity: Severity::Block,
                    message: format!("protocol {} binds {subjects} organisms, exceeding max_subjects {}", protocol.base.id, protocol.max_subjects),
                    entity: "protocol",
                    entity_id: protocol.base.id.clone(),
                });
            }
        }
        Ok(outcome)
    }
}

// ============================================================================
// SECTION: Delete Protection
// ============================================================================

/// A delete on an entity with live referencing entities is a blocking
/// violation.
pub struct DeleteProtection;

impl DeleteProtection {
    /// Pushes a blocking violation for one delete blocked by a referencing
    /// entity.
    fn blocked(outcome: &mut RuleOutcome, rule: &'static str, entity: &'static str, entity_id: &str, referenced_by: &str) {
        outcome.violations.push(Violation {
            rule,
            severity: Severity::Block,
            message: format!("{entity} {entity_id} cannot be deleted while referenced by {referenced_by}"),
            entity,
            entity_id: entity_id.to_string(),
        });
    }
}

impl Rule for DeleteProtection {
    fn name(&self) -> &'static str {
        "refint.delete_protection"
    }

    fn evaluate(&self, view: &dyn RuleView, changes: &[ChangeRecord]) -> Result<RuleOutcome, RuleError> {
        let mut outcome = RuleOutcome::empty();
        for change in changes {
            if change.action != Action::Delete {
                continue;
            }
            let id = change.id.as_str();
            match change.kind {
                EntityKind::Facility => {
                    if view.list_housing_units().iter().any(|unit| unit.facility_id == id) {
                        Self::blocked(&mut outcome, "refint.facility", "facility", id, "a housing_unit");
                    }
                    if view.list_samples().iter().any(|sample| sample.facility_id == id) {
                        Self::blocked(&mut outcome, "refint.facility", "facility", id, "a sample");
                    }
                    if view.list_permits().iter().any(|permit| permit.facility_ids.iter().any(|fid| fid == id)) {
                        Self::blocked(&mut outcome, "refint.facility", "facility", id, "a permit");
                    }
                    if view.list_projects().iter().any(|project| project.facility_ids.iter().any(|fid| fid == id)) {
                        Self::blocked(&mut outcome, "refint.facility", "facility", id, "a project");
                    }
                }
                EntityKind::HousingUnit => {
                    if view.list_organisms().iter().any(|organism| organism.housing_id.as_deref() == Some(id)) {
                        Self::blocked(&mut outcome, "refint.housing_unit", "housing_unit", id, "an organism");
                    }
                }
                EntityKind::Procedure => {
                    if view.list_treatments().iter().any(|treatment| treatment.procedure_id == id) {
                        Self::blocked(&mut outcome, "refint.procedure", "procedure", id, "a treatment");
                    }
                    if view.list_observations().iter().any(|observation| observation.procedure_id.as_deref() == Some(id)) {
                        Self::blocked(&mut outcome, "refint.procedure", "procedure", id, "an observation");
                    }
                }
                EntityKind::Protocol => {
                    if view.list_procedures().iter().any(|procedure| procedure.protocol_id == id) {
                        Self::blocked(&mut outcome, "refint.protocol", "protocol", id, "a procedure");
                    }
                    if view.list_permits().iter().any(|permit| permit.protocol_ids.iter().any(|pid| pid == id)) {
                        Self::blocked(&mut outcome, "refint.protocol", "protocol", id, "a permit");
                    }
                }
                EntityKind::Project => {
                    if view.list_supply_items().iter().any(|item| item.project_ids.iter().any(|pid| pid == id)) {
                        Self::blocked(&mut outcome, "refint.project", "project", id, "a supply_item");
                    }
                }
                EntityKind::Line => {
                    if view.list_strains().iter().any(|strain| strain.line_id == id) {
                        Self::blocked(&mut outcome, "refint.line", "line", id, "a strain");
                    }
                }
                EntityKind::Organism
                | EntityKind::Cohort
                | EntityKind::BreedingUnit
                | EntityKind::Treatment
                | EntityKind::Observation
                | EntityKind::Sample
                | EntityKind::Permit
                | EntityKind::SupplyItem
                | EntityKind::Strain
                | EntityKind::GenotypeMarker => {}
            }
        }
        Ok(outcome)
    }
}

// ============================================================================
// SECTION: Stage Monotonicity
// ============================================================================

/// Organism stage may not retreat from `retired`/`deceased`; both are
/// terminal once reached. Monotonicity is enforced here by the rules
/// engine, not merely documented.
pub struct StageMonotonic;

impl Rule for StageMonotonic {
    fn name(&self) -> &'static str {
        "organism.stage_monotonic"
    }

    fn evaluate(&self, _view: &dyn RuleView, changes: &[ChangeRecord]) -> Result<RuleOutcome, RuleError> {
        let mut outcome = RuleOutcome::empty();
        for change in changes {
            if change.kind != EntityKind::Organism || change.action != Action::Update {
                continue;
            }
            let (Some(crate::entities::AnyEntity::Organism(before)), Some(crate::entities::AnyEntity::Organism(after))) = (&change.before, &change.after) else {
                continue;
            };
            if before.stage.is_terminal() && after.stage != before.stage {
                outcome.violations.push(Violation {
                    rule: "organism.stage_monotonic",
                    severity: Severity::Block,
                    message: format!("organism {} cannot leave terminal stage {}", after.base.id, before.stage),
                    entity: "organism",
                    entity_id: after.base.id.clone(),
                });
            }
        }
        Ok(outcome)
    }
}

// ============================================================================
// SECTION: Sample Context
// ============================================================================

/// A sample must carry exactly one of `organism_id`/`cohort_id`.
///
/// Decoding already enforces this (`Sample::validate_context`); this rule
/// re-checks it at commit time against the journaled change so a mutator
/// that bypasses `decode` cannot smuggle an invalid sample past the
/// transaction manager.
pub struct SampleContext;

impl Rule for SampleContext {
    fn name(&self) -> &'static str {
        "sample.context"
    }

    fn evaluate(&self, view: &dyn RuleView, changes: &[ChangeRecord]) -> Result<RuleOutcome, RuleError> {
        let mut outcome = RuleOutcome::empty();
        for change in changes {
            let Some(crate::entities::AnyEntity::Sample(sample)) = &change.after else { continue };
            if sample.validate_context().is_err() {
                outcome.violations.push(Violation {
                    rule: "sample.context",
                    severity: Severity::Block,
                    message: format!("sample {} must set exactly one of organism_id, cohort_id", sample.base.id),
                    entity: "sample",
                    entity_id: sample.base.id.clone(),
                });
            }
        }
        let mut by_identifier: std::collections::BTreeMap<String, Vec<String>> = std::collections::BTreeMap::new();
        for sample in view.list_samples() {
            by_identifier.entry(sample.identifier.clone()).or_default().push(sample.base.id.clone());
        }
        for (identifier, ids) in by_identifier {
            if ids.len() > 1 {
                for id in ids {
                    outcome.violations.push(Violation {
                        rule: "sample.context",
                        severity: Severity::Block,
                        message: format!("sample identifier {identifier} is not globally unique"),
                        entity: "sample",
                        entity_id: id,
                    });
                }
            }
        }
        Ok(outcome)
    }
}

// ============================================================================
// SECTION: Observation Context
// ============================================================================

/// An observation must carry exactly one of `procedure_id`/`organism_id`/
/// `cohort_id`.
///
/// Decoding already enforces this (`Observation::validate_context`); this
/// rule re-checks it at commit time against the journaled change so a
/// mutator that bypasses `decode` cannot smuggle a contextless observation
/// past the transaction manager.
pub struct ObservationContext;

impl Rule for ObservationContext {
    fn name(&self) -> &'static str {
        "observation.context"
    }

    fn evaluate(&self, _view: &dyn RuleView, changes: &[ChangeRecord]) -> Result<RuleOutcome, RuleError> {
        let mut outcome = RuleOutcome::empty();
        for change in changes {
            let Some(crate::entities::AnyEntity::Observation(observation)) = &change.after else { continue };
            if observation.validate_context().is_err() {
                outcome.violations.push(Violation {
                    rule: "observation.context",
                    severity: Severity::Block,
                    message: format!("observation {} must set exactly one of procedure_id, organism_id, cohort_id", observation.base.id),
                    entity: "observation",
                    entity_id: observation.base.id.clone(),
                });
            }
        }
        Ok(outcome)
    }
}

// ============================================================================
// SECTION: Permit Window
// ============================================================================

/// A permit's validity window must satisfy `valid_from <= valid_until`.
///
/// Decoding already enforces this (`Permit::validate_window`); this rule
/// re-checks it at commit time against the journaled change so a mutator
/// that bypasses `decode` cannot smuggle an inverted window past the
/// transaction manager.
pub struct PermitWindow;

impl Rule for PermitWindow {
    fn name(&self) -> &'static str {
        "permit.window"
    }

    fn evaluate(&self, _view: &dyn RuleView, changes: &[ChangeRecord]) -> Result<RuleOutcome, RuleError> {
        let mut outcome = RuleOutcome::empty();
        for change in changes {
            let Some(crate::entities::AnyEntity::Permit(permit)) = &change.after else { continue };
            if permit.validate_window().is_err() {
                outcome.violations.push(Violation {
                    rule: "permit.window",
                    severity: Severity::Block,
                    message: format!("permit {} must have valid_from <= valid_until", permit.base.id),
                    entity: "permit",
                    entity_id: permit.base.id.clone(),
                });
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AnyEntity;
    use crate::entities::Base;
    use crate::entities::Facility;
    use crate::entities::HousingUnit;
    use crate::entities::Organism;
    use crate::entities::OrganismStage;
    use crate::extension::Container;
    use crate::store::Snapshot;

    fn base(id: &str) -> Base {
        Base { id: id.to_string(), created_at: crate::timestamp::Timestamp::now(), updated_at: crate::timestamp::Timestamp::now() }
    }

    fn facility(id: &str) -> Facility {
        Facility { base: base(id), code: id.to_string(), name: id.to_string(), zone: "z".to_string(), access_policy: "open".to_string(), extensions: Container::new() }
    }

    fn housing_unit(id: &str, facility_id: &str, capacity: u64) -> HousingUnit {
        HousingUnit { base: base(id), name: id.to_string(), facility_id: facility_id.to_string(), capacity, environment: "terrarium".to_string(), state: "active".to_string() }
    }

    fn organism(id: &str, housing_id: &str, stage: OrganismStage) -> Organism {
        Organism {
            base: base(id),
            name: id.to_string(),
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

    #[test]
    fn housing_capacity_blocks_when_occupancy_exceeds_capacity() {
        let mut snapshot = Snapshot::new();
        snapshot.facilities.insert("F1".to_string(), facility("F1"));
        snapshot.housing_units.insert("H1".to_string(), housing_unit("H1", "F1", 1));
        snapshot.organisms.insert("O1".to_string(), organism("O1", "H1", OrganismStage::Adult));
        snapshot.organisms.insert("O2".to_string(), organism("O2", "H1", OrganismStage::Adult));

        let outcome = HousingCapacity.evaluate(&snapshot, &[]).expect("rule does not fail internally");
        assert!(outcome.has_blocking());
        assert_eq!(outcome.violations[0].rule, "housing.capacity");
        assert_eq!(outcome.violations[0].entity_id, "H1");
    }

    #[test]
    fn housing_capacity_ignores_terminal_stage_occupants() {
        let mut snapshot = Snapshot::new();
        snapshot.facilities.insert("F1".to_string(), facility("F1"));
        snapshot.housing_units.insert("H1".to_string(), housing_unit("H1", "F1", 1));
        snapshot.organisms.insert("O1".to_string(), organism("O1", "H1", OrganismStage::Adult));
        snapshot.organisms.insert("O2".to_string(), organism("O2", "H1", OrganismStage::Deceased));

        let outcome = HousingCapacity.evaluate(&snapshot, &[]).expect("rule does not fail internally");
        assert!(!outcome.has_blocking());
    }

    #[test]
    fn stage_monotonic_blocks_leaving_terminal_stage() {
        let before = organism("O1", "H1", OrganismStage::Deceased);
        let mut after = before.clone();
        after.stage = OrganismStage::Adult;
        let changes = vec![ChangeRecord::updated(AnyEntity::Organism(before), AnyEntity::Organism(after))];

        let snapshot = Snapshot::new();
        let outcome = StageMonotonic.evaluate(&snapshot, &changes).expect("rule does not fail internally");
        assert!(outcome.has_blocking());
        assert_eq!(outcome.violations[0].rule, "organism.stage_monotonic");
    }

    #[test]
    fn sample_context_blocks_duplicate_identifiers() {
        use crate::entities::Sample;
        use crate::entities::SampleStatus;

        let sample_a = Sample {
            base: base("S1"),
            identifier: "dup".to_string(),
            source_type: "tissue".to_string(),
            facility_id: "F1".to_string(),
            organism_id: Some("O1".to_string()),
            cohort_id: None,
            collected_at: crate::timestamp::Timestamp::now(),
            status: SampleStatus::Stored,
            storage_location: "freezer".to_string(),
            chain_of_custody: Vec::new(),
            extensions: Container::new(),
        };
        let mut sample_b = sample_a.clone();
        sample_b.base.id = "S2".to_string();

        let mut snapshot = Snapshot::new();
        snapshot.samples.insert("S1".to_string(), sample_a);
        snapshot.samples.insert("S2".to_string(), sample_b);

        let outcome = SampleContext.evaluate(&snapshot, &[]).expect("rule does not fail internally");
        assert!(outcome.has_blocking());
        assert_eq!(outcome.violations.len(), 2);
    }

    #[test]
    fn observation_context_blocks_contextless_observations() {
        use crate::entities::Observation;

        let observation = Observation {
            base: base("OBS1"),
            recorded_at: crate::timestamp::Timestamp::now(),
            observer: "alice".to_string(),
            procedure_id: None,
            organism_id: None,
            cohort_id: None,
            extensions: Container::new(),
        };
        let changes = vec![ChangeRecord::created(AnyEntity::Observation(observation))];

        let snapshot = Snapshot::new();
        let outcome = ObservationContext.evaluate(&snapshot, &changes).expect("rule does not fail internally");
        assert!(outcome.has_blocking());
        assert_eq!(outcome.violations[0].rule, "observation.context");
    }

    #[test]
    fn permit_window_blocks_an_inverted_validity_window() {
        use crate::entities::Permit;
        use crate::entities::PermitStatus;

        let permit = Permit {
            base: base("PERMIT1"),
            permit_number: "P-1".to_string(),
            authority: "IACUC".to_string(),
            status: PermitStatus::Pending,
            valid_from: crate::timestamp::Timestamp::parse("2026-06-01T00:00:00Z").expect("valid rfc3339"),
            valid_until: crate::timestamp::Timestamp::parse("2026-01-01T00:00:00Z").expect("valid rfc3339"),
            facility_ids: Vec::new(),
            protocol_ids: Vec::new(),
        };
        let changes = vec![ChangeRecord::created(AnyEntity::Permit(permit))];

        let snapshot = Snapshot::new();
        let outcome = PermitWindow.evaluate(&snapshot, &changes).expect("rule does not fail internally");
        assert!(outcome.has_blocking());
        assert_eq!(outcome.violations[0].rule, "permit.window");
    }
}
