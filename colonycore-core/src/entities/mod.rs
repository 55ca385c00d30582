// colonycore-core/src/entities/mod.rs
// ============================================================================
// Module: Domain Entity Model
// Description: Typed records, identity, status enums, and the custom JSON
// codec for every ColonyCore entity.
// Purpose: Provide the canonical, invariant-bearing representations the
// transaction manager and rules engine operate on.
// Dependencies: serde_json, crate::{ids, extension, timestamp}
// ============================================================================

//! ## Overview
//! Each entity type owns its own JSON marshalling: [`EntityCodec::encode`]
//! flattens extension-hook payloads into named top-level fields, and
//! [`EntityCodec::decode`] reverses the process, rejecting unknown plugin
//! keys or shape-mismatched payloads. Cross-entity references are plain ID
//! strings, not object pointers; referential integrity is enforced by the
//! rules engine (see [`crate::rules`]), not the type system.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod base;
pub mod breeding_unit;
pub mod cohort;
pub mod enums;
pub mod facility;
pub mod genetics;
pub mod housing_unit;
pub mod observation;
pub mod organism;
pub mod permit;
pub mod procedure;
pub mod project;
pub mod protocol;
pub mod sample;
pub mod supply_item;
pub mod treatment;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use base::Base;
pub use base::HasBase;
pub use breeding_unit::BreedingUnit;
pub use cohort::Cohort;
pub use enums::OrganismStage;
pub use enums::PermitStatus;
pub use enums::ProcedureStatus;
pub use enums::SampleStatus;
pub use enums::TreatmentStatus;
pub use facility::Facility;
pub use genetics::GenotypeMarker;
pub use genetics::Line;
pub use genetics::Strain;
pub use housing_unit::HousingUnit;
pub use observation::Observation;
pub use organism::Organism;
pub use permit::Permit;
pub use procedure::Procedure;
pub use project::Project;
pub use protocol::Protocol;
pub use sample::Sample;
pub use supply_item::SupplyItem;
pub use treatment::Treatment;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::extension::ExtensionError;
use crate::timestamp::Timestamp;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while validating or encoding/decoding an entity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityError {
    /// A status/stage field held a value outside its closed set.
    #[error("invalid {kind} value: {value}")]
    InvalidEnum {
        /// The dotted `entity.field` name of the enum.
        kind: &'static str,
        /// The offending wire-form value.
        value: String,
    },
    /// A required field was absent or of the wrong JSON type.
    #[error("entity {entity} field {field} is missing or malformed")]
    MissingField {
        /// Entity kind name.
        entity: &'static str,
        /// Field name.
        field: &'static str,
    },
    /// An "exactly one of" group had zero or more than one field set.
    #[error("entity {entity} must set exactly one of {group}")]
    ExactlyOneOf {
        /// Entity kind name.
        entity: &'static str,
        /// Human-readable name of the field group.
        group: &'static str,
    },
    /// A numeric range invariant was violated (e.g. `ValidFrom <=
    /// ValidUntil`).
    #[error("entity {entity} violates range invariant: {message}")]
    InvalidRange {
        /// Entity kind name.
        entity: &'static str,
        /// Description of the violated invariant.
        message: String,
    },
    /// An extension-hook payload failed validation.
    #[error(transparent)]
    Extension(#[from] ExtensionError),
}

// ============================================================================
// SECTION: Codec
// ============================================================================

/// Custom JSON marshalling owned by each entity.
pub trait EntityCodec: Sized {
    /// Encodes this entity to its stable wire form.
    fn encode(&self) -> Value;

    /// Decodes an entity from its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError`] when required fields are missing, an enum
    /// value is unrecognized, or an extension payload is invalid.
    fn decode(value: &Value) -> Result<Self, EntityError>;
}

// ============================================================================
// SECTION: Shared Decode Helpers
// ============================================================================

/// Reads the `Base` fields (`id`, `created_at`, `updated_at`) out of a
/// decoded JSON object.
pub(crate) fn decode_base(map: &Map<String, Value>, entity: &'static str) -> Result<Base, EntityError> {
    let id = map
        .get("id")
        .and_then(Value::as_str)
        .ok_or(EntityError::MissingField { entity, field: "id" })?
        .to_string();
    let created_at = decode_timestamp(map, entity, "created_at")?;
    let updated_at = decode_timestamp(map, entity, "updated_at")?;
    Ok(Base { id, created_at, updated_at })
}

/// Reads and parses an RFC 3339 timestamp field.
pub(crate) fn decode_timestamp(map: &Map<String, Value>, entity: &'static str, field: &'static str) -> Result<Timestamp, EntityError> {
    let text = map.get(field).and_then(Value::as_str).ok_or(EntityError::MissingField { entity, field })?;
    Timestamp::parse(text).map_err(|_| EntityError::MissingField { entity, field })
}

/// Reads a required string field.
pub(crate) fn decode_string(map: &Map<String, Value>, entity: &'static str, field: &'static str) -> Result<String, EntityError> {
    map.get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or(EntityError::MissingField { entity, field })
}

/// Reads an optional string field, treating JSON `null` or an absent key
/// as `None`.
pub(crate) fn decode_optional_string(map: &Map<String, Value>, field: &str) -> Option<String> {
    map.get(field).and_then(Value::as_str).map(ToString::to_string)
}

/// Reads a required non-negative integer field.
pub(crate) fn decode_u64(map: &Map<String, Value>, entity: &'static str, field: &'static str) -> Result<u64, EntityError> {
    map.get(field).and_then(Value::as_u64).ok_or(EntityError::MissingField { entity, field })
}

/// Reads a string array field, defaulting to empty when absent.
pub(crate) fn decode_string_list(map: &Map<String, Value>, field: &str) -> Vec<String> {
    map.get(field)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(ToString::to_string).collect())
        .unwrap_or_default()
}

/// Deduplicates a list of reference IDs, preserving first-occurrence order.
///
/// This is the concrete resolution of the "are ID lists deduplicated"
/// open question. Entities with one or more `*_ids` reference-list fields
/// implement [`NormalizeIdLists`] in terms of this function; the
/// transaction manager calls it on every create and update so the
/// deduplicated form is what lands in the snapshot and the journal.
#[must_use]
pub fn dedupe_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if seen.insert(id.clone()) {
            out.push(id);
        }
    }
    out
}

/// Normalizes an entity's `*_ids` reference-list fields in place.
///
/// The default implementation is a no-op; entities that carry at least one
/// `Vec<String>` id-reference field override it to run each such field
/// through [`dedupe_ids`]. [`crate::store::Transaction`]'s create/update
/// helpers call this before an entity is stored, so every committed and
/// journaled copy is already deduplicated.
pub trait NormalizeIdLists {
    /// Deduplicates this entity's id-list fields in place.
    fn normalize_id_lists(&mut self) {}
}

/// Encodes a string list field.
pub(crate) fn encode_string_list(ids: &[String]) -> Value {
    Value::Array(ids.iter().cloned().map(Value::String).collect())
}

// ============================================================================
// SECTION: Entity Kind Tag
// ============================================================================

/// Stable tag identifying an entity's kind, used by the change journal and
/// the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    /// Facility entity kind.
    Facility,
    /// HousingUnit entity kind.
    HousingUnit,
    /// Organism entity kind.
    Organism,
    /// Cohort entity kind.
    Cohort,
    /// BreedingUnit entity kind.
    BreedingUnit,
    /// Procedure entity kind.
    Procedure,
    /// Treatment entity kind.
    Treatment,
    /// Observation entity kind.
    Observation,
    /// Sample entity kind.
    Sample,
    /// Protocol entity kind.
    Protocol,
    /// Permit entity kind.
    Permit,
    /// Project entity kind.
    Project,
    /// SupplyItem entity kind.
    SupplyItem,
    /// Line entity kind.
    Line,
    /// Strain entity kind.
    Strain,
    /// GenotypeMarker entity kind.
    GenotypeMarker,
}

impl EntityKind {
    /// Returns the snake_case name used in table names and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Facility => "facility",
            Self::HousingUnit => "housing_unit",
            Self::Organism => "organism",
            Self::Cohort => "cohort",
            Self::BreedingUnit => "breeding_unit",
            Self::Procedure => "procedure",
            Self::Treatment => "treatment",
            Self::Observation => "observation",
            Self::Sample => "sample",
            Self::Protocol => "protocol",
            Self::Permit => "permit",
            Self::Project => "project",
            Self::SupplyItem => "supply_item",
            Self::Line => "line",
            Self::Strain => "strain",
            Self::GenotypeMarker => "genotype_marker",
        }
    }

    /// All entity kinds, in table-declaration order (matches the
    /// SQL table list).
    pub const ALL: [Self; 16] = [
        Self::Facility,
        Self::HousingUnit,
        Self::Organism,
        Self::Cohort,
        Self::BreedingUnit,
        Self::Procedure,
        Self::Treatment,
        Self::Observation,
        Self::Sample,
        Self::Protocol,
        Self::Permit,
        Self::Project,
        Self::SupplyItem,
        Self::Line,
        Self::Strain,
        Self::GenotypeMarker,
    ];
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Any Entity
// ============================================================================

/// A type-erased entity value, used by the change journal and rule views
/// that must inspect heterogeneous entity kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyEntity {
    /// A Facility value.
    Facility(Facility),
    /// A HousingUnit value.
    HousingUnit(HousingUnit),
    /// An Organism value.
    Organism(Organism),
    /// A Cohort value.
    Cohort(Cohort),
    /// A BreedingUnit value.
    BreedingUnit(BreedingUnit),
    /// A Procedure value.
    Procedure(Procedure),
    /// A Treatment value.
    Treatment(Treatment),
    /// An Observation value.
    Observation(Observation),
    /// A Sample value.
    Sample(Sample),
    /// A Protocol value.
    Protocol(Protocol),
    /// A Permit value.
    Permit(Permit),
    /// A Project value.
    Project(Project),
    /// A SupplyItem value.
    SupplyItem(SupplyItem),
    /// A Line value.
    Line(Line),
    /// A Strain value.
    Strain(Strain),
    /// A GenotypeMarker value.
    GenotypeMarker(GenotypeMarker),
}

/// Implements `From<$ty> for AnyEntity` for each concrete entity type, used
/// by the transaction manager's generic create/update/delete helpers.
macro_rules! any_entity_from {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for AnyEntity {
                fn from(entity: $ty) -> Self {
                    Self::$variant(entity)
                }
            }
        )+
    };
}

any_entity_from! {
    Facility => Facility,
    HousingUnit => HousingUnit,
    Organism => Organism,
    Cohort => Cohort,
    BreedingUnit => BreedingUnit,
    Procedure => Procedure,
    Treatment => Treatment,
    Observation => Observation,
    Sample => Sample,
    Protocol => Protocol,
    Permit => Permit,
    Project => Project,
    SupplyItem => SupplyItem,
    Line => Line,
    Strain => Strain,
    GenotypeMarker => GenotypeMarker,
}

impl AnyEntity {
    /// Returns this value's entity kind tag.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Facility(_) => EntityKind::Facility,
            Self::HousingUnit(_) => EntityKind::HousingUnit,
            Self::Organism(_) => EntityKind::Organism,
            Self::Cohort(_) => EntityKind::Cohort,
            Self::BreedingUnit(_) => EntityKind::BreedingUnit,
            Self::Procedure(_) => EntityKind::Procedure,
            Self::Treatment(_) => EntityKind::Treatment,
            Self::Observation(_) => EntityKind::Observation,
            Self::Sample(_) => EntityKind::Sample,
            Self::Protocol(_) => EntityKind::Protocol,
            Self::Permit(_) => EntityKind::Permit,
            Self::Project(_) => EntityKind::Project,
            Self::SupplyItem(_) => EntityKind::SupplyItem,
            Self::Line(_) => EntityKind::Line,
            Self::Strain(_) => EntityKind::Strain,
            Self::GenotypeMarker(_) => EntityKind::GenotypeMarker,
        }
    }

    /// Returns the entity's base identity/timestamp fields.
    #[must_use]
    pub const fn base(&self) -> &Base {
        match self {
            Self::Facility(entity) => &entity.base,
            Self::HousingUnit(entity) => &entity.base,
            Self::Organism(entity) => &entity.base,
            Self::Cohort(entity) => &entity.base,
            Self::BreedingUnit(entity) => &entity.base,
            Self::Procedure(entity) => &entity.base,
            Self::Treatment(entity) => &entity.base,
            Self::Observation(entity) => &entity.base,
            Self::Sample(entity) => &entity.base,
            Self::Protocol(entity) => &entity.base,
            Self::Permit(entity) => &entity.base,
            Self::Project(entity) => &entity.base,
            Self::SupplyItem(entity) => &entity.base,
            Self::Line(entity) => &entity.base,
            Self::Strain(entity) => &entity.base,
            Self::GenotypeMarker(entity) => &entity.base,
        }
    }
}
