// colonycore-core/src/entities/sample.rs
// ============================================================================
// Module: Sample Entity
// Description: A physical sample collected from exactly one of an organism
// or a cohort, with a chain-of-custody log.
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::entities::Base;
use crate::entities::EntityCodec;
use crate::entities::EntityError;
use crate::entities::HasBase;
use crate::entities::NormalizeIdLists;
use crate::entities::SampleStatus;
use crate::entities::decode_base;
use crate::entities::decode_optional_string;
use crate::entities::decode_string;
use crate::entities::decode_string_list;
use crate::entities::decode_timestamp;
use crate::entities::encode_string_list;
use crate::extension::Container;
use crate::extension::HOOK_SAMPLE_ATTRIBUTES;
use crate::extension::core_only_field;
use crate::extension::set_core_only_field;
use crate::timestamp::Timestamp;

/// A physical sample collected from exactly one of an organism or a cohort.
///
/// # Invariants
/// - `identifier` is globally unique (enforced by the `sample.unique_identifier` rule).
/// - `facility_id` must resolve to an existing `Facility`.
/// - Exactly one of `organism_id`, `cohort_id` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Identity and timestamps.
    pub base: Base,
    /// Globally unique human-facing identifier.
    pub identifier: String,
    /// Source type description (e.g. `tissue`, `blood`).
    pub source_type: String,
    /// Owning facility identifier.
    pub facility_id: String,
    /// Optional organism context.
    pub organism_id: Option<String>,
    /// Optional cohort context.
    pub cohort_id: Option<String>,
    /// Collection time.
    pub collected_at: Timestamp,
    /// Lifecycle status.
    pub status: SampleStatus,
    /// Storage location description.
    pub storage_location: String,
    /// Append-only chain-of-custody log entries.
    pub chain_of_custody: Vec<String>,
    /// Extension payloads, including the `attributes` hook.
    pub extensions: Container,
}

impl Sample {
    /// Validates that exactly one context reference is set.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::ExactlyOneOf`] when zero or more than one of
    /// `organism_id`/`cohort_id` is set.
    pub fn validate_context(&self) -> Result<(), EntityError> {
        let set_count = [&self.organism_id, &self.cohort_id].into_iter().filter(|id| id.is_some()).count();
        if set_count == 1 {
            Ok(())
        } else {
            Err(EntityError::ExactlyOneOf { entity: "sample", group: "organism_id, cohort_id" })
        }
    }
}

impl HasBase for Sample {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for Sample {}

impl EntityCodec for Sample {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("identifier".to_string(), Value::String(self.identifier.clone()));
        map.insert("source_type".to_string(), Value::String(self.source_type.clone()));
        map.insert("facility_id".to_string(), Value::String(self.facility_id.clone()));
        map.insert("organism_id".to_string(), self.organism_id.clone().map_or(Value::Null, Value::String));
        map.insert("cohort_id".to_string(), self.cohort_id.clone().map_or(Value::Null, Value::String));
        map.insert("collected_at".to_string(), Value::String(self.collected_at.to_string()));
        map.insert("status".to_string(), Value::String(self.status.as_str().to_string()));
        map.insert("storage_location".to_string(), Value::String(self.storage_location.clone()));
        map.insert("chain_of_custody".to_string(), encode_string_list(&self.chain_of_custody));
        if let Some(attributes) = core_only_field(HOOK_SAMPLE_ATTRIBUTES, &self.extensions) {
            map.insert("attributes".to_string(), attributes);
        }
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "sample", field: "<root>" })?;
        let status_text = decode_string(map, "sample", "status")?;
        let mut extensions = Container::new();
        if let Some(attributes) = map.get("attributes") {
            set_core_only_field(HOOK_SAMPLE_ATTRIBUTES, &mut extensions, attributes.clone())?;
        }
        let sample = Self {
            base: decode_base(map, "sample")?,
            identifier: decode_string(map, "sample", "identifier")?,
            source_type: decode_string(map, "sample", "source_type")?,
            facility_id: decode_string(map, "sample", "facility_id")?,
            organism_id: decode_optional_string(map, "organism_id"),
            cohort_id: decode_optional_string(map, "cohort_id"),
            collected_at: decode_timestamp(map, "sample", "collected_at")?,
            status: SampleStatus::parse(&status_text)?,
            storage_location: decode_string(map, "sample", "storage_location")?,
            chain_of_custody: decode_string_list(map, "chain_of_custody"),
            extensions,
        };
        sample.validate_context()?;
        Ok(sample)
    }
}
