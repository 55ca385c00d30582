// colonycore-core/src/entities/observation.rs
// ============================================================================
// Module: Observation Entity
// Description: A recorded observation tied to exactly one of a procedure,
// organism, or cohort.
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::entities::Base;
use crate::entities::EntityCodec;
use crate::entities::EntityError;
use crate::entities::HasBase;
use crate::entities::NormalizeIdLists;
use crate::entities::decode_base;
use crate::entities::decode_optional_string;
use crate::entities::decode_string;
use crate::entities::decode_timestamp;
use crate::extension::Container;
use crate::extension::HOOK_OBSERVATION_DATA;
use crate::extension::core_only_field;
use crate::extension::set_core_only_field;
use crate::timestamp::Timestamp;

/// A recorded observation tied to exactly one context entity.
///
/// # Invariants
/// - Exactly one of `procedure_id`, `organism_id`, `cohort_id` is set
///   (checked at decode time and by the `observation.context` rule at
///   commit).
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Identity and timestamps.
    pub base: Base,
    /// Time the observation was recorded.
    pub recorded_at: Timestamp,
    /// Name or id of the observer.
    pub observer: String,
    /// Optional procedure context.
    pub procedure_id: Option<String>,
    /// Optional organism context.
    pub organism_id: Option<String>,
    /// Optional cohort context.
    pub cohort_id: Option<String>,
    /// Extension payloads, including the `data` hook.
    pub extensions: Container,
}

impl Observation {
    /// Validates that exactly one context reference is set.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::ExactlyOneOf`] when zero or more than one of
    /// `procedure_id`/`organism_id`/`cohort_id` is set.
    pub fn validate_context(&self) -> Result<(), EntityError> {
        let set_count = [&self.procedure_id, &self.organism_id, &self.cohort_id].into_iter().filter(|id| id.is_some()).count();
        if set_count == 1 {
            Ok(())
        } else {
            Err(EntityError::ExactlyOneOf { entity: "observation", group: "procedure_id, organism_id, cohort_id" })
        }
    }
}

impl HasBase for Observation {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for Observation {}

impl EntityCodec for Observation {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("recorded_at".to_string(), Value::String(self.recorded_at.to_string()));
        map.insert("observer".to_string(), Value::String(self.observer.clone()));
        map.insert("procedure_id".to_string(), self.procedure_id.clone().map_or(Value::Null, Value::String));
        map.insert("organism_id".to_string(), self.organism_id.clone().map_or(Value::Null, Value::String));
        map.insert("cohort_id".to_string(), self.cohort_id.clone().map_or(Value::Null, Value::String));
        if let Some(data) = core_only_field(HOOK_OBSERVATION_DATA, &self.extensions) {
            map.insert("data".to_string(), data);
        }
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "observation", field: "<root>" })?;
        let mut extensions = Container::new();
        if let Some(data) = map.get("data") {
            set_core_only_field(HOOK_OBSERVATION_DATA, &mut extensions, data.clone())?;
        }
        let observation = Self {
            base: decode_base(map, "observation")?,
            recorded_at: decode_timestamp(map, "observation", "recorded_at")?,
            observer: decode_string(map, "observation", "observer")?,
            procedure_id: decode_optional_string(map, "procedure_id"),
            organism_id: decode_optional_string(map, "organism_id"),
            cohort_id: decode_optional_string(map, "cohort_id"),
            extensions,
        };
        observation.validate_context()?;
        Ok(observation)
    }
}
