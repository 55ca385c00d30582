// colonycore-core/src/entities/breeding_unit.rs
// ============================================================================
// Module: BreedingUnit Entity
// Description: A pairing of organisms managed for breeding.
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
use crate::entities::decode_string_list;
use crate::entities::dedupe_ids;
use crate::entities::encode_string_list;
use crate::extension::Container;
use crate::extension::HOOK_BREEDING_UNIT_PAIRING_ATTRIBUTES;
use crate::extension::core_only_field;
use crate::extension::set_core_only_field;

/// A pairing of organisms managed for breeding.
///
/// # Invariants
/// - Every id in `female_ids`/`male_ids` must resolve to an existing
///   `Organism`.
#[derive(Debug, Clone, PartialEq)]
pub struct BreedingUnit {
    /// Identity and timestamps.
    pub base: Base,
    /// Display name.
    pub name: String,
    /// Breeding strategy description.
    pub strategy: String,
    /// Optional housing assignment.
    pub housing_id: Option<String>,
    /// Optional governing protocol.
    pub protocol_id: Option<String>,
    /// Female organism identifiers, deduplicated at commit.
    pub female_ids: Vec<String>,
    /// Male organism identifiers, deduplicated at commit.
    pub male_ids: Vec<String>,
    /// Extension payloads, including the `pairing_attributes` hook.
    pub extensions: Container,
}

impl HasBase for BreedingUnit {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for BreedingUnit {
    fn normalize_id_lists(&mut self) {
        self.female_ids = dedupe_ids(std::mem::take(&mut self.female_ids));
        self.male_ids = dedupe_ids(std::mem::take(&mut self.male_ids));
    }
}

impl EntityCodec for BreedingUnit {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("strategy".to_string(), Value::String(self.strategy.clone()));
        map.insert("housing_id".to_string(), self.housing_id.clone().map_or(Value::Null, Value::String));
        map.insert("protocol_id".to_string(), self.protocol_id.clone().map_or(Value::Null, Value::String));
        map.insert("female_ids".to_string(), encode_string_list(&self.female_ids));
        map.insert("male_ids".to_string(), encode_string_list(&self.male_ids));
        if let Some(attributes) = core_only_field(HOOK_BREEDING_UNIT_PAIRING_ATTRIBUTES, &self.extensions) {
            map.insert("pairing_attributes".to_string(), attributes);
        }
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "breeding_unit", field: "<root>" })?;
        let mut extensions = Container::new();
        if let Some(attributes) = map.get("pairing_attributes") {
            set_core_only_field(HOOK_BREEDING_UNIT_PAIRING_ATTRIBUTES, &mut extensions, attributes.clone())?;
        }
        Ok(Self {
            base: decode_base(map, "breeding_unit")?,
            name: decode_string(map, "breeding_unit", "name")?,
            strategy: decode_string(map, "breeding_unit", "strategy")?,
            housing_id: decode_optional_string(map, "housing_id"),
            protocol_id: decode_optional_string(map, "protocol_id"),
            female_ids: decode_string_list(map, "female_ids"),
            male_ids: decode_string_list(map, "male_ids"),
            extensions,
        })
    }
}
