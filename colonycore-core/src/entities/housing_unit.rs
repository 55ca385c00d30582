// colonycore-core/src/entities/housing_unit.rs
// ============================================================================
// Module: HousingUnit Entity
// Description: A physical enclosure within a facility that houses organisms
// up to a fixed capacity.
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::entities::Base;
use crate::entities::EntityCodec;
use crate::entities::EntityError;
use crate::entities::HasBase;
use crate::entities::NormalizeIdLists;
use crate::entities::decode_base;
use crate::entities::decode_string;
use crate::entities::decode_u64;

/// A physical enclosure within a facility.
///
/// # Invariants
/// - `facility_id` must resolve to an existing `Facility`.
/// - The count of non-terminal organisms housed here must not exceed
///   `capacity` (enforced by the `housing.capacity` rule).
/// - Deletion is blocked while any `Organism` has `housing_id` pointing
///   here.
#[derive(Debug, Clone, PartialEq)]
pub struct HousingUnit {
    /// Identity and timestamps.
    pub base: Base,
    /// Display name.
    pub name: String,
    /// Owning facility identifier.
    pub facility_id: String,
    /// Maximum number of non-terminal-stage organisms this unit may hold.
    pub capacity: u64,
    /// Environment description (enclosure type, substrate, etc).
    pub environment: String,
    /// Operational state (e.g. `active`, `maintenance`).
    pub state: String,
}

impl HasBase for HousingUnit {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for HousingUnit {}

impl EntityCodec for HousingUnit {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("facility_id".to_string(), Value::String(self.facility_id.clone()));
        map.insert("capacity".to_string(), Value::Number(self.capacity.into()));
        map.insert("environment".to_string(), Value::String(self.environment.clone()));
        map.insert("state".to_string(), Value::String(self.state.clone()));
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "housing_unit", field: "<root>" })?;
        Ok(Self {
            base: decode_base(map, "housing_unit")?,
            name: decode_string(map, "housing_unit", "name")?,
            facility_id: decode_string(map, "housing_unit", "facility_id")?,
            capacity: decode_u64(map, "housing_unit", "capacity")?,
            environment: decode_string(map, "housing_unit", "environment")?,
            state: decode_string(map, "housing_unit", "state")?,
        })
    }
}
