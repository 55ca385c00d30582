// colonycore-core/src/entities/cohort.rs
// ============================================================================
// Module: Cohort Entity
// Description: A named grouping of organisms tracked together.
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

/// A named grouping of organisms tracked together.
#[derive(Debug, Clone, PartialEq)]
pub struct Cohort {
    /// Identity and timestamps.
    pub base: Base,
    /// Display name.
    pub name: String,
    /// Purpose or study description.
    pub purpose: String,
    /// Optional owning project.
    pub project_id: Option<String>,
    /// Optional housing assignment.
    pub housing_id: Option<String>,
    /// Optional governing protocol.
    pub protocol_id: Option<String>,
}

impl HasBase for Cohort {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for Cohort {}

impl EntityCodec for Cohort {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("purpose".to_string(), Value::String(self.purpose.clone()));
        map.insert("project_id".to_string(), self.project_id.clone().map_or(Value::Null, Value::String));
        map.insert("housing_id".to_string(), self.housing_id.clone().map_or(Value::Null, Value::String));
        map.insert("protocol_id".to_string(), self.protocol_id.clone().map_or(Value::Null, Value::String));
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "cohort", field: "<root>" })?;
        Ok(Self {
            base: decode_base(map, "cohort")?,
            name: decode_string(map, "cohort", "name")?,
            purpose: decode_string(map, "cohort", "purpose")?,
            project_id: decode_optional_string(map, "project_id"),
            housing_id: decode_optional_string(map, "housing_id"),
            protocol_id: decode_optional_string(map, "protocol_id"),
        })
    }
}
