// colonycore-core/src/entities/organism.rs
// ============================================================================
// Module: Organism Entity
// Description: An individual animal tracked through its lifecycle stages.
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::entities::Base;
use crate::entities::EntityCodec;
use crate::entities::EntityError;
use crate::entities::HasBase;
use crate::entities::NormalizeIdLists;
use crate::entities::OrganismStage;
use crate::entities::decode_base;
use crate::entities::decode_optional_string;
use crate::entities::decode_string;
use crate::extension::Container;
use crate::extension::HOOK_ORGANISM_ATTRIBUTES;
use crate::extension::core_only_field;
use crate::extension::set_core_only_field;

/// An individual animal tracked through its lifecycle stages.
///
/// # Invariants
/// - `stage` transitions are monotonic forward; `retired`/`deceased` are
///   terminal (enforced by the `organism.stage_monotonic` rule).
/// - `housing_id`, when set, must resolve to an existing `HousingUnit`, and
///   the housing unit's capacity rule must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Organism {
    /// Identity and timestamps.
    pub base: Base,
    /// Display name.
    pub name: String,
    /// Species name.
    pub species: String,
    /// Genetic line name.
    pub line: String,
    /// Lifecycle stage.
    pub stage: OrganismStage,
    /// Optional owning cohort.
    pub cohort_id: Option<String>,
    /// Optional housing assignment.
    pub housing_id: Option<String>,
    /// Optional governing protocol.
    pub protocol_id: Option<String>,
    /// Optional owning project.
    pub project_id: Option<String>,
    /// Extension payloads, including the `attributes` hook.
    pub extensions: Container,
}

impl HasBase for Organism {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for Organism {}

impl EntityCodec for Organism {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("species".to_string(), Value::String(self.species.clone()));
        map.insert("line".to_string(), Value::String(self.line.clone()));
        map.insert("stage".to_string(), Value::String(self.stage.as_str().to_string()));
        map.insert("cohort_id".to_string(), self.cohort_id.clone().map_or(Value::Null, Value::String));
        map.insert("housing_id".to_string(), self.housing_id.clone().map_or(Value::Null, Value::String));
        map.insert("protocol_id".to_string(), self.protocol_id.clone().map_or(Value::Null, Value::String));
        map.insert("project_id".to_string(), self.project_id.clone().map_or(Value::Null, Value::String));
        if let Some(attributes) = core_only_field(HOOK_ORGANISM_ATTRIBUTES, &self.extensions) {
            map.insert("attributes".to_string(), attributes);
        }
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "organism", field: "<root>" })?;
        let stage_text = decode_string(map, "organism", "stage")?;
        let mut extensions = Container::new();
        if let Some(attributes) = map.get("attributes") {
            set_core_only_field(HOOK_ORGANISM_ATTRIBUTES, &mut extensions, attributes.clone())?;
        }
        Ok(Self {
            base: decode_base(map, "organism")?,
            name: decode_string(map, "organism", "name")?,
            species: decode_string(map, "organism", "species")?,
            line: decode_string(map, "organism", "line")?,
            stage: OrganismStage::parse(&stage_text)?,
            cohort_id: decode_optional_string(map, "cohort_id"),
            housing_id: decode_optional_string(map, "housing_id"),
            protocol_id: decode_optional_string(map, "protocol_id"),
            project_id: decode_optional_string(map, "project_id"),
            extensions,
        })
    }
}
