// colonycore-core/src/entities/project.rs
// ============================================================================
// Module: Project Entity
// Description: An administrative grouping of facilities, protocols,
// organisms, procedures, and supply under a funded research effort.
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
use crate::entities::decode_string_list;
use crate::entities::dedupe_ids;
use crate::entities::encode_string_list;

/// An administrative grouping of facilities, protocols, organisms,
/// procedures, and supply under a funded research effort.
///
/// # Invariants
/// - Deletion is blocked while any `SupplyItem` references this project.
/// - Every id in the reference lists must resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Identity and timestamps.
    pub base: Base,
    /// Short project code.
    pub code: String,
    /// Display title.
    pub title: String,
    /// Facility identifiers in scope, deduplicated at commit.
    pub facility_ids: Vec<String>,
    /// Protocol identifiers in scope, deduplicated at commit.
    pub protocol_ids: Vec<String>,
    /// Organism identifiers in scope, deduplicated at commit.
    pub organism_ids: Vec<String>,
    /// Procedure identifiers in scope, deduplicated at commit.
    pub procedure_ids: Vec<String>,
    /// Supply item identifiers in scope, deduplicated at commit.
    pub supply_item_ids: Vec<String>,
}

impl HasBase for Project {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for Project {
    fn normalize_id_lists(&mut self) {
        self.facility_ids = dedupe_ids(std::mem::take(&mut self.facility_ids));
        self.protocol_ids = dedupe_ids(std::mem::take(&mut self.protocol_ids));
        self.organism_ids = dedupe_ids(std::mem::take(&mut self.organism_ids));
        self.procedure_ids = dedupe_ids(std::mem::take(&mut self.procedure_ids));
        self.supply_item_ids = dedupe_ids(std::mem::take(&mut self.supply_item_ids));
    }
}

impl EntityCodec for Project {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("code".to_string(), Value::String(self.code.clone()));
        map.insert("title".to_string(), Value::String(self.title.clone()));
        map.insert("facility_ids".to_string(), encode_string_list(&self.facility_ids));
        map.insert("protocol_ids".to_string(), encode_string_list(&self.protocol_ids));
        map.insert("organism_ids".to_string(), encode_string_list(&self.organism_ids));
        map.insert("procedure_ids".to_string(), encode_string_list(&self.procedure_ids));
        map.insert("supply_item_ids".to_string(), encode_string_list(&self.supply_item_ids));
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "project", field: "<root>" })?;
        Ok(Self {
            base: decode_base(map, "project")?,
            code: decode_string(map, "project", "code")?,
            title: decode_string(map, "project", "title")?,
            facility_ids: decode_string_list(map, "facility_ids"),
            protocol_ids: decode_string_list(map, "protocol_ids"),
            organism_ids: decode_string_list(map, "organism_ids"),
            procedure_ids: decode_string_list(map, "procedure_ids"),
            supply_item_ids: decode_string_list(map, "supply_item_ids"),
        })
    }
}
