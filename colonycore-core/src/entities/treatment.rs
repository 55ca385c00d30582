// colonycore-core/src/entities/treatment.rs
// ============================================================================
// Module: Treatment Entity
// Description: A treatment applied to organisms under a procedure.
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::entities::Base;
use crate::entities::EntityCodec;
use crate::entities::EntityError;
use crate::entities::HasBase;
use crate::entities::NormalizeIdLists;
use crate::entities::TreatmentStatus;
use crate::entities::decode_base;
use crate::entities::decode_string;
use crate::entities::decode_string_list;
use crate::entities::dedupe_ids;
use crate::entities::encode_string_list;

/// A treatment applied to organisms under a procedure.
///
/// # Invariants
/// - `procedure_id` must resolve to an existing `Procedure`.
/// - Every id in `organism_ids` must resolve to an existing `Organism`.
#[derive(Debug, Clone, PartialEq)]
pub struct Treatment {
    /// Identity and timestamps.
    pub base: Base,
    /// Display name.
    pub name: String,
    /// Lifecycle status.
    pub status: TreatmentStatus,
    /// Governing procedure identifier.
    pub procedure_id: String,
    /// Organism identifiers treated, deduplicated at commit.
    pub organism_ids: Vec<String>,
}

impl HasBase for Treatment {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for Treatment {
    fn normalize_id_lists(&mut self) {
        self.organism_ids = dedupe_ids(std::mem::take(&mut self.organism_ids));
    }
}

impl EntityCodec for Treatment {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("status".to_string(), Value::String(self.status.as_str().to_string()));
        map.insert("procedure_id".to_string(), Value::String(self.procedure_id.clone()));
        map.insert("organism_ids".to_string(), encode_string_list(&self.organism_ids));
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "treatment", field: "<root>" })?;
        let status_text = decode_string(map, "treatment", "status")?;
        Ok(Self {
            base: decode_base(map, "treatment")?,
            name: decode_string(map, "treatment", "name")?,
            status: TreatmentStatus::parse(&status_text)?,
            procedure_id: decode_string(map, "treatment", "procedure_id")?,
            organism_ids: decode_string_list(map, "organism_ids"),
        })
    }
}
