// colonycore-core/src/entities/procedure.rs
// ============================================================================
// Module: Procedure Entity
// Description: A scheduled or in-progress procedure performed under a
// protocol, referencing treatments and observations.
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::entities::Base;
use crate::entities::EntityCodec;
use crate::entities::EntityError;
use crate::entities::HasBase;
use crate::entities::NormalizeIdLists;
use crate::entities::ProcedureStatus;
use crate::entities::decode_base;
use crate::entities::decode_string;
use crate::entities::decode_string_list;
use crate::entities::decode_timestamp;
use crate::entities::dedupe_ids;
use crate::entities::encode_string_list;
use crate::timestamp::Timestamp;

/// A scheduled or in-progress procedure performed under a protocol.
///
/// # Invariants
/// - `protocol_id` must resolve to an existing `Protocol`.
/// - Deletion is blocked while any `Treatment` or `Observation` references
///   this procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    /// Identity and timestamps.
    pub base: Base,
    /// Display name.
    pub name: String,
    /// Lifecycle status.
    pub status: ProcedureStatus,
    /// Scheduled execution time.
    pub scheduled_at: Timestamp,
    /// Governing protocol identifier.
    pub protocol_id: String,
    /// Organism identifiers involved, deduplicated at commit.
    pub organism_ids: Vec<String>,
    /// Treatment identifiers produced by this procedure, deduplicated at
    /// commit.
    pub treatment_ids: Vec<String>,
    /// Observation identifiers recorded against this procedure, deduplicated
    /// at commit.
    pub observation_ids: Vec<String>,
}

impl HasBase for Procedure {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for Procedure {
    fn normalize_id_lists(&mut self) {
        self.organism_ids = dedupe_ids(std::mem::take(&mut self.organism_ids));
        self.treatment_ids = dedupe_ids(std::mem::take(&mut self.treatment_ids));
        self.observation_ids = dedupe_ids(std::mem::take(&mut self.observation_ids));
    }
}

impl EntityCodec for Procedure {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("status".to_string(), Value::String(self.status.as_str().to_string()));
        map.insert("scheduled_at".to_string(), Value::String(self.scheduled_at.to_string()));
        map.insert("protocol_id".to_string(), Value::String(self.protocol_id.clone()));
        map.insert("organism_ids".to_string(), encode_string_list(&self.organism_ids));
        map.insert("treatment_ids".to_string(), encode_string_list(&self.treatment_ids));
        map.insert("observation_ids".to_string(), encode_string_list(&self.observation_ids));
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "procedure", field: "<root>" })?;
        let status_text = decode_string(map, "procedure", "status")?;
        Ok(Self {
            base: decode_base(map, "procedure")?,
            name: decode_string(map, "procedure", "name")?,
            status: ProcedureStatus::parse(&status_text)?,
            scheduled_at: decode_timestamp(map, "procedure", "scheduled_at")?,
            protocol_id: decode_string(map, "procedure", "protocol_id")?,
            organism_ids: decode_string_list(map, "organism_ids"),
            treatment_ids: decode_string_list(map, "treatment_ids"),
            observation_ids: decode_string_list(map, "observation_ids"),
        })
    }
}
