// colonycore-core/src/entities/protocol.rs
// ============================================================================
// Module: Protocol Entity
// Description: An approved research protocol capping the number of subjects
// it may govern.
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

/// An approved research protocol.
///
/// # Invariants
/// - Organisms bound to this protocol must not exceed `max_subjects`
///   (enforced by the `protocol.subject_cap` rule).
/// - Deletion is blocked while any `Procedure` or `Permit` references this
///   protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct Protocol {
    /// Identity and timestamps.
    pub base: Base,
    /// Short protocol code.
    pub code: String,
    /// Display title.
    pub title: String,
    /// Maximum number of organisms this protocol may govern at once.
    pub max_subjects: u64,
    /// Status description (e.g. `approved`, `suspended`).
    pub status: String,
}

impl HasBase for Protocol {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for Protocol {}

impl EntityCodec for Protocol {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("code".to_string(), Value::String(self.code.clone()));
        map.insert("title".to_string(), Value::String(self.title.clone()));
        map.insert("max_subjects".to_string(), Value::Number(self.max_subjects.into()));
        map.insert("status".to_string(), Value::String(self.status.clone()));
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "protocol", field: "<root>" })?;
        Ok(Self {
            base: decode_base(map, "protocol")?,
            code: decode_string(map, "protocol", "code")?,
            title: decode_string(map, "protocol", "title")?,
            max_subjects: decode_u64(map, "protocol", "max_subjects")?,
            status: decode_string(map, "protocol", "status")?,
        })
    }
}
