// colonycore-core/src/entities/permit.rs
// ============================================================================
// Module: Permit Entity
// Description: A regulatory permit authorizing work at facilities under
// protocols for a bounded validity window.
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::entities::Base;
use crate::entities::EntityCodec;
use crate::entities::EntityError;
use crate::entities::HasBase;
use crate::entities::NormalizeIdLists;
use crate::entities::PermitStatus;
use crate::entities::decode_base;
use crate::entities::decode_string;
use crate::entities::decode_string_list;
use crate::entities::decode_timestamp;
use crate::entities::dedupe_ids;
use crate::entities::encode_string_list;
use crate::timestamp::Timestamp;

/// A regulatory permit authorizing work at facilities under protocols.
///
/// # Invariants
/// - `valid_from <= valid_until`.
/// - Every id in `facility_ids`/`protocol_ids` must resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct Permit {
    /// Identity and timestamps.
    pub base: Base,
    /// Permit number issued by the authority.
    pub permit_number: String,
    /// Issuing authority name.
    pub authority: String,
    /// Lifecycle status.
    pub status: PermitStatus,
    /// Validity window start.
    pub valid_from: Timestamp,
    /// Validity window end.
    pub valid_until: Timestamp,
    /// Facility identifiers covered, deduplicated at commit.
    pub facility_ids: Vec<String>,
    /// Protocol identifiers covered, deduplicated at commit.
    pub protocol_ids: Vec<String>,
}

impl Permit {
    /// Validates that `valid_from <= valid_until`.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::InvalidRange`] when the window is inverted.
    pub fn validate_window(&self) -> Result<(), EntityError> {
        if self.valid_from <= self.valid_until {
            Ok(())
        } else {
            Err(EntityError::InvalidRange { entity: "permit", message: "valid_from must not be after valid_until".to_string() })
        }
    }
}

impl HasBase for Permit {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for Permit {
    fn normalize_id_lists(&mut self) {
        self.facility_ids = dedupe_ids(std::mem::take(&mut self.facility_ids));
        self.protocol_ids = dedupe_ids(std::mem::take(&mut self.protocol_ids));
    }
}

impl EntityCodec for Permit {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("permit_number".to_string(), Value::String(self.permit_number.clone()));
        map.insert("authority".to_string(), Value::String(self.authority.clone()));
        map.insert("status".to_string(), Value::String(self.status.as_str().to_string()));
        map.insert("valid_from".to_string(), Value::String(self.valid_from.to_string()));
        map.insert("valid_until".to_string(), Value::String(self.valid_until.to_string()));
        map.insert("facility_ids".to_string(), encode_string_list(&self.facility_ids));
        map.insert("protocol_ids".to_string(), encode_string_list(&self.protocol_ids));
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "permit", field: "<root>" })?;
        let status_text = decode_string(map, "permit", "status")?;
        let permit = Self {
            base: decode_base(map, "permit")?,
            permit_number: decode_string(map, "permit", "permit_number")?,
            authority: decode_string(map, "permit", "authority")?,
            status: PermitStatus::parse(&status_text)?,
            valid_from: decode_timestamp(map, "permit", "valid_from")?,
            valid_until: decode_timestamp(map, "permit", "valid_until")?,
            facility_ids: decode_string_list(map, "facility_ids"),
            protocol_ids: decode_string_list(map, "protocol_ids"),
        };
        permit.validate_window()?;
        Ok(permit)
    }
}
