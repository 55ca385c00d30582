// colonycore-core/src/entities/facility.rs
// ============================================================================
// Module: Facility Entity
// Description: Physical site that owns housing units and is referenced by
// samples, permits, and projects.
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
use crate::extension::Container;
use crate::extension::HOOK_FACILITY_ENVIRONMENT_BASELINES;
use crate::extension::core_only_field;
use crate::extension::set_core_only_field;

/// A physical site owning housing units.
///
/// # Invariants
/// - Deletion is blocked while any `HousingUnit`, `Sample`, `Permit`, or
///   `Project` references this facility (enforced by the rules engine).
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    /// Identity and timestamps.
    pub base: Base,
    /// Short facility code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Zone or building designation.
    pub zone: String,
    /// Access policy description.
    pub access_policy: String,
    /// Extension payloads, including the `environment_baselines` hook.
    pub extensions: Container,
}

impl HasBase for Facility {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for Facility {}

impl EntityCodec for Facility {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("code".to_string(), Value::String(self.code.clone()));
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("zone".to_string(), Value::String(self.zone.clone()));
        map.insert("access_policy".to_string(), Value::String(self.access_policy.clone()));
        if let Some(baselines) = core_only_field(HOOK_FACILITY_ENVIRONMENT_BASELINES, &self.extensions) {
            map.insert("environment_baselines".to_string(), baselines);
        }
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "facility", field: "<root>" })?;
        let base = decode_base(map, "facility")?;
        let code = decode_string(map, "facility", "code")?;
        let name = decode_string(map, "facility", "name")?;
        let zone = decode_string(map, "facility", "zone")?;
        let access_policy = decode_string(map, "facility", "access_policy")?;
        let mut extensions = Container::new();
        if let Some(baselines) = map.get("environment_baselines") {
            set_core_only_field(HOOK_FACILITY_ENVIRONMENT_BASELINES, &mut extensions, baselines.clone())?;
        }
        Ok(Self { base, code, name, zone, access_policy, extensions })
    }
}
