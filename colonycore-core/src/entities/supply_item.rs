// colonycore-core/src/entities/supply_item.rs
// ============================================================================
// Module: SupplyItem Entity
// Description: Consumable or durable stock tracked against facilities and
// projects, with a reorder threshold.
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
use crate::entities::decode_u64;
use crate::entities::dedupe_ids;
use crate::entities::encode_string_list;
use crate::extension::Container;
use crate::extension::HOOK_SUPPLY_ITEM_ATTRIBUTES;
use crate::extension::core_only_field;
use crate::extension::set_core_only_field;

/// Consumable or durable stock tracked against facilities and projects.
///
/// # Invariants
/// - `quantity_on_hand` and `reorder_level` are non-negative (guaranteed by
///   the `u64` representation).
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyItem {
    /// Identity and timestamps.
    pub base: Base,
    /// Stock-keeping unit code.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Current quantity on hand.
    pub quantity_on_hand: u64,
    /// Unit of measure (e.g. `box`, `mL`).
    pub unit: String,
    /// Facility identifiers holding this stock, deduplicated at commit.
    pub facility_ids: Vec<String>,
    /// Project identifiers consuming this stock, deduplicated at commit.
    pub project_ids: Vec<String>,
    /// Quantity below which replenishment is due.
    pub reorder_level: u64,
    /// Extension payloads, including the `attributes` hook.
    pub extensions: Container,
}

impl HasBase for SupplyItem {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for SupplyItem {
    fn normalize_id_lists(&mut self) {
        self.facility_ids = dedupe_ids(std::mem::take(&mut self.facility_ids));
        self.project_ids = dedupe_ids(std::mem::take(&mut self.project_ids));
    }
}

impl EntityCodec for SupplyItem {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("sku".to_string(), Value::String(self.sku.clone()));
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("quantity_on_hand".to_string(), Value::Number(self.quantity_on_hand.into()));
        map.insert("unit".to_string(), Value::String(self.unit.clone()));
        map.insert("facility_ids".to_string(), encode_string_list(&self.facility_ids));
        map.insert("project_ids".to_string(), encode_string_list(&self.project_ids));
        map.insert("reorder_level".to_string(), Value::Number(self.reorder_level.into()));
        if let Some(attributes) = core_only_field(HOOK_SUPPLY_ITEM_ATTRIBUTES, &self.extensions) {
            map.insert("attributes".to_string(), attributes);
        }
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "supply_item", field: "<root>" })?;
        let mut extensions = Container::new();
        if let Some(attributes) = map.get("attributes") {
            set_core_only_field(HOOK_SUPPLY_ITEM_ATTRIBUTES, &mut extensions, attributes.clone())?;
        }
        Ok(Self {
            base: decode_base(map, "supply_item")?,
            sku: decode_string(map, "supply_item", "sku")?,
            name: decode_string(map, "supply_item", "name")?,
            quantity_on_hand: decode_u64(map, "supply_item", "quantity_on_hand")?,
            unit: decode_string(map, "supply_item", "unit")?,
            facility_ids: decode_string_list(map, "facility_ids"),
            project_ids: decode_string_list(map, "project_ids"),
            reorder_level: decode_u64(map, "supply_item", "reorder_level")?,
            extensions,
        })
    }
}
