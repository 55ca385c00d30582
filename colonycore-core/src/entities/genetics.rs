// colonycore-core/src/entities/genetics.rs
// ============================================================================
// Module: Genetic Lineage Entities
// Description: Line, Strain, and GenotypeMarker — genetic lineage metadata
// with multi-plugin extension hooks.
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
use crate::extension::Container;
use crate::extension::HOOK_GENOTYPE_MARKER_ATTRIBUTES;
use crate::extension::HOOK_LINE_DEFAULT_ATTRIBUTES;
use crate::extension::HOOK_LINE_EXTENSION_OVERRIDES;
use crate::extension::HOOK_STRAIN_ATTRIBUTES;
use crate::extension::full_hook_map_field;
use crate::extension::set_full_hook_map_field;

// ============================================================================
// SECTION: Line
// ============================================================================

/// A genetic line: a named lineage that strains descend from.
///
/// # Invariants
/// - `genotype_marker_ids` entries must resolve to existing
///   `GenotypeMarker`s.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Identity and timestamps.
    pub base: Base,
    /// Display name.
    pub name: String,
    /// Species this line belongs to.
    pub species: String,
    /// Genotype marker identifiers carried by this line, deduplicated at
    /// commit.
    pub genotype_marker_ids: Vec<String>,
    /// Default attributes inherited by strains, per plugin.
    pub default_attributes: Container,
    /// Per-plugin overrides of the default attributes.
    pub extension_overrides: Container,
}

impl HasBase for Line {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for Line {
    fn normalize_id_lists(&mut self) {
        self.genotype_marker_ids = dedupe_ids(std::mem::take(&mut self.genotype_marker_ids));
    }
}

impl EntityCodec for Line {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("species".to_string(), Value::String(self.species.clone()));
        map.insert("genotype_marker_ids".to_string(), encode_string_list(&self.genotype_marker_ids));
        map.insert("default_attributes".to_string(), full_hook_map_field(HOOK_LINE_DEFAULT_ATTRIBUTES, &self.default_attributes));
        map.insert("extension_overrides".to_string(), full_hook_map_field(HOOK_LINE_EXTENSION_OVERRIDES, &self.extension_overrides));
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "line", field: "<root>" })?;
        let mut default_attributes = Container::new();
        if let Some(payload) = map.get("default_attributes") {
            set_full_hook_map_field(HOOK_LINE_DEFAULT_ATTRIBUTES, &mut default_attributes, payload)?;
        }
        let mut extension_overrides = Container::new();
        if let Some(payload) = map.get("extension_overrides") {
            set_full_hook_map_field(HOOK_LINE_EXTENSION_OVERRIDES, &mut extension_overrides, payload)?;
        }
        Ok(Self {
            base: decode_base(map, "line")?,
            name: decode_string(map, "line", "name")?,
            species: decode_string(map, "line", "species")?,
            genotype_marker_ids: decode_string_list(map, "genotype_marker_ids"),
            default_attributes,
            extension_overrides,
        })
    }
}

// ============================================================================
// SECTION: Strain
// ============================================================================

/// A strain descending from a genetic line.
///
/// # Invariants
/// - `line_id` must resolve to an existing `Line`.
/// - `genotype_marker_ids` entries must resolve to existing
///   `GenotypeMarker`s.
#[derive(Debug, Clone, PartialEq)]
pub struct Strain {
    /// Identity and timestamps.
    pub base: Base,
    /// Display name.
    pub name: String,
    /// Owning line identifier.
    pub line_id: String,
    /// Genotype marker identifiers carried by this strain, deduplicated at
    /// commit.
    pub genotype_marker_ids: Vec<String>,
    /// Attributes, per plugin.
    pub attributes: Container,
}

impl HasBase for Strain {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for Strain {
    fn normalize_id_lists(&mut self) {
        self.genotype_marker_ids = dedupe_ids(std::mem::take(&mut self.genotype_marker_ids));
    }
}

impl EntityCodec for Strain {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("line_id".to_string(), Value::String(self.line_id.clone()));
        map.insert("genotype_marker_ids".to_string(), encode_string_list(&self.genotype_marker_ids));
        map.insert("attributes".to_string(), full_hook_map_field(HOOK_STRAIN_ATTRIBUTES, &self.attributes));
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "strain", field: "<root>" })?;
        let mut attributes = Container::new();
        if let Some(payload) = map.get("attributes") {
            set_full_hook_map_field(HOOK_STRAIN_ATTRIBUTES, &mut attributes, payload)?;
        }
        Ok(Self {
            base: decode_base(map, "strain")?,
            name: decode_string(map, "strain", "name")?,
            line_id: decode_string(map, "strain", "line_id")?,
            genotype_marker_ids: decode_string_list(map, "genotype_marker_ids"),
            attributes,
        })
    }
}

// ============================================================================
// SECTION: GenotypeMarker
// ============================================================================

/// A single genotype marker referenced by lines and strains.
#[derive(Debug, Clone, PartialEq)]
pub struct GenotypeMarker {
    /// Identity and timestamps.
    pub base: Base,
    /// Display name.
    pub name: String,
    /// Marker locus description.
    pub locus: String,
    /// Attributes, per plugin.
    pub attributes: Container,
}

impl HasBase for GenotypeMarker {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl NormalizeIdLists for GenotypeMarker {}

impl EntityCodec for GenotypeMarker {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        self.base.encode_into(&mut map);
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("locus".to_string(), Value::String(self.locus.clone()));
        map.insert("attributes".to_string(), full_hook_map_field(HOOK_GENOTYPE_MARKER_ATTRIBUTES, &self.attributes));
        Value::Object(map)
    }

    fn decode(value: &Value) -> Result<Self, EntityError> {
        let map = value.as_object().ok_or(EntityError::MissingField { entity: "genotype_marker", field: "<root>" })?;
        let mut attributes = Container::new();
        if let Some(payload) = map.get("attributes") {
            set_full_hook_map_field(HOOK_GENOTYPE_MARKER_ATTRIBUTES, &mut attributes, payload)?;
        }
        Ok(Self {
            base: decode_base(map, "genotype_marker")?,
            name: decode_string(map, "genotype_marker", "name")?,
            locus: decode_string(map, "genotype_marker", "locus")?,
            attributes,
        })
    }
}
