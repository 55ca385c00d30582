// colonycore-core/src/extension.rs
// ============================================================================
// Module: Extension Registry & Container
// Description: Hook registry plus the Container/ObjectPayload/Slot types
// that let plugins attach schema-constrained data to core entities.
// Purpose: Give species-specific plugins a place to store data without
// forking the entity schema.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Hooks are statically registered `entity.<entity>.<field>` slots. Each
//! hook declares the shape its payloads must have (object, array, or
//! scalar). [`Container`] stores, per entity instance, a `Hook -> PluginId ->
//! Payload` map with deep-clone isolation on every read and write so that
//! no caller can mutate state it does not own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::ids::PluginId;

// ============================================================================
// SECTION: Hook Shapes
// ============================================================================

/// The top-level JSON shape a hook's payloads must take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Payload must be a JSON object.
    Object,
    /// Payload must be a JSON array.
    Array,
    /// Payload must be a JSON scalar (string, number, bool, or null).
    Scalar,
}

impl Shape {
    /// Returns true if `value` matches this shape.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Scalar => !value.is_object() && !value.is_array(),
        }
    }

    /// Returns a human-readable name for error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::Scalar => "scalar",
        }
    }
}

// ============================================================================
// SECTION: Hook Registry
// ============================================================================

/// Static descriptor for one registered hook.
#[derive(Debug, Clone, Copy)]
pub struct HookDescriptor {
    /// Full hook key, e.g. `entity.organism.attributes`.
    pub key: &'static str,
    /// Owning entity name.
    pub entity: &'static str,
    /// Logical field name on the owning entity.
    pub field: &'static str,
    /// Human-readable description of the hook's purpose.
    pub description: &'static str,
    /// Required payload shape.
    pub shape: Shape,
}

/// The finite set of hooks ColonyCore recognizes.
///
/// Unknown hooks are rejected at every boundary: [`Container::set`],
/// [`Container::from_wire`], and [`Hook::parse`] all consult this table.
pub const HOOK_REGISTRY: &[HookDescriptor] = &[
    HookDescriptor {
        key: "entity.facility.environment_baselines",
        entity: "facility",
        field: "environment_baselines",
        description: "Baseline environmental parameters for a facility.",
        shape: Shape::Object,
    },
    HookDescriptor {
        key: "entity.organism.attributes",
        entity: "organism",
        field: "attributes",
        description: "Species-specific attributes for an organism.",
        shape: Shape::Object,
    },
    HookDescriptor {
        key: "entity.breeding_unit.pairing_attributes",
        entity: "breeding_unit",
        field: "pairing_attributes",
        description: "Pairing-specific attributes for a breeding unit.",
        shape: Shape::Object,
    },
    HookDescriptor {
        key: "entity.observation.data",
        entity: "observation",
        field: "data",
        description: "Free-form observation payload.",
        shape: Shape::Object,
    },
    HookDescriptor {
        key: "entity.sample.attributes",
        entity: "sample",
        field: "attributes",
        description: "Species-specific attributes for a sample.",
        shape: Shape::Object,
    },
    HookDescriptor {
        key: "entity.supply_item.attributes",
        entity: "supply_item",
        field: "attributes",
        description: "Supplier- or plugin-specific attributes for a supply item.",
        shape: Shape::Object,
    },
    HookDescriptor {
        key: "entity.line.default_attributes",
        entity: "line",
        field: "default_attributes",
        description: "Default genetic-lineage attributes inherited by strains.",
        shape: Shape::Object,
    },
    HookDescriptor {
        key: "entity.line.extension_overrides",
        entity: "line",
        field: "extension_overrides",
        description: "Per-plugin overrides of a line's default attributes.",
        shape: Shape::Object,
    },
    HookDescriptor {
        key: "entity.strain.attributes",
        entity: "strain",
        field: "attributes",
        description: "Species-specific attributes for a strain.",
        shape: Shape::Object,
    },
    HookDescriptor {
        key: "entity.genotype_marker.attributes",
        entity: "genotype_marker",
        field: "attributes",
        description: "Species-specific attributes for a genotype marker.",
        shape: Shape::Object,
    },
];

/// Looks up a hook descriptor by its key.
#[must_use]
pub fn lookup_hook(key: &str) -> Option<&'static HookDescriptor> {
    HOOK_REGISTRY.iter().find(|descriptor| descriptor.key == key)
}

// ============================================================================
// SECTION: Named Hook Constants
// ============================================================================

/// `entity.facility.environment_baselines` hook handle.
pub const HOOK_FACILITY_ENVIRONMENT_BASELINES: Hook = Hook::from_static("entity.facility.environment_baselines");
/// `entity.organism.attributes` hook handle.
pub const HOOK_ORGANISM_ATTRIBUTES: Hook = Hook::from_static("entity.organism.attributes");
/// `entity.breeding_unit.pairing_attributes` hook handle.
pub const HOOK_BREEDING_UNIT_PAIRING_ATTRIBUTES: Hook = Hook::from_static("entity.breeding_unit.pairing_attributes");
/// `entity.observation.data` hook handle.
pub const HOOK_OBSERVATION_DATA: Hook = Hook::from_static("entity.observation.data");
/// `entity.sample.attributes` hook handle.
pub const HOOK_SAMPLE_ATTRIBUTES: Hook = Hook::from_static("entity.sample.attributes");
/// `entity.supply_item.attributes` hook handle.
pub const HOOK_SUPPLY_ITEM_ATTRIBUTES: Hook = Hook::from_static("entity.supply_item.attributes");
/// `entity.line.default_attributes` hook handle.
pub const HOOK_LINE_DEFAULT_ATTRIBUTES: Hook = Hook::from_static("entity.line.default_attributes");
/// `entity.line.extension_overrides` hook handle.
pub const HOOK_LINE_EXTENSION_OVERRIDES: Hook = Hook::from_static("entity.line.extension_overrides");
/// `entity.strain.attributes` hook handle.
pub const HOOK_STRAIN_ATTRIBUTES: Hook = Hook::from_static("entity.strain.attributes");
/// `entity.genotype_marker.attributes` hook handle.
pub const HOOK_GENOTYPE_MARKER_ATTRIBUTES: Hook = Hook::from_static("entity.genotype_marker.attributes");

#[cfg(test)]
mod hook_constant_tests {
    use super::*;

    #[test]
    fn hook_registry_round_trip() {
        let constants = [
            HOOK_FACILITY_ENVIRONMENT_BASELINES,
            HOOK_ORGANISM_ATTRIBUTES,
            HOOK_BREEDING_UNIT_PAIRING_ATTRIBUTES,
            HOOK_OBSERVATION_DATA,
            HOOK_SAMPLE_ATTRIBUTES,
            HOOK_SUPPLY_ITEM_ATTRIBUTES,
            HOOK_LINE_DEFAULT_ATTRIBUTES,
            HOOK_LINE_EXTENSION_OVERRIDES,
            HOOK_STRAIN_ATTRIBUTES,
            HOOK_GENOTYPE_MARKER_ATTRIBUTES,
        ];
        for hook in constants {
            assert_eq!(Hook::parse(hook.as_str()).as_ref(), Ok(&hook));
        }
        assert_eq!(constants.len(), HOOK_REGISTRY.len());
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the extension container and its supporting types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtensionError {
    /// The hook key is not in [`HOOK_REGISTRY`].
    #[error("unknown extension hook: {0}")]
    UnknownHook(String),
    /// A plugin id was empty.
    #[error("plugin id must not be empty")]
    EmptyPluginId,
    /// A payload did not match the hook's declared shape.
    #[error("payload for hook {hook} must be {expected}, got {actual}")]
    ShapeMismatch {
        /// Hook key the payload was set against.
        hook: String,
        /// Expected shape name.
        expected: &'static str,
        /// Actual shape name observed.
        actual: &'static str,
    },
    /// An `ObjectPayload` was used against a hook it was not constructed for.
    #[error("object payload bound to hook {bound} used against hook {used}")]
    HookMismatch {
        /// Hook the payload was constructed for.
        bound: String,
        /// Hook the payload was checked against.
        used: String,
    },
}

// ============================================================================
// SECTION: Hook Handle
// ============================================================================

/// A validated reference to one registered hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hook(&'static str);

impl Hook {
    /// Parses and validates a hook key against [`HOOK_REGISTRY`].
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::UnknownHook`] when the key is not
    /// registered.
    pub fn parse(key: &str) -> Result<Self, ExtensionError> {
        lookup_hook(key)
            .map(|descriptor| Self(descriptor.key))
            .ok_or_else(|| ExtensionError::UnknownHook(key.to_string()))
    }

    /// Wraps a compile-time hook key without a registry lookup.
    ///
    /// Only used for the named constants below, each of which is checked
    /// against [`HOOK_REGISTRY`] by the `hook_registry_round_trip` test.
    const fn from_static(key: &'static str) -> Self {
        Self(key)
    }

    /// Returns the hook's key string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// Returns the hook's registry descriptor.
    #[must_use]
    pub fn descriptor(self) -> &'static HookDescriptor {
        lookup_hook(self.0).unwrap_or_else(|| {
            // Unreachable: `Hook` values are only constructed via `parse`,
            // which already validated membership in `HOOK_REGISTRY`.
            &HOOK_REGISTRY[0]
        })
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// ============================================================================
// SECTION: Container
// ============================================================================

/// Per-entity store of `Hook -> PluginId -> Payload`.
///
/// # Invariants
/// - Every read returns a deep clone; callers can never mutate stored state.
/// - An empty plugin map for a hook is never retained; [`Container::remove`]
///   drops the hook entry once its last plugin is removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    hooks: BTreeMap<Hook, BTreeMap<PluginId, Value>>,
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a plugin's payload for a hook, validating the hook is known,
    /// the plugin id is non-empty, and the value matches the hook's shape.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::EmptyPluginId`] or
    /// [`ExtensionError::ShapeMismatch`] when validation fails.
    pub fn set(&mut self, hook: Hook, plugin: &PluginId, value: Value) -> Result<(), ExtensionError> {
        if plugin.as_str().is_empty() {
            return Err(ExtensionError::EmptyPluginId);
        }
        let shape = hook.descriptor().shape;
        if !shape.matches(&value) {
            return Err(ExtensionError::ShapeMismatch {
                hook: hook.to_string(),
                expected: shape.name(),
                actual: shape_name_of(&value),
            });
        }
        self.hooks.entry(hook).or_default().insert(plugin.clone(), value);
        Ok(())
    }

    /// Returns a deep clone of a plugin's payload for a hook, and whether it
    /// was present.
    #[must_use]
    pub fn get(&self, hook: Hook, plugin: &PluginId) -> (Value, bool) {
        match self.hooks.get(&hook).and_then(|plugins| plugins.get(plugin)) {
            Some(value) => (value.clone(), true),
            None => (Value::Null, false),
        }
    }

    /// Removes a plugin's payload for a hook. Drops the hook entry entirely
    /// once its plugin map is empty.
    pub fn remove(&mut self, hook: Hook, plugin: &PluginId) {
        if let Some(plugins) = self.hooks.get_mut(&hook) {
            plugins.remove(plugin);
            if plugins.is_empty() {
                self.hooks.remove(&hook);
            }
        }
    }

    /// Returns the lexicographically sorted plugin ids populated for a hook.
    #[must_use]
    pub fn plugins(&self, hook: Hook) -> Vec<PluginId> {
        self.hooks.get(&hook).map(|plugins| plugins.keys().cloned().collect()).unwrap_or_default()
    }

    /// Returns the sorted list of hooks with at least one plugin payload.
    #[must_use]
    pub fn hooks(&self) -> Vec<Hook> {
        self.hooks.keys().copied().collect()
    }

    /// Returns true if no hook in this container has any payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Serializes this container to its raw wire form: `{hook: {plugin:
    /// payload}}`.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        let mut outer = Map::new();
        for (hook, plugins) in &self.hooks {
            let mut inner = Map::new();
            for (plugin, value) in plugins {
                inner.insert(plugin.as_str().to_string(), value.clone());
            }
            outer.insert(hook.to_string(), Value::Object(inner));
        }
        Value::Object(outer)
    }

    /// Parses the raw wire form, rejecting unknown hooks or empty plugin
    /// ids.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::UnknownHook`] or
    /// [`ExtensionError::EmptyPluginId`] on invalid input.
    pub fn from_wire(value: &Value) -> Result<Self, ExtensionError> {
        let mut container = Self::new();
        let Value::Object(outer) = value else {
            return Ok(container);
        };
        for (hook_key, plugins_value) in outer {
            let hook = Hook::parse(hook_key)?;
            let Value::Object(plugins) = plugins_value else {
                continue;
            };
            for (plugin_key, payload) in plugins {
                let plugin = PluginId::new(plugin_key.clone());
                container.set(hook, &plugin, payload.clone())?;
            }
        }
        Ok(container)
    }
}

/// Returns the [`Shape`] name matching a JSON value's top-level kind.
fn shape_name_of(value: &Value) -> &'static str {
    if value.is_object() {
        Shape::Object.name()
    } else if value.is_array() {
        Shape::Array.name()
    } else {
        Shape::Scalar.name()
    }
}

// ============================================================================
// SECTION: Object Payload
// ============================================================================

/// A typed wrapper around one hook's object payload.
///
/// Distinguishes "unset" from "set to an empty object" via `defined`, and
/// is always obtained by defensive clone from a [`Container`].
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPayload {
    hook: Hook,
    value: Map<String, Value>,
    defined: bool,
}

impl ObjectPayload {
    /// Builds an object payload bound to `hook` from a container entry.
    #[must_use]
    pub fn from_container(hook: Hook, container: &Container, plugin: &PluginId) -> Self {
        let (value, defined) = container.get(hook, plugin);
        let value = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { hook, value, defined }
    }

    /// Returns whether the payload was present (as opposed to defaulted to
    /// empty).
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        self.defined
    }

    /// Returns a reference to the underlying object map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.value
    }

    /// Verifies this payload was constructed for `hook`, preventing
    /// cross-hook aliasing bugs.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::HookMismatch`] when `hook` differs from the
    /// hook this payload was built for.
    pub fn expect_hook(&self, hook: Hook) -> Result<(), ExtensionError> {
        if self.hook == hook {
            Ok(())
        } else {
            Err(ExtensionError::HookMismatch { bound: self.hook.to_string(), used: hook.to_string() })
        }
    }
}

// ============================================================================
// SECTION: Slot
// ============================================================================

/// A single-hook, `plugin -> payload` view bound to one hook identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slot {
    hook: Option<Hook>,
    payloads: BTreeMap<PluginId, Value>,
}

impl Slot {
    /// Hydrates a slot from a container's entries for `hook`.
    #[must_use]
    pub fn from_container(hook: Hook, container: &Container) -> Self {
        let payloads = container.hooks.get(&hook).cloned().unwrap_or_default();
        Self { hook: Some(hook), payloads }
    }

    /// Produces a container holding only this slot's hook, or an empty
    /// container if the slot has no payloads.
    #[must_use]
    pub fn into_container(self) -> Container {
        let mut container = Container::new();
        if let Some(hook) = self.hook {
            if !self.payloads.is_empty() {
                container.hooks.insert(hook, self.payloads);
            }
        }
        container
    }

    /// Returns true if the slot has no plugin payloads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

// ============================================================================
// SECTION: Wire Helpers For Core-Flattened Fields
// ============================================================================

/// Returns the `Core` plugin's object payload for `hook`, or `None` when
/// undefined. Used by entities whose wire form flattens only the `Core`
/// plugin's payload into a named field (for example `organism.attributes`).
///
/// Callers must omit the wire field entirely when this returns `None`, so
/// that an entity with an undefined Core bag round-trips back to an
/// undefined Core bag rather than gaining a defined-empty one.
#[must_use]
pub fn core_only_field(hook: Hook, container: &Container) -> Option<Value> {
    let (value, defined) = container.get(hook, &PluginId::core());
    if !defined {
        return None;
    }
    match value {
        Value::Object(_) => Some(value),
        _ => Some(Value::Object(Map::new())),
    }
}

/// Sets the `Core` plugin's object payload for `hook` from a decoded wire
/// value.
///
/// # Errors
///
/// Returns [`ExtensionError::ShapeMismatch`] when `value` is not an object.
pub fn set_core_only_field(hook: Hook, container: &mut Container, value: Value) -> Result<(), ExtensionError> {
    container.set(hook, &PluginId::core(), value)
}

/// Returns `{pluginID: payload}` for `hook`, including the `Core` plugin as
/// a regular key. Used by entities that expose the full multi-plugin map
/// on the wire (Line, Strain, GenotypeMarker).
#[must_use]
pub fn full_hook_map_field(hook: Hook, container: &Container) -> Value {
    let mut map = Map::new();
    if let Some(plugins) = container.hooks.get(&hook) {
        for (plugin, value) in plugins {
            map.insert(plugin.as_str().to_string(), value.clone());
        }
    }
    Value::Object(map)
}

/// Replaces all plugin payloads for `hook` from a decoded `{pluginID:
/// payload}` wire value.
///
/// # Errors
///
/// Returns [`ExtensionError::EmptyPluginId`] or
/// [`ExtensionError::ShapeMismatch`] when a plugin key is empty or a
/// payload's shape does not match.
pub fn set_full_hook_map_field(hook: Hook, container: &mut Container, value: &Value) -> Result<(), ExtensionError> {
    container.hooks.remove(&hook);
    let Value::Object(map) = value else {
        return Ok(());
    };
    for (plugin_key, payload) in map {
        let plugin = PluginId::new(plugin_key.clone());
        container.set(hook, &plugin, payload.clone())?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Serde Passthrough For Storage
// ============================================================================

impl Serialize for Container {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Container {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_wire(&value).map_err(serde::de::Error::custom)
    }
}
