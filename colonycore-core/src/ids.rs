// colonycore-core/src/ids.rs
// ============================================================================
// Module: ColonyCore Identifiers
// Description: The reserved plugin identifier and its wire form.
// Purpose: Give extension payloads a stable contributor identity, with a
// reserved `Core` value for an entity's native attribute bag.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Cross-entity references (`housing_id`, `organism_ids`, ...) are plain
//! `String`s; referential integrity is enforced by the rules engine rather
//! than by a typed-pointer layer (see [`crate::rules::builtins`]). The one
//! identifier that earns its own type is [`PluginId`], which keys extension
//! payloads and carries a reserved [`PluginId::core`] value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Plugin Identifier
// ============================================================================

/// Identifier for the contributor of an extension payload.
///
/// # Invariants
/// - Must be non-empty outside of the reserved [`PluginId::core`] value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(String);

impl PluginId {
    /// Reserved plugin identifier representing an entity's native bag.
    pub const CORE: &'static str = "Core";

    /// Creates a plugin identifier from a caller-supplied value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the reserved `Core` plugin identifier.
    #[must_use]
    pub fn core() -> Self {
        Self(Self::CORE.to_string())
    }

    /// Returns true if this is the reserved `Core` plugin identifier.
    #[must_use]
    pub fn is_core(&self) -> bool {
        self.0 == Self::CORE
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PluginId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_is_reserved_and_recognized() {
        let core = PluginId::core();
        assert!(core.is_core());
        assert_eq!(core.as_str(), "Core");
        assert!(!PluginId::new("frog-plugin").is_core());
    }
}
