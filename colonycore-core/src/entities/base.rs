// colonycore-core/src/entities/base.rs
// ============================================================================
// Module: Entity Base
// Description: Identity and timestamp fields embedded in every entity.
// Purpose: Centralize the id/created_at/updated_at lifecycle the transaction
// manager stamps on every mutation.
// ============================================================================

//! ## Overview
//! `Base` is never constructed directly by callers; the transaction manager
//! assigns `id` when absent and stamps `created_at`/`updated_at` on every
//! create and update (see [`crate::store::transaction`]).

use serde_json::Map;
use serde_json::Value;

use crate::timestamp::Timestamp;

/// Identity and lifecycle timestamps embedded in every entity.
///
/// # Invariants
/// - `created_at <= updated_at`.
/// - `id` is immutable after create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base {
    /// Opaque entity identifier, generated if absent on create.
    pub id: String,
    /// Creation timestamp, stamped by the transaction manager.
    pub created_at: Timestamp,
    /// Last-mutation timestamp, stamped by the transaction manager.
    pub updated_at: Timestamp,
}

impl Base {
    /// Builds a placeholder base for a not-yet-created entity. The
    /// transaction manager replaces `id`/`created_at`/`updated_at` during
    /// `create`.
    #[must_use]
    pub fn placeholder() -> Self {
        let now = Timestamp::now();
        Self { id: String::new(), created_at: now, updated_at: now }
    }

    /// Encodes the base fields into an existing JSON object map.
    pub fn encode_into(&self, map: &mut Map<String, Value>) {
        map.insert("id".to_string(), Value::String(self.id.clone()));
        map.insert("created_at".to_string(), Value::String(self.created_at.to_string()));
        map.insert("updated_at".to_string(), Value::String(self.updated_at.to_string()));
    }
}

/// Any type that embeds a [`Base`]. Implemented by every entity so the
/// transaction manager can stamp identity/timestamps generically.
pub trait HasBase {
    /// Returns a reference to the entity's base fields.
    fn base(&self) -> &Base;
    /// Returns a mutable reference to the entity's base fields.
    fn base_mut(&mut self) -> &mut Base;
}
