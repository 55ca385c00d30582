// colonycore-core/src/store/journal.rs
// ============================================================================
// Module: Change Journal
// Description: Append-only record of mutations applied within one
// transaction, consumed by the rules engine at commit.
// Purpose: Give rules an ordered, replayable view of what changed without
// re-deriving it from before/after snapshot diffs.
// ============================================================================

use crate::entities::AnyEntity;
use crate::entities::EntityKind;

/// The kind of mutation a [`ChangeRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A new entity was created.
    Create,
    /// An existing entity was updated.
    Update,
    /// An existing entity was deleted.
    Delete,
}

/// One mutation applied within the current transaction.
///
/// `before` is `None` for [`Action::Create`]; `after` is `None` for
/// [`Action::Delete`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    /// Kind of entity mutated.
    pub kind: EntityKind,
    /// Identifier of the mutated entity.
    pub id: String,
    /// Kind of mutation.
    pub action: Action,
    /// Pre-mutation value, absent for creates.
    pub before: Option<AnyEntity>,
    /// Post-mutation value, absent for deletes.
    pub after: Option<AnyEntity>,
}

impl ChangeRecord {
    /// Builds a create record.
    #[must_use]
    pub fn created(after: AnyEntity) -> Self {
        Self { kind: after.kind(), id: after.base().id.clone(), action: Action::Create, before: None, after: Some(after) }
    }

    /// Builds an update record.
    #[must_use]
    pub fn updated(before: AnyEntity, after: AnyEntity) -> Self {
        Self { kind: after.kind(), id: after.base().id.clone(), action: Action::Update, before: Some(before), after: Some(after) }
    }

    /// Builds a delete record.
    #[must_use]
    pub fn deleted(before: AnyEntity) -> Self {
        Self { kind: before.kind(), id: before.base().id.clone(), action: Action::Delete, before: Some(before), after: None }
    }
}
