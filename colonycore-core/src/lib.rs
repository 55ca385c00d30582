// colonycore-core/src/lib.rs
// ============================================================================
// Module: ColonyCore Core Library
// Description: Public API surface for the ColonyCore transactional domain
// kernel.
// Purpose: Expose the entity model, extension system, rules engine,
// transaction manager, and in-memory store adapter.
// Dependencies: crate::{entities, extension, ids, rules, store, timestamp}
// ============================================================================

//! ## Overview
//! ColonyCore's core kernel is a transactional, rule-evaluating domain
//! store with a typed plugin-extension mechanism. This crate owns:
//!
//! - The [`extension`] registry and container that let species-specific
//!   plugins attach schema-constrained JSON payloads to core entities.
//! - The [`entities`] model: typed records with identity, lifecycle, and a
//!   stable flattening JSON codec.
//! - The [`rules`] engine: an ordered, severity-driven gate evaluated at
//!   commit time.
//! - The [`plugin`] installation surface: a one-time builder that appends
//!   plugin rules onto the built-ins before the transaction manager is
//!   constructed.
//! - The [`store`] module: the transaction manager, change journal, and the
//!   in-memory reference [`store::MemoryStore`] adapter. SQL-backed storage
//!   lives in the separate `colonycore-store-sqlite` crate, sharing this
//!   crate's [`store::PersistentStore`] contract.
//!
//! This crate never executes plugin code outside the registered extension
//! points (rules, dataset templates, hook schemas); it has no knowledge of
//! any particular transport (HTTP/CLI) or blob store backend.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod entities;
pub mod extension;
pub mod ids;
pub mod plugin;
pub mod rules;
pub mod store;
pub mod timestamp;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use entities::AnyEntity;
pub use entities::Base;
pub use entities::BreedingUnit;
pub use entities::Cohort;
pub use entities::EntityCodec;
pub use entities::EntityError;
pub use entities::EntityKind;
pub use entities::Facility;
pub use entities::GenotypeMarker;
pub use entities::HasBase;
pub use entities::HousingUnit;
pub use entities::Line;
pub use entities::NormalizeIdLists;
pub use entities::Observation;
pub use entities::Organism;
pub use entities::OrganismStage;
pub use entities::Permit;
pub use entities::PermitStatus;
pub use entities::Procedure;
pub use entities::ProcedureStatus;
pub use entities::Project;
pub use entities::Protocol;
pub use entities::Sample;
pub use entities::SampleStatus;
pub use entities::Strain;
pub use entities::SupplyItem;
pub use entities::Treatment;
pub use entities::TreatmentStatus;
pub use entities::dedupe_ids;
pub use extension::Container;
pub use extension::ExtensionError;
pub use extension::Hook;
pub use extension::HookDescriptor;
pub use extension::ObjectPayload;
pub use extension::Shape;
pub use extension::Slot;
pub use ids::PluginId;
pub use plugin::PluginRegistry;
pub use rules::Rule;
pub use rules::RuleError;
pub use rules::RuleOutcome;
pub use rules::RuleRegistry;
pub use rules::Severity;
pub use rules::Violation;
pub use store::Action;
pub use store::ChangeRecord;
pub use store::MemoryStore;
pub use store::PersistentStore;
pub use store::RuleView;
pub use store::Snapshot;
pub use store::StoreError;
pub use store::Transaction;
pub use store::TransactionView;
pub use timestamp::Timestamp;
