// colonycore-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Persistent Store
// Description: SQL-backed PersistentStore adapter.
// Purpose: Provide production-grade persistence for the ColonyCore domain
// kernel, behaviorally identical to the in-memory reference adapter.
// Dependencies: colonycore-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a `SQLite`-backed [`SqliteStore`] implementing
//! [`colonycore_core::PersistentStore`]. It reuses `colonycore-core`'s
//! [`colonycore_core::Transaction`] and [`colonycore_core::RuleRegistry`]
//! unchanged: the adapter's only job is loading a [`colonycore_core::Snapshot`]
//! from the backing tables before a transaction and persisting the
//! transaction's change journal back to those tables inside a native
//! `SQLite` transaction after the rules engine clears it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteJournalMode;
pub use store::SqliteStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;
