// system-tests/tests/persistence.rs
// ============================================================================
// Module: Persistence Suite
// Description: Aggregates the SQLite adapter parity scenarios.
// Dependencies: suites/*, helpers
// ============================================================================

mod helpers;

#[path = "suites/sqlite_parity.rs"]
mod sqlite_parity;
