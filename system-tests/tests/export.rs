// system-tests/tests/export.rs
// ============================================================================
// Module: Export Suite
// Description: Aggregates the dataset export worker scenarios.
// Dependencies: suites/*, helpers
// ============================================================================

mod helpers;

#[path = "suites/export_worker.rs"]
mod export_worker;
