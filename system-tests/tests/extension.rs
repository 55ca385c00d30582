// system-tests/tests/extension.rs
// ============================================================================
// Module: Extension Suite
// Description: Aggregates the extension-payload round-trip scenarios.
// Dependencies: suites/*, helpers
// ============================================================================

mod helpers;

#[path = "suites/extension_round_trip.rs"]
mod extension_round_trip;
