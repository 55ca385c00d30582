// system-tests/tests/domain.rs
// ============================================================================
// Module: Domain Suite
// Description: Aggregates the rules-engine scenarios into one binary.
// Dependencies: suites/*, helpers
// ============================================================================

mod helpers;

#[path = "suites/housing_capacity.rs"]
mod housing_capacity;

#[path = "suites/referential_integrity.rs"]
mod referential_integrity;

#[path = "suites/observation_context.rs"]
mod observation_context;

#[path = "suites/plugin_installation.rs"]
mod plugin_installation;
