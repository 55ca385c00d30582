// system-tests/tests/suites/plugin_installation.rs
// ============================================================================
// Suite: Plugin Installation Surface
// Description: A plugin rule registered before the store is built runs
// after the built-ins, in registration order.
// ============================================================================

use colonycore_core::MemoryStore;
use colonycore_core::PersistentStore;
use colonycore_core::PluginRegistry;
use colonycore_core::Rule;
use colonycore_core::RuleError;
use colonycore_core::RuleOutcome;
use colonycore_core::RuleView;
use colonycore_core::Severity;
use colonycore_core::StoreError;
use colonycore_core::Violation;

use crate::helpers;

/// A plugin rule that blocks any facility whose code is not upper-case.
struct FacilityCodeMustBeUppercase;

impl Rule for FacilityCodeMustBeUppercase {
    fn name(&self) -> &'static str {
        "plugin.facility_code_uppercase"
    }

    fn evaluate(&self, view: &dyn RuleView, _changes: &[colonycore_core::ChangeRecord]) -> Result<RuleOutcome, RuleError> {
        let mut outcome = RuleOutcome::empty();
        for facility in view.list_facilities() {
            if facility.code != facility.code.to_uppercase() {
                outcome.violations.push(Violation {
                    rule: "plugin.facility_code_uppercase",
                    severity: Severity::Block,
                    message: format!("facility {} has a lowercase code", facility.base.id),
                    entity: "facility",
                    entity_id: facility.base.id,
                });
            }
        }
        Ok(outcome)
    }
}

#[test]
fn a_registered_plugin_rule_blocks_alongside_the_built_ins() {
    let mut plugins = PluginRegistry::new();
    plugins.register_rule(Box::new(FacilityCodeMustBeUppercase));
    let store = MemoryStore::with_rules(plugins.build_rules());

    let blocked = store.run_in_transaction(|tx| Ok(tx.create_facility(helpers::facility("f1"))));
    let Err(StoreError::RuleViolation(outcome)) = blocked else {
        panic!("expected the plugin rule to block, got {blocked:?}");
    };
    assert!(outcome.violations.iter().any(|v| v.rule == "plugin.facility_code_uppercase"));

    store
        .run_in_transaction(|tx| Ok(tx.create_facility(helpers::facility("F1"))))
        .expect("an upper-case code still satisfies both the built-ins and the plugin rule");
}
