// colonycore-core/src/plugin.rs
// ============================================================================
// Module: Plugin Installation Surface
// Description: The one-time builder a process uses to register
// plugin-supplied rules before any transaction runs.
// Purpose: Keep plugin registration a startup-only concern, separate from
// the frozen `RuleRegistry` the transaction manager evaluates at commit.
// Dependencies: crate::rules
// ============================================================================

//! ## Overview
//! A process wires up [`PluginRegistry`] once at startup: append every
//! plugin's rules, then call [`PluginRegistry::build_rules`] to freeze them
//! into the [`crate::rules::RuleRegistry`] a [`crate::store::MemoryStore`]
//! or `SqliteStore` is constructed with. Plugin rules run after the
//! built-ins, in registration order, preserving the ordering guarantee
//! [`crate::rules::RuleRegistry::with_builtins`] documents. This crate
//! never executes plugin code outside a registered rule's `evaluate` call;
//! dataset templates (the export worker's equivalent extension point) are
//! registered directly against `colonycore_export::DatasetTemplateRegistry`
//! by the same startup code, since templates are an export-worker concept
//! this crate has no dependency on.

use crate::rules::Rule;
use crate::rules::RuleRegistry;

/// Accumulates plugin-supplied rules before the transaction manager is
/// constructed. Not usable once [`PluginRegistry::build_rules`] has
/// consumed it.
#[derive(Default)]
pub struct PluginRegistry {
    /// Plugin rules, in registration order.
    rules: Vec<Box<dyn Rule>>,
}

impl PluginRegistry {
    /// Creates an empty plugin registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plugin rule, to run after the built-ins in registration
    /// order.
    pub fn register_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Freezes this registry into a [`RuleRegistry`] seeded with the
    /// required built-in rules followed by every registered plugin rule,
    /// in registration order.
    #[must_use]
    pub fn build_rules(self) -> RuleRegistry {
        let mut registry = RuleRegistry::with_builtins();
        for rule in self.rules {
            registry.register(rule);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleError;
    use crate::rules::RuleOutcome;
    use crate::rules::Severity;
    use crate::rules::Violation;
    use crate::store::RuleView;
    use crate::store::journal::ChangeRecord;

    struct AlwaysWarns;

    impl Rule for AlwaysWarns {
        fn name(&self) -> &'static str {
            "plugin.always_warns"
        }

        fn evaluate(&self, _view: &dyn RuleView, _changes: &[ChangeRecord]) -> Result<RuleOutcome, RuleError> {
            let mut outcome = RuleOutcome::empty();
            outcome.violations.push(Violation {
                rule: "plugin.always_warns",
                severity: Severity::Warn,
                message: "plugin rule ran".to_string(),
                entity: "facility",
                entity_id: "any".to_string(),
            });
            Ok(outcome)
        }
    }

    #[test]
    fn plugin_rules_run_after_the_built_ins() {
        let mut registry = PluginRegistry::new();
        registry.register_rule(Box::new(AlwaysWarns));
        let rules = registry.build_rules();

        let snapshot = crate::store::snapshot::Snapshot::new();
        let outcome = rules.evaluate_all(&snapshot, &[]).expect("no rule reports an internal failure");
        assert!(!outcome.has_blocking(), "a warn-severity plugin rule must not block an empty transaction");
        assert!(outcome.violations.iter().any(|v| v.rule == "plugin.always_warns"));
    }
}
