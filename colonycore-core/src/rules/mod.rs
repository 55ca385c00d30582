// colonycore-core/src/rules/mod.rs
// ============================================================================
// Module: Rules Engine
// Description: Pure, ordered rule evaluation over a transaction's working
// view and change journal.
// Purpose: Enforce cross-entity invariants the type system cannot express
// (referential integrity, capacity, delete protection, stage monotonicity).
// Dependencies: crate::{entities, store}
// ============================================================================

//! ## Overview
//! A [`Rule`] is a pure function `evaluate(view, changes) -> RuleOutcome`.
//! The [`RuleRegistry`] holds rules in registration order and runs every one
//! to completion on each commit attempt, merging their outcomes; no rule
//! short-circuits another. [`RuleOutcome::has_blocking`] governs whether the
//! transaction manager aborts the commit.

pub mod builtins;

use std::fmt;

use thiserror::Error;

use crate::store::RuleView;
use crate::store::journal::ChangeRecord;

// ============================================================================
// SECTION: Severity
// ============================================================================

/// The severity of a single rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Aborts the transaction.
    Block,
    /// Surfaced to the caller and audit sink, but does not abort.
    Warn,
    /// Logged only.
    Log,
}

impl Severity {
    /// Returns the wire-form name of this severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Warn => "warn",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Violation & Outcome
// ============================================================================

/// A single rule violation attached to one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Name of the rule that raised this violation (e.g. `housing.capacity`).
    pub rule: &'static str,
    /// Severity of the violation.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Entity kind name the violation concerns.
    pub entity: &'static str,
    /// Identifier of the offending entity.
    pub entity_id: String,
}

/// Aggregated result of running every registered rule once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    /// All violations raised across every rule, in rule-registration order.
    pub violations: Vec<Violation>,
}

impl RuleOutcome {
    /// Returns an outcome with no violations.
    #[must_use]
    pub const fn empty() -> Self {
        Self { violations: Vec::new() }
    }

    /// Merges another outcome's violations into this one, preserving order.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
    }

    /// Returns true if any violation has [`Severity::Block`].
    #[must_use]
    pub fn has_blocking(&self) -> bool {
        self.violations.iter().any(|violation| violation.severity == Severity::Block)
    }
}

// ============================================================================
// SECTION: Rule Trait
// ============================================================================

/// Error raised when a rule itself fails (distinct from a data violation).
///
/// Reserved for internal invariant breaks (e.g. a corrupt registry); rules
/// must not return this for ordinary data problems, which are
/// [`Violation`]s instead.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("rule {rule} failed: {message}")]
pub struct RuleError {
    /// Name of the failing rule.
    pub rule: &'static str,
    /// Description of the internal failure.
    pub message: String,
}

/// A pure, named rule evaluated against a transaction's working view and
/// its accumulated change journal.
///
/// # Invariants
/// - Must not mutate the store; rules only read through [`RuleView`].
/// - Must be idempotent: evaluating twice against the same view and changes
///   yields an equal [`RuleOutcome`].
pub trait Rule: Send + Sync {
    /// Stable rule name, used in [`Violation::rule`] and test assertions.
    fn name(&self) -> &'static str;

    /// Evaluates this rule against the working view and the changes applied
    /// so far in the current transaction.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] only for internal invariant breaks, never for
    /// ordinary data problems (those become [`Violation`]s in the returned
    /// outcome).
    fn evaluate(&self, view: &dyn RuleView, changes: &[ChangeRecord]) -> Result<RuleOutcome, RuleError>;
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// An append-only, ordered list of rules.
///
/// Evaluation runs every rule to completion and merges their outcomes; no
/// rule short-circuits another, and rule ordering is registration order
/// (required for deterministic test assertions).
#[derive(Default)]
pub struct RuleRegistry {
    /// Registered rules, in registration order.
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the required built-in rules,
    /// in a fixed, documented order.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(builtins::ReferentialIntegrity));
        registry.register(Box::new(builtins::HousingCapacity));
        registry.register(Box::new(builtins::ProtocolSubjectCap));
        registry.register(Box::new(builtins::DeleteProtection));
        registry.register(Box::new(builtins::StageMonotonic));
        registry.register(Box::new(builtins::SampleContext));
        registry.register(Box::new(builtins::ObservationContext));
        registry.register(Box::new(builtins::PermitWindow));
        registry
    }

    /// Appends a rule to the end of the registration order.
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Runs every registered rule to completion and merges their outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if any rule reports an internal failure; the
    /// transaction manager treats this the same as a store failure.
    pub fn evaluate_all(&self, view: &dyn RuleView, changes: &[ChangeRecord]) -> Result<RuleOutcome, RuleError> {
        let mut outcome = RuleOutcome::empty();
        for rule in &self.rules {
            outcome.extend(rule.evaluate(view, changes)?);
        }
        Ok(outcome)
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry").field("rule_count", &self.rules.len()).finish()
    }
}
