// colonycore-core/src/entities/enums.rs
// ============================================================================
// Module: Entity Status Enums
// Description: Closed-set status/stage values used by domain entities.
// Purpose: Keep status fields restricted to their enumerated values, as
// required by the data model's invariants.
// ============================================================================

//! ## Overview
//! Every status/stage field on an entity is one of these closed sets.
//! Decoding an unrecognized string is rejected at the validation boundary
//! (see [`crate::entities::EntityError::InvalidEnum`]).

use std::fmt;

use crate::entities::EntityError;

/// Declares a closed-set string enum with `as_str`/`parse` helpers.
macro_rules! closed_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[doc = concat!("Closed-set status values for ", $kind, ".")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $(
                #[doc = $text]
                $variant,
            )+
        }

        impl $name {
            /// Returns the wire-form string for this value.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Parses a wire-form string into this enum.
            ///
            /// # Errors
            ///
            /// Returns [`EntityError::InvalidEnum`] when `text` is not a
            /// recognized value.
            pub fn parse(text: &str) -> Result<Self, EntityError> {
                match text {
                    $($text => Ok(Self::$variant),)+
                    other => Err(EntityError::InvalidEnum { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_enum!(OrganismStage, "organism.stage", {
    Planned => "planned",
    EmbryoLarva => "embryo_larva",
    Juvenile => "juvenile",
    Adult => "adult",
    Retired => "retired",
    Deceased => "deceased",
});

impl OrganismStage {
    /// Returns true for the two terminal stages stage monotonicity
    /// protects once reached.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Retired | Self::Deceased)
    }
}

closed_enum!(ProcedureStatus, "procedure.status", {
    Scheduled => "scheduled",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
    Failed => "failed",
});

closed_enum!(TreatmentStatus, "treatment.status", {
    Planned => "planned",
    InProgress => "in_progress",
    Completed => "completed",
    Flagged => "flagged",
});

closed_enum!(SampleStatus, "sample.status", {
    Stored => "stored",
    InTransit => "in_transit",
    Consumed => "consumed",
    Disposed => "disposed",
});

closed_enum!(PermitStatus, "permit.status", {
    Pending => "pending",
    Active => "active",
    Expired => "expired",
});
