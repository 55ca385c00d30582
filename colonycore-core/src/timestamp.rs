// colonycore-core/src/timestamp.rs
// ============================================================================
// Module: ColonyCore Timestamps
// Description: UTC timestamp wrapper shared by every entity's Base record.
// Purpose: Keep CreatedAt/UpdatedAt comparisons and wire encoding consistent.
// Dependencies: time, serde
// ============================================================================

//! ## Overview
//! Every entity embeds `created_at`/`updated_at` timestamps. The transaction
//! manager stamps both on create and advances `updated_at` on mutations that
//! change entity state (see [`crate::store::Transaction`]). Values are always
//! normalized to UTC.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// A UTC point in time, serialized as RFC 3339 on the wire.
///
/// # Invariants
/// - Always normalized to the UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Builds a timestamp from an existing `OffsetDateTime`, normalizing it
    /// to UTC.
    #[must_use]
    pub fn new(value: OffsetDateTime) -> Self {
        Self(value.to_offset(time::UtcOffset::UTC))
    }

    /// Returns the current wall-clock time.
    ///
    /// Only the transaction manager calls this; all other code receives
    /// timestamps as values so behavior stays deterministic under test.
    #[must_use]
    pub fn now() -> Self {
        Self::new(OffsetDateTime::now_utc())
    }

    /// Returns the wrapped `OffsetDateTime`.
    #[must_use]
    pub const fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    /// Parses an RFC 3339 timestamp string.
    ///
    /// # Errors
    ///
    /// Returns [`time::error::Parse`] when `text` is not valid RFC 3339.
    pub fn parse(text: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(text, &Rfc3339).map(Self::new)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str("<invalid-timestamp>"),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let text = self.0.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let parsed = OffsetDateTime::parse(&text, &Rfc3339).map_err(serde::de::Error::custom)?;
        Ok(Self::new(parsed))
    }
}
