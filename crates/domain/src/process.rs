//! Process identifiers used as lock keys.
//!
//! A process is one truck's inspection and weighing workflow instance. Lock
//! calls are only meaningful for a well-formed identifier, and the UI may ask
//! for a lock before any process is selected, so validation answers with an
//! `Option` rather than an error.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::{Uuid, Variant};
use weighbridge_core::AppError;

/// Byte offsets of the hyphens in the canonical `8-4-4-4-12` layout.
const HYPHEN_OFFSETS: [usize; 4] = [8, 13, 18, 23];
const CANONICAL_LENGTH: usize = 36;

/// Validated identifier of a weighing/inspection process.
///
/// Only canonical hyphenated UUIDs of version 1 to 5 with the RFC 4122
/// variant are accepted, in either letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProcessId(Uuid);

impl ProcessId {
    /// Parses a candidate identifier, returning `None` when it is not well formed.
    #[must_use]
    pub fn parse(candidate: &str) -> Option<Self> {
        if !has_canonical_layout(candidate) {
            return None;
        }

        let uuid = Uuid::parse_str(candidate).ok()?;
        if !(1..=5).contains(&uuid.get_version_num()) || uuid.get_variant() != Variant::RFC4122 {
            return None;
        }

        Some(Self(uuid))
    }

    /// Parses an optional candidate; an absent value is no identifier.
    #[must_use]
    pub fn from_candidate(candidate: Option<&str>) -> Option<Self> {
        candidate.and_then(Self::parse)
    }

    /// Returns true when the candidate is a well-formed process identifier.
    #[must_use]
    pub fn is_valid(candidate: &str) -> bool {
        Self::parse(candidate).is_some()
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

fn has_canonical_layout(candidate: &str) -> bool {
    candidate.len() == CANONICAL_LENGTH
        && candidate.bytes().enumerate().all(|(offset, byte)| {
            if HYPHEN_OFFSETS.contains(&offset) {
                byte == b'-'
            } else {
                byte.is_ascii_hexdigit()
            }
        })
}

impl Display for ProcessId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.hyphenated())
    }
}

impl FromStr for ProcessId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| {
            AppError::Validation(format!("'{value}' is not a valid process identifier"))
        })
    }
}

impl TryFrom<String> for ProcessId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProcessId> for String {
    fn from(value: ProcessId) -> Self {
        value.to_string()
    }
}
