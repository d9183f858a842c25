//! Core data model types.
//!
//! Projects own members, members own an append-only sequence of scores.
//! Scores are never edited: a new submission supersedes the previous one.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransparencyError};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                $name(id)
            }
        }
    };
}

id_type!(
    /// Identity of a project.
    ProjectId
);
id_type!(
    /// Identity of a project member.
    MemberId
);
id_type!(
    /// Identity of a score submission. Allocated in insertion order, so it
    /// doubles as the tiebreak between equal timestamps.
    ScoreId
);

/// A member's role within a project. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Member")]
    Member,
    #[serde(rename = "PM")]
    Pm,
    #[serde(rename = "PL")]
    Pl,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Member, Role::Pm, Role::Pl];

    /// Weight of this role in the project average.
    pub fn weight(self) -> u32 {
        weight_of(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Member => "Member",
            Role::Pm => "PM",
            Role::Pl => "PL",
        }
    }
}

/// Role weight table: `PL → 3`, `PM → 2`, `Member → 1`.
pub fn weight_of(role: Role) -> u32 {
    match role {
        Role::Pl => 3,
        Role::Pm => 2,
        Role::Member => 1,
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TransparencyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "pm" => Ok(Role::Pm),
            "pl" => Ok(Role::Pl),
            other => Err(TransparencyError::validation(format!(
                "role must be one of: Member, PM, PL (got '{other}')"
            ))),
        }
    }
}

/// A score value, guaranteed to lie in `[0, 100]`.
///
/// Out-of-range and non-finite values are rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ScoreValue(f64);

impl ScoreValue {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Ok(ScoreValue(value))
        } else {
            Err(TransparencyError::validation(format!(
                "score must be between 0 and 100 (got {value})"
            )))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ScoreValue {
    type Error = TransparencyError;

    fn try_from(value: f64) -> Result<Self> {
        ScoreValue::new(value)
    }
}

impl From<ScoreValue> for f64 {
    fn from(value: ScoreValue) -> f64 {
        value.0
    }
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A project whose health is tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// External reference document for the project.
    pub document_url: String,
    pub created_at: DateTime<Utc>,
}

/// A member of exactly one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub project_id: ProjectId,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An immutable score submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub id: ScoreId,
    pub member_id: MemberId,
    pub value: ScoreValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Score {
    /// Total order of a member's scores: timestamp, then insertion order.
    pub fn order_key(&self) -> (DateTime<Utc>, ScoreId) {
        (self.created_at, self.id)
    }
}

/// Reject empty or whitespace-only required fields.
pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(TransparencyError::validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

/// Blank optional text collapses to `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
