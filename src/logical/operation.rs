//! Operation kinds a backend can be asked to perform.

use crate::errors::LogicalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of work carried by a [`Request`](super::Request).
///
/// Per-path operations are meaningful only together with a path. Global
/// operations act on a previously issued secret (`Revoke`, `Renew`) or sweep
/// partial work under a prefix (`Rollback`); for those the path is secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Operation {
    Read,
    Write,
    Delete,
    List,
    Help,
    Revoke,
    Renew,
    Rollback,
}

impl Operation {
    /// Every operation, per-path variants first.
    pub const ALL: [Operation; 8] = [
        Operation::Read,
        Operation::Write,
        Operation::Delete,
        Operation::List,
        Operation::Help,
        Operation::Revoke,
        Operation::Renew,
        Operation::Rollback,
    ];

    /// Wire representation of this operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::List => "list",
            Self::Help => "help",
            Self::Revoke => "revoke",
            Self::Renew => "renew",
            Self::Rollback => "rollback",
        }
    }

    /// True for operations dispatched globally rather than per path
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Revoke | Self::Renew | Self::Rollback)
    }

    pub fn is_per_path(&self) -> bool {
        !self.is_global()
    }

    /// True for the operations whose requests carry a secret
    pub fn acts_on_secret(&self) -> bool {
        matches!(self, Self::Revoke | Self::Renew)
    }
}

impl FromStr for Operation {
    type Err = LogicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            "list" => Ok(Self::List),
            "help" => Ok(Self::Help),
            "revoke" => Ok(Self::Revoke),
            "renew" => Ok(Self::Renew),
            "rollback" => Ok(Self::Rollback),
            _ => Err(LogicalError::unsupported_operation(s)),
        }
    }
}

impl TryFrom<String> for Operation {
    type Error = LogicalError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
