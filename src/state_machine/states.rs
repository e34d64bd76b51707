use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of one production item at one station, also used for the derived
/// batch-run status.
///
/// `Pending` and `Queued` are system-assigned (dependency eligibility);
/// `InProgress`, `Blocked`, and `Done` are operator-assigned via explicit
/// actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Blocked by an unmet upstream station dependency.
    Pending,
    /// Eligible to start, not yet started.
    Queued,
    /// Operator is working the item.
    InProgress,
    /// Operator-reported stoppage; prior progress is retained.
    Blocked,
    /// Work at this station is finished.
    Done,
}

impl ItemStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Whether an upstream item in this state releases its dependents.
    pub fn satisfies_dependencies(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// System-assigned eligibility states, owned by the reconciler.
    pub fn is_schedulable(&self) -> bool {
        matches!(self, Self::Pending | Self::Queued)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Queued => write!(f, "queued"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Blocked => write!(f, "blocked"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "queued" => Ok(Self::Queued),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "done" => Ok(Self::Done),
            _ => Err(format!("Invalid item status: {s}")),
        }
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        Self::Pending
    }
}
