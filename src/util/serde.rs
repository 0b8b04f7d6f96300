//! Shared serializable value types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for an admitted ticket.
pub type TicketId = uuid::Uuid;

/// Allocate a fresh ticket identifier.
#[must_use]
pub fn new_ticket_id() -> TicketId {
    uuid::Uuid::new_v4()
}

/// Priority class used for lane selection.
///
/// Lanes are strictly ordered: `Critical` always dispatches before `High`,
/// and so on down to `Low`. There is no aging or weighting across classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Dispatched before all other classes.
    Critical,
    /// Dispatched before normal and low traffic.
    High,
    /// Default class for unclassified work.
    Normal,
    /// Dispatched only when every other lane is empty.
    Low,
}

impl Priority {
    /// Lane index in dispatch order (0 = critical).
    #[must_use]
    pub const fn lane_index(self) -> usize {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Normal => 2,
            Self::Low => 3,
        }
    }

    /// All classes in dispatch order.
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Normal, Self::Low];
}

impl FromStr for Priority {
    type Err = std::convert::Infallible;

    /// Parse a priority label. Unrecognized labels normalize to `Normal`
    /// rather than failing, so callers passing free-form class strings are
    /// never rejected at the admission boundary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "critical" => Self::Critical,
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Normal,
        })
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        };
        f.write_str(label)
    }
}
