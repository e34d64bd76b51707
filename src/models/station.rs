use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a physical work location.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct StationId(pub i64);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for StationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A physical work location in the shop. Immutable during a scheduling cycle;
/// created and edited by external configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub sort_order: i32,
}

/// Directed dependency edge: `station_id` may not proceed for a given logical
/// item until every `depends_on_station_id` entry for that item is done.
/// Multiple edges per station carry AND semantics. The configuration is
/// assumed acyclic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDependency {
    pub id: i64,
    pub station_id: StationId,
    pub depends_on_station_id: StationId,
}
