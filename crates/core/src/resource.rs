//! Known catalog resource kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of collections the catalog service exposes.
///
/// Requests for any other key are still forwarded upstream verbatim and
/// cached under the literal string; only the refresher is limited to this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    People,
    Films,
    Starships,
    Vehicles,
    Species,
    Planets,
}

impl ResourceKind {
    /// Every known kind, in refresh order.
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::People,
        ResourceKind::Films,
        ResourceKind::Starships,
        ResourceKind::Vehicles,
        ResourceKind::Species,
        ResourceKind::Planets,
    ];

    /// Cache key and upstream path segment for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::People => "people",
            ResourceKind::Films => "films",
            ResourceKind::Starships => "starships",
            ResourceKind::Vehicles => "vehicles",
            ResourceKind::Species => "species",
            ResourceKind::Planets => "planets",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a key is not one of the known kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource kind: {0}")]
pub struct UnknownResource(pub String);

impl FromStr for ResourceKind {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}
