//! Region classifier — maps a resolved address onto the service-area regions.
//!
//! Five hand-surveyed rectangles plus one keyword rule. Rules are evaluated
//! in table order and every match is appended, so overlapping boxes yield
//! several tags in a deterministic order.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::location::Coordinate;

/// A named neighborhood a driver can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionTag {
    Kerrytown,
    Central,
    Hill,
    LowerBp,
    UpperBp,
    Pierpont,
}

impl RegionTag {
    /// Every tag, in rule evaluation order.
    pub const ALL: [RegionTag; 6] = [
        Self::Kerrytown,
        Self::Central,
        Self::Hill,
        Self::LowerBp,
        Self::UpperBp,
        Self::Pierpont,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kerrytown => "kerrytown",
            Self::Central => "central",
            Self::Hill => "hill",
            Self::LowerBp => "lower_bp",
            Self::UpperBp => "upper_bp",
            Self::Pierpont => "pierpont",
        }
    }
}

impl fmt::Display for RegionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Rule table ─────────────────────────────────────────────────

/// An axis-aligned latitude/longitude rectangle, inclusive on every edge.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub tag: RegionTag,
    /// (min, max) latitude
    pub lat: (f64, f64),
    /// (min, max) longitude
    pub lon: (f64, f64),
}

impl BoundingBox {
    pub fn contains(&self, coord: Coordinate) -> bool {
        (self.lat.0..=self.lat.1).contains(&coord.lat())
            && (self.lon.0..=self.lon.1).contains(&coord.lon())
    }
}

pub const REGION_BOXES: [BoundingBox; 5] = [
    BoundingBox {
        tag: RegionTag::Kerrytown,
        lat: (42.279277, 42.286811),
        lon: (-83.747954, -83.733047),
    },
    BoundingBox {
        tag: RegionTag::Central,
        lat: (42.271742, 42.279677),
        lon: (-83.747954, -83.733047),
    },
    BoundingBox {
        tag: RegionTag::Hill,
        lat: (42.274770, 42.286811),
        lon: (-83.733447, -83.722809),
    },
    BoundingBox {
        tag: RegionTag::LowerBp,
        lat: (42.264330, 42.272142),
        lon: (-83.747954, -83.733047),
    },
    BoundingBox {
        tag: RegionTag::UpperBp,
        lat: (42.264330, 42.275170),
        lon: (-83.733447, -83.722809),
    },
];

/// Addresses mentioning this (any case) belong to the Pierpont region,
/// wherever they geocode.
pub const PIERPONT_KEYWORD: &str = "pierpont";

// ─── Classification ─────────────────────────────────────────────

/// Outcome of classifying an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "regions", rename_all = "snake_case")]
pub enum RegionSet {
    /// One or more tags, in rule order. Never empty.
    Matched(Vec<RegionTag>),
    /// The address resolved but no rule matched.
    Unknown,
}

impl RegionSet {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn tags(&self) -> &[RegionTag] {
        match self {
            Self::Matched(tags) => tags,
            Self::Unknown => &[],
        }
    }

    pub fn into_tags(self) -> Option<Vec<RegionTag>> {
        match self {
            Self::Matched(tags) => Some(tags),
            Self::Unknown => None,
        }
    }
}

/// Classify an address and its resolved coordinate.
pub fn classify(address: &str, coord: Coordinate) -> RegionSet {
    let mut tags: Vec<RegionTag> = REGION_BOXES
        .iter()
        .filter(|b| b.contains(coord))
        .map(|b| b.tag)
        .collect();

    if address.to_lowercase().contains(PIERPONT_KEYWORD) {
        tags.push(RegionTag::Pierpont);
    }

    if tags.is_empty() {
        RegionSet::Unknown
    } else {
        RegionSet::Matched(tags)
    }
}
