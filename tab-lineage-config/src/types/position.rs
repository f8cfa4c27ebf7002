//! Position policy types.
//!
//! Two policy families exist:
//! - [`OpenPosition`]: a single value consulted once when a tab is created,
//!   producing an insertion index.
//! - [`SelectPosition`]: entries of an ordered list consulted when the
//!   selected tab closes, each producing (or failing to produce) a tab.
//!
//! Both are written in config files as `snake_case` names. Family walks use
//! the grammar `{prev|next}_{adjacent|farthest}[_extended]_{ancestor|descendant}`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Open positions
// ============================================================================

/// Where a newly created tab is inserted relative to its base tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OpenPosition {
    /// Leave the tab where the host put it
    #[default]
    Default,
    /// Start of the active lane
    FirstEnd,
    /// End of the active lane
    LastEnd,
    /// Immediately before the base tab
    PrevAdjacent,
    /// Immediately after the base tab
    NextAdjacent,
    /// After the contiguous run of the base tab's descendants that follows it
    NextIncrementDescendant,
}

impl OpenPosition {
    /// Config name of this position
    pub fn name(&self) -> &'static str {
        match self {
            OpenPosition::Default => "default",
            OpenPosition::FirstEnd => "first_end",
            OpenPosition::LastEnd => "last_end",
            OpenPosition::PrevAdjacent => "prev_adjacent",
            OpenPosition::NextAdjacent => "next_adjacent",
            OpenPosition::NextIncrementDescendant => "next_increment_descendant",
        }
    }

    /// All positions for UI iteration
    pub fn all() -> &'static [OpenPosition] {
        &[
            OpenPosition::Default,
            OpenPosition::FirstEnd,
            OpenPosition::LastEnd,
            OpenPosition::PrevAdjacent,
            OpenPosition::NextAdjacent,
            OpenPosition::NextIncrementDescendant,
        ]
    }
}

impl fmt::Display for OpenPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OpenPosition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OpenPosition::all()
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| ConfigError::UnknownPosition(s.to_string()))
    }
}

impl TryFrom<String> for OpenPosition {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OpenPosition> for String {
    fn from(value: OpenPosition) -> Self {
        value.name().to_string()
    }
}

// ============================================================================
// Family walks
// ============================================================================

/// Walk direction along the tab strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Prev,
    Next,
}

/// How far a family walk goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reach {
    /// Only the immediate neighbour is tested
    Adjacent,
    /// The last tab of the contiguous matching run starting at the neighbour
    Farthest,
}

/// Relation a candidate must have to the base tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Candidate appears in the base tab's ancestor chain
    Ancestor,
    /// Base tab appears in the candidate's ancestor chain (or, when extended,
    /// the base tab's parent does)
    Descendant,
}

/// A directional walk over related tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FamilyRule {
    pub direction: Direction,
    pub reach: Reach,
    pub extended: bool,
    pub relation: Relation,
}

impl FamilyRule {
    pub fn new(direction: Direction, reach: Reach, extended: bool, relation: Relation) -> Self {
        Self {
            direction,
            reach,
            extended,
            relation,
        }
    }
}

impl fmt::Display for FamilyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            Direction::Prev => "prev",
            Direction::Next => "next",
        };
        let reach = match self.reach {
            Reach::Adjacent => "adjacent",
            Reach::Farthest => "farthest",
        };
        let relation = match self.relation {
            Relation::Ancestor => "ancestor",
            Relation::Descendant => "descendant",
        };
        if self.extended {
            write!(f, "{direction}_{reach}_extended_{relation}")
        } else {
            write!(f, "{direction}_{reach}_{relation}")
        }
    }
}

impl FromStr for FamilyRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ConfigError::UnknownPosition(s.to_string());
        let parts: Vec<&str> = s.split('_').collect();
        let (direction, reach, extended, relation) = match parts.as_slice() {
            [d, r, rel] => (*d, *r, false, *rel),
            [d, r, "extended", rel] => (*d, *r, true, *rel),
            _ => return Err(unknown()),
        };
        let direction = match direction {
            "prev" => Direction::Prev,
            "next" => Direction::Next,
            _ => return Err(unknown()),
        };
        let reach = match reach {
            "adjacent" => Reach::Adjacent,
            "farthest" => Reach::Farthest,
            _ => return Err(unknown()),
        };
        let relation = match relation {
            "ancestor" => Relation::Ancestor,
            "descendant" => Relation::Descendant,
            _ => return Err(unknown()),
        };
        Ok(FamilyRule::new(direction, reach, extended, relation))
    }
}

// ============================================================================
// Select positions
// ============================================================================

/// One entry of a close-time selection policy list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SelectPosition {
    /// Stop evaluating and leave the host's own choice in effect
    Default,
    FirstEnd,
    LastEnd,
    /// Immediate neighbour regardless of relation
    PrevAdjacent,
    NextAdjacent,
    /// Related neighbour found by a family walk
    Family(FamilyRule),
    /// The tab that opened the base tab
    AnywhereOpener,
    /// The most recently selected other tab
    AnywherePrevSelected,
    /// The unread tab opened earliest
    AnywhereOldestUnread,
}

impl fmt::Display for SelectPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectPosition::Default => f.write_str("default"),
            SelectPosition::FirstEnd => f.write_str("first_end"),
            SelectPosition::LastEnd => f.write_str("last_end"),
            SelectPosition::PrevAdjacent => f.write_str("prev_adjacent"),
            SelectPosition::NextAdjacent => f.write_str("next_adjacent"),
            SelectPosition::Family(rule) => fmt::Display::fmt(rule, f),
            SelectPosition::AnywhereOpener => f.write_str("anywhere_opener"),
            SelectPosition::AnywherePrevSelected => f.write_str("anywhere_prev_selected"),
            SelectPosition::AnywhereOldestUnread => f.write_str("anywhere_oldest_unread"),
        }
    }
}

impl FromStr for SelectPosition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "default" => SelectPosition::Default,
            "first_end" => SelectPosition::FirstEnd,
            "last_end" => SelectPosition::LastEnd,
            "prev_adjacent" => SelectPosition::PrevAdjacent,
            "next_adjacent" => SelectPosition::NextAdjacent,
            "anywhere_opener" => SelectPosition::AnywhereOpener,
            "anywhere_prev_selected" => SelectPosition::AnywherePrevSelected,
            "anywhere_oldest_unread" => SelectPosition::AnywhereOldestUnread,
            other => SelectPosition::Family(other.parse()?),
        })
    }
}

impl TryFrom<String> for SelectPosition {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SelectPosition> for String {
    fn from(value: SelectPosition) -> Self {
        value.to_string()
    }
}
