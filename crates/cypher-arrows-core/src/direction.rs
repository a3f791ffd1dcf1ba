//! Direction of a relationship pattern, derived purely from its arrow glyphs.

use crate::model::Relation;
use serde::Serialize;

pub const HYPHEN: &str = "-";
pub const LEFT_ARROW: &str = "<-";
pub const RIGHT_ARROW: &str = "->";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `(a)-->(b)`
    SourceToDestination,
    /// `(a)<--(b)`
    DestinationToSource,
    /// `(a)<-->(b)`: both ends carry an arrowhead. Never rewritten.
    Both,
    /// `(a)--(b)`
    Undirected,
    /// A glyph that is neither a plain hyphen nor a well-formed arrow.
    Malformed,
}

impl Direction {
    /// Classifies a relation from its left/right glyphs.
    ///
    /// A malformed glyph on either side wins over everything else; otherwise the pair of
    /// arrowheads decides between the four well-formed shapes.
    pub fn classify(relation: &Relation) -> Self {
        let Some(backward) = glyph_points(&relation.left, LEFT_ARROW) else {
            return Self::Malformed;
        };
        let Some(forward) = glyph_points(&relation.right, RIGHT_ARROW) else {
            return Self::Malformed;
        };

        match (backward, forward) {
            (true, true) => Self::Both,
            (true, false) => Self::DestinationToSource,
            (false, true) => Self::SourceToDestination,
            (false, false) => Self::Undirected,
        }
    }

    /// True for `-->` and for the forward half of `<-->`.
    pub fn points_forward(self) -> bool {
        matches!(self, Self::SourceToDestination | Self::Both)
    }

    /// True for `<--` and for the backward half of `<-->`.
    pub fn points_backward(self) -> bool {
        matches!(self, Self::DestinationToSource | Self::Both)
    }

    /// Exactly one arrowhead, i.e. a direction that can be swapped by moving it.
    pub fn is_one_way(self) -> bool {
        matches!(self, Self::SourceToDestination | Self::DestinationToSource)
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::SourceToDestination => Self::DestinationToSource,
            Self::DestinationToSource => Self::SourceToDestination,
            other => other,
        }
    }
}

/// `Some(true)` for the arrow glyph, `Some(false)` for a bare hyphen, `None` otherwise.
fn glyph_points(glyph: &str, arrow: &str) -> Option<bool> {
    if glyph == arrow {
        Some(true)
    } else if glyph == HYPHEN {
        Some(false)
    } else {
        None
    }
}
