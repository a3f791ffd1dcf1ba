//! In-memory model produced by the pattern scanner: nodes, relations and the triples that
//! chain them together.
//!
//! Every offset is a byte offset into the original, unedited query text.

use crate::direction::Direction;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Empty when the pattern has no variable, e.g. `(:Person)`.
    pub variable: String,
    pub labels: Vec<String>,
    /// Offset of the opening `(`.
    pub offset: usize,
    /// Labels were copied from an earlier labelled binding of the same variable.
    pub label_was_inferred: bool,
}

impl Node {
    pub fn has_variable(&self) -> bool {
        !self.variable.is_empty()
    }

    pub fn has_labels(&self) -> bool {
        !self.labels.is_empty()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn shares_label_with(&self, other: &Node) -> bool {
        self.labels.iter().any(|l| other.has_label(l))
    }

    /// A bare variable reference such as `(p)` whose labels may be known from elsewhere.
    pub fn needs_label_lookup(&self) -> bool {
        self.has_variable() && !self.has_labels()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.variable)?;
        for label in &self.labels {
            write!(f, ":{label}")?;
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Relation {
    /// `"-"` or `"<-"`.
    pub left: String,
    /// `"-"` or `"->"`.
    pub right: String,
    /// Offset of the `<` arrowhead.
    pub left_outer: Option<usize>,
    /// Offset of the hyphen that opens the relation.
    pub left_inner: Option<usize>,
    /// Offset of the hyphen that closes the relation.
    pub right_inner: Option<usize>,
    /// Offset of the `>` arrowhead.
    pub right_outer: Option<usize>,
    pub variable: String,
    pub types: Vec<String>,
    /// Types written as `!TYPE`.
    pub negative_types: Vec<String>,
    /// A `*`, `*2`, `*1..4`, ... quantifier was present.
    pub variable_length: bool,
}

impl Relation {
    pub fn has_variable(&self) -> bool {
        !self.variable.is_empty()
    }

    pub fn has_types(&self) -> bool {
        !self.types.is_empty()
    }

    pub fn has_negative_types(&self) -> bool {
        !self.negative_types.is_empty()
    }

    pub fn has_any_types(&self) -> bool {
        self.has_types() || self.has_negative_types()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}", self.left, self.variable)?;
        let mut names = self
            .types
            .iter()
            .map(|t| t.to_string())
            .chain(self.negative_types.iter().map(|t| format!("!{t}")));
        if let Some(first) = names.next() {
            write!(f, ":{first}")?;
            for name in names {
                write!(f, "|{name}")?;
            }
        }
        if self.variable_length {
            f.write_str("*")?;
        }
        write!(f, "]{}", self.right)
    }
}

/// One `(node)-[relation]-(node)` segment of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triple {
    pub first: Node,
    pub relation: Relation,
    pub second: Node,
    /// What the glyphs in the query say.
    pub current: Direction,
    /// What the schema says; `None` until a rule decides.
    pub required: Option<Direction>,
    pub has_schema_match: bool,
}

impl Triple {
    pub fn new(first: Node, relation: Relation, second: Node) -> Self {
        let current = Direction::classify(&relation);
        Self {
            first,
            relation,
            second,
            current,
            required: None,
            has_schema_match: true,
        }
    }

    /// The arrowhead sits on the wrong end and has to move to the other one.
    pub fn needs_flip(&self) -> bool {
        let Some(required) = self.required else {
            return false;
        };
        self.current.is_one_way() && required.is_one_way() && required != self.current
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.first, self.relation, self.second)
    }
}
