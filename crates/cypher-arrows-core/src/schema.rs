//! Schema triples `(Source, RELATION, Destination)` and extraction from free text.

use crate::error::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// One permitted `(:source)-[:relation]->(:destination)` combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Schema {
    pub source: String,
    pub relation: String,
    pub destination: String,
}

impl Schema {
    pub fn new(
        source: impl Into<String>,
        relation: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            relation: relation.into(),
            destination: destination.into(),
        }
    }

    /// Builds a schema from the comma separated interior of one `( ... )` group.
    fn from_tuple(tuple: &str) -> Result<Self> {
        let parts: Vec<&str> = tuple.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [source, relation, destination]
                if !source.is_empty() && !relation.is_empty() && !destination.is_empty() =>
            {
                Ok(Self::new(*source, *relation, *destination))
            }
            _ => Err(Error::MalformedSchema {
                tuple: tuple.to_string(),
            }),
        }
    }
}

impl FromStr for Schema {
    type Err = Error;

    /// Accepts `(A, R, B)` or the bare `A, R, B`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let inner = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(s);
        Self::from_tuple(inner)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(:{})-[:{}]->(:{})",
            self.source, self.relation, self.destination
        )
    }
}

fn tuple_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]+)\)").expect("tuple regex must compile"))
}

/// Pulls every `(Source, RELATION, Destination)` group out of `text`.
///
/// Anything outside the parentheses is ignored, so list brackets, quotes and prose around the
/// tuples are fine. A group that does not hold exactly three non-empty names is an error. Text
/// without any group yields an empty list.
pub fn extract_schemas(text: &str) -> Result<Vec<Schema>> {
    tuple_re()
        .captures_iter(text)
        .map(|caps| Schema::from_tuple(&caps[1]))
        .collect()
}
