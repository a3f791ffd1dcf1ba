#![forbid(unsafe_code)]

//! Schema-driven correction of relationship directions in Cypher queries.
//!
//! Given a query and a list of `(Source, RELATION, Destination)` schema triples, the fixer finds
//! every `(node)-[relation]-(node)` pattern in the query, works out which direction the schema
//! asks for, and moves arrowheads that point the wrong way. The rest of the query text is left
//! byte-for-byte intact.
//!
//! ```
//! let fixed = cypher_arrows_core::fix_directions(
//!     "MATCH (:Person)<-[:WORKS_AT]-(:Organization) RETURN 1",
//!     "(Person, WORKS_AT, Organization)",
//! )
//! .unwrap();
//! assert_eq!(fixed, "MATCH (:Person)-[:WORKS_AT]->(:Organization) RETURN 1");
//! ```
//!
//! When none of the query's patterns can be matched against the schema the result is `""`
//! (see [`FixOptions`]).

pub mod assembler;
pub mod direction;
pub mod error;
pub mod model;
pub mod options;
mod parser;
pub mod rewrite;
pub mod rules;
mod scanner;
pub mod schema;

pub use assembler::{Binding, TripleRepository, VariableTable};
pub use direction::Direction;
pub use error::{Error, Result};
pub use model::{Node, Relation, Triple};
pub use options::FixOptions;
pub use parser::Probe;
pub use rules::{RelationTypeStatus, Rule, validate_relation_type};
pub use schema::{Schema, extract_schemas};

use serde::Serialize;
use tracing::debug;

/// The annotated model of one query, plus the text the fixer would return for it.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub triples: Vec<TripleVerdict>,
    /// True when at least one triple matched the schema.
    pub matched: bool,
    pub output: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripleVerdict {
    #[serde(flatten)]
    pub triple: Triple,
    pub rule: Option<Rule>,
    pub needs_flip: bool,
}

/// A fixer configured with a schema list. Cheap to clone and safe to share between threads;
/// each call works on its own state.
#[derive(Debug, Clone)]
pub struct DirectionFixer {
    schemas: Vec<Schema>,
    options: FixOptions,
}

impl DirectionFixer {
    pub fn new(schemas: Vec<Schema>) -> Self {
        Self {
            schemas,
            options: FixOptions::default(),
        }
    }

    /// Builds a fixer from schema text such as `"(Person,KNOWS,Person),(Person,WORKS_AT,Organization)"`.
    pub fn from_schema_str(text: &str) -> Result<Self> {
        Ok(Self::new(extract_schemas(text)?))
    }

    /// Same as [`Self::from_schema_str`], honouring `options.require_schema`.
    pub fn from_schema_str_with_options(text: &str, options: FixOptions) -> Result<Self> {
        let schemas = extract_schemas(text)?;
        if options.require_schema && schemas.is_empty() {
            return Err(Error::EmptySchema);
        }
        Ok(Self { schemas, options })
    }

    pub fn with_options(mut self, options: FixOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn options(&self) -> FixOptions {
        self.options
    }

    pub fn fix(&self, query: &str) -> String {
        self.analyze(query).output
    }

    pub fn analyze(&self, query: &str) -> Analysis {
        let repo = TripleRepository::collect(query);
        let mut triples = repo.triples;
        let rules: Vec<Option<Rule>> = triples
            .iter_mut()
            .map(|t| rules::evaluate(t, &self.schemas))
            .collect();

        let matched = triples.iter().any(|t| t.has_schema_match);
        let output = if matched {
            rewrite::rewrite(query, &triples)
        } else if self.options.empty_when_unmatched {
            String::new()
        } else {
            query.to_string()
        };
        debug!(
            triples = triples.len(),
            matched,
            changed = output != query,
            "fixer.analyze"
        );

        let triples = triples
            .into_iter()
            .zip(rules)
            .map(|(triple, rule)| TripleVerdict {
                needs_flip: triple.needs_flip(),
                triple,
                rule,
            })
            .collect();

        Analysis {
            triples,
            matched,
            output,
        }
    }
}

/// Fixes `query` against the schema tuples in `schema` with the default options.
pub fn fix_directions(query: &str, schema: &str) -> Result<String> {
    Ok(DirectionFixer::from_schema_str(schema)?.fix(query))
}
