//! Collects `(node)-[relation]-(node)` triples from a query.
//!
//! The whole query is probed left to right. Any text that is not a node pattern is stepped
//! over, so clauses, keywords and expressions between patterns do not matter. A relation links
//! the node before it to the next node found after it, even when other text sits in between.

use crate::model::{Node, Relation, Triple};
use crate::parser::{PatternParser, Probe};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::trace;

/// One labelled occurrence of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub labels: Vec<String>,
    pub offset: usize,
}

/// Variable name to every labelled binding of it, in query order.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    bindings: FxHashMap<String, Vec<Binding>>,
}

impl VariableTable {
    /// Records `node` when it has both a variable and at least one label.
    pub fn record(&mut self, node: &Node) {
        if !node.has_variable() || !node.has_labels() {
            return;
        }
        self.bindings
            .entry(node.variable.clone())
            .or_default()
            .push(Binding {
                labels: node.labels.clone(),
                offset: node.offset,
            });
    }

    pub fn latest(&self, variable: &str) -> Option<&Binding> {
        self.bindings.get(variable).and_then(|b| b.last())
    }

    pub fn history(&self, variable: &str) -> &[Binding] {
        self.bindings
            .get(variable)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TripleRepository {
    pub triples: Vec<Triple>,
    pub variables: VariableTable,
}

impl TripleRepository {
    /// Scans `query` and returns its triples with variable labels already filled in.
    pub fn collect(query: &str) -> Self {
        let mut repo = Self::default();
        let mut parser = PatternParser::new(query);
        let mut pending: Option<(Node, Relation)> = None;

        parser.skip_whitespace();
        while !parser.is_eof() {
            let Probe::Found(node) = parser.try_parse_node() else {
                continue;
            };
            trace!(offset = node.offset, node = %node, "assembler.node");
            repo.variables.record(&node);

            if let Some((first, relation)) = pending.take() {
                let triple = Triple::new(first, relation, node.clone());
                trace!(triple = %triple, "assembler.triple");
                repo.triples.push(triple);
            }

            parser.skip_whitespace();
            pending = parser.try_parse_relation().found().map(|rel| (node, rel));
            parser.skip_whitespace();
        }

        repo.infer_labels();
        repo
    }

    /// Gives unlabelled variable references the labels of the variable's last labelled binding.
    fn infer_labels(&mut self) {
        let variables = &self.variables;
        for triple in &mut self.triples {
            for node in [&mut triple.first, &mut triple.second] {
                if !node.needs_label_lookup() {
                    continue;
                }
                if let Some(binding) = variables.latest(&node.variable) {
                    node.labels = binding.labels.clone();
                    node.label_was_inferred = true;
                    trace!(variable = %node.variable, offset = node.offset, "assembler.infer_labels");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;

    fn labels(node: &Node) -> Vec<&str> {
        node.labels.iter().map(String::as_str).collect()
    }

    #[test]
    fn single_triple() {
        let repo = TripleRepository::collect("MATCH (a:Person)-[:KNOWS]->(b:Person) RETURN a");
        assert_eq!(repo.triples.len(), 1);
        let t = &repo.triples[0];
        assert_eq!(t.first.variable, "a");
        assert_eq!(t.second.variable, "b");
        assert_eq!(t.relation.types, vec!["KNOWS"]);
        assert_eq!(t.current, Direction::SourceToDestination);
        assert_eq!(t.first.offset, 6);
    }

    #[test]
    fn chained_patterns_share_the_middle_node() {
        let repo = TripleRepository::collect("(a:A)-[:R]->(b:B)<-[:S]-(c:C)");
        assert_eq!(repo.triples.len(), 2);
        assert_eq!(repo.triples[0].second, repo.triples[1].first);
        assert_eq!(repo.triples[1].current, Direction::DestinationToSource);
    }

    #[test]
    fn comma_separated_patterns_are_not_joined() {
        let repo = TripleRepository::collect(
            "MATCH (p:Person)-[:ACTED_IN]->(m:Movie),\n(coActors:Person)-[:ACTED_IN]->(m)",
        );
        assert_eq!(repo.triples.len(), 2);
        assert_eq!(repo.triples[0].first.variable, "p");
        assert_eq!(repo.triples[1].first.variable, "coActors");
    }

    #[test]
    fn lone_node_produces_no_triple() {
        let repo = TripleRepository::collect("MATCH (n:Person) RETURN n");
        assert!(repo.triples.is_empty());
        assert_eq!(repo.variables.history("n").len(), 1);
    }

    #[test]
    fn unlabelled_reference_takes_latest_binding() {
        let repo = TripleRepository::collect(
            "MATCH (p:Person)-[:ACTED_IN]->(m:Movie),\n(coActors:Person)-[:ACTED_IN]->(m)",
        );
        let m = &repo.triples[1].second;
        assert_eq!(labels(m), vec!["Movie"]);
        assert!(m.label_was_inferred);
        assert!(!repo.triples[0].second.label_was_inferred);
    }

    #[test]
    fn inference_sees_bindings_later_in_the_query() {
        let repo = TripleRepository::collect(
            "MATCH (p)<-[:ACTED_IN]-(m) WHERE (p:Person)--() AND (m:Movie)--() RETURN p",
        );
        let t = &repo.triples[0];
        assert_eq!(labels(&t.first), vec!["Person"]);
        assert_eq!(labels(&t.second), vec!["Movie"]);
    }

    #[test]
    fn latest_binding_wins() {
        let repo = TripleRepository::collect("(x:A), (x:B), (x)-->(y)");
        assert_eq!(repo.variables.history("x").len(), 2);
        assert_eq!(repo.variables.latest("x").map(|b| b.offset), Some(7));
        assert_eq!(labels(&repo.triples[0].first), vec!["B"]);
    }

    #[test]
    fn unknown_variable_stays_unlabelled() {
        let repo = TripleRepository::collect("(person)-[:KNOWS]->(o:Organization)");
        let t = &repo.triples[0];
        assert!(t.first.labels.is_empty());
        assert!(!t.first.label_was_inferred);
    }

    #[test]
    fn relation_survives_text_before_next_node() {
        let repo = TripleRepository::collect("(a:A)-->  WHERE x (b:B)");
        assert_eq!(repo.triples.len(), 1);
        assert_eq!(repo.triples[0].second.variable, "b");
    }

    #[test]
    fn whitespace_between_node_and_relation() {
        let repo = TripleRepository::collect("(a:A) -[:R]-> (b:B)");
        assert_eq!(repo.triples.len(), 1);
        assert_eq!(repo.triples[0].relation.left_inner, Some(6));
    }

    #[test]
    fn parenthesised_path_group_still_yields_inner_triple() {
        let repo = TripleRepository::collect("MATCH ((a:A)-[:R]->(b:B)) RETURN a");
        assert_eq!(repo.triples.len(), 1);
        assert_eq!(repo.triples[0].first.offset, 7);
    }

    #[test]
    fn subquery_pattern_is_collected() {
        let repo = TripleRepository::collect(
            "MATCH (p:Person) WHERE EXISTS { (p)<-[:KNOWS]-() } RETURN p",
        );
        assert_eq!(repo.triples.len(), 1);
        assert_eq!(labels(&repo.triples[0].first), vec!["Person"]);
        assert!(repo.triples[0].second.labels.is_empty());
    }

    #[test]
    fn empty_query() {
        let repo = TripleRepository::collect("");
        assert!(repo.triples.is_empty());
        assert!(repo.variables.is_empty());
    }
}
