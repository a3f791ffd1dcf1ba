//! Decides, per triple, which direction the schema requires.
//!
//! Rules are tried in a fixed order and the first one that produces a verdict wins. Each rule
//! walks the whole schema list before giving up. Triples that end up with no verdict are
//! flagged with `has_schema_match = false`.

use crate::direction::Direction;
use crate::model::{Node, Relation, Triple};
use crate::schema::Schema;
use serde::Serialize;
use tracing::debug;

/// How a relation's type list relates to one schema entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationTypeStatus {
    NotValid,
    Valid,
    /// The relation has no type list at all and so matches anything.
    Empty,
}

impl RelationTypeStatus {
    fn is_acceptable(self) -> bool {
        self != Self::NotValid
    }
}

/// Negated types take precedence: when any are present the positive list is not consulted.
pub fn validate_relation_type(relation: &Relation, schema: &Schema) -> RelationTypeStatus {
    if !relation.has_any_types() {
        return RelationTypeStatus::Empty;
    }
    let listed = |names: &[String]| names.iter().any(|n| *n == schema.relation);

    if relation.has_negative_types() {
        if listed(relation.negative_types.as_slice()) {
            RelationTypeStatus::NotValid
        } else {
            RelationTypeStatus::Valid
        }
    } else if listed(relation.types.as_slice()) {
        RelationTypeStatus::Valid
    } else {
        RelationTypeStatus::NotValid
    }
}

/// The rule that produced a triple's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    SameLabel,
    BothLabels,
    OneLabel,
    Untyped,
}

type RuleFn = fn(&Triple, &[Schema]) -> Option<Direction>;

const RULES: [(Rule, RuleFn); 4] = [
    (Rule::SameLabel, same_label),
    (Rule::BothLabels, both_labels),
    (Rule::OneLabel, one_label),
    (Rule::Untyped, untyped),
];

/// Stamps `required` and `has_schema_match` on `triple`. Returns the rule that fired.
pub fn evaluate(triple: &mut Triple, schemas: &[Schema]) -> Option<Rule> {
    let verdict = {
        let view: &Triple = triple;
        RULES
            .iter()
            .find_map(|(rule, check)| check(view, schemas).map(|dir| (*rule, dir)))
    };

    let Some((rule, required)) = verdict else {
        triple.required = None;
        triple.has_schema_match = false;
        debug!(triple = %triple, current = ?triple.current, "rules.no_match");
        return None;
    };

    triple.required = Some(if is_exempt(triple, schemas) {
        triple.current
    } else {
        required
    });
    triple.has_schema_match = true;
    debug!(
        triple = %triple,
        ?rule,
        current = ?triple.current,
        required = ?triple.required,
        "rules.verdict"
    );
    Some(rule)
}

/// Undirected and variable-length relations keep whatever direction they were written with.
fn is_exempt(triple: &Triple, schemas: &[Schema]) -> bool {
    if triple.relation.variable_length {
        return true;
    }
    triple.current == Direction::Undirected
        && schemas
            .iter()
            .any(|s| validate_relation_type(&triple.relation, s).is_acceptable())
}

/// Both ends share a label: the pattern is symmetric, so any written direction is fine.
fn same_label(triple: &Triple, schemas: &[Schema]) -> Option<Direction> {
    if !triple.first.shares_label_with(&triple.second) {
        return None;
    }
    schemas
        .iter()
        .any(|s| validate_relation_type(&triple.relation, s).is_acceptable())
        .then_some(triple.current)
}

fn both_labels(triple: &Triple, schemas: &[Schema]) -> Option<Direction> {
    let (first, second) = (&triple.first, &triple.second);
    for schema in schemas {
        let required = if first.has_label(&schema.source) && second.has_label(&schema.destination)
        {
            Direction::SourceToDestination
        } else if second.has_label(&schema.source) && first.has_label(&schema.destination) {
            Direction::DestinationToSource
        } else {
            continue;
        };

        match triple.current {
            Direction::Both | Direction::Malformed => return None,
            _ => {}
        }
        if validate_relation_type(&triple.relation, schema) == RelationTypeStatus::Valid {
            return Some(required);
        }
    }
    None
}

/// One end is unlabelled and the relation names the schema type explicitly.
fn one_label(triple: &Triple, schemas: &[Schema]) -> Option<Direction> {
    let (first, second) = (&triple.first, &triple.second);
    for schema in schemas {
        if !triple.relation.types.contains(&schema.relation) {
            continue;
        }
        let required = match lone_side(first, second, schema) {
            Some(dir) => dir,
            None => continue,
        };
        if validate_relation_type(&triple.relation, schema) == RelationTypeStatus::Valid {
            let swap = schema.source != schema.destination;
            return Some(if swap { required } else { triple.current });
        }
    }
    None
}

/// Orientation implied by the single labelled end.
fn lone_side(first: &Node, second: &Node, schema: &Schema) -> Option<Direction> {
    let (src, dst) = (schema.source.as_str(), schema.destination.as_str());
    if first.has_label(src) && !second.has_labels() {
        Some(Direction::SourceToDestination)
    } else if second.has_label(src) && !first.has_labels() {
        Some(Direction::DestinationToSource)
    } else if first.has_label(dst) && !second.has_labels() {
        Some(Direction::DestinationToSource)
    } else if second.has_label(dst) && !first.has_labels() {
        Some(Direction::SourceToDestination)
    } else {
        None
    }
}

/// The relation carries no type list; orientation comes from the labels alone.
fn untyped(triple: &Triple, schemas: &[Schema]) -> Option<Direction> {
    let (first, second) = (&triple.first, &triple.second);
    for schema in schemas {
        if validate_relation_type(&triple.relation, schema) != RelationTypeStatus::Empty {
            continue;
        }
        let (src, dst) = (schema.source.as_str(), schema.destination.as_str());
        let fits = |a: &Node, b: &Node| {
            (a.has_label(src) && b.has_label(dst))
                || (a.has_label(src) && !b.has_labels())
                || (!a.has_labels() && b.has_label(dst))
        };
        if fits(first, second) {
            return Some(Direction::SourceToDestination);
        }
        if fits(second, first) {
            return Some(Direction::DestinationToSource);
        }
    }
    None
}
