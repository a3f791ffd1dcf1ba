//! Moves arrowheads in the original query text.
//!
//! Every edit is a single-character insert or remove at an offset recorded by the parser. The
//! edits of all triples are gathered first and then applied from the highest offset down, so an
//! edit never shifts an offset that is still waiting to be used.

use crate::direction::Direction;
use crate::model::Triple;
use tracing::{debug, warn};

const LT: char = '<';
const GT: char = '>';
const HYPHEN: char = '-';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Insert { offset: usize, glyph: char },
    /// `glyph` is what the text must hold at `offset` for the removal to go ahead.
    Remove { offset: usize, glyph: char },
}

impl Edit {
    fn offset(self) -> usize {
        match self {
            Edit::Insert { offset, .. } | Edit::Remove { offset, .. } => offset,
        }
    }

    /// Removals sort after insertions at the same offset, so that they run first once the list
    /// is reversed.
    fn rank(self) -> u8 {
        match self {
            Edit::Insert { .. } => 0,
            Edit::Remove { .. } => 1,
        }
    }
}

/// Applies the flips required by `triples` to `query`.
pub fn rewrite(query: &str, triples: &[Triple]) -> String {
    let mut edits: Vec<Edit> = triples.iter().flat_map(edits_for).collect();
    edits.sort_by_key(|e| (e.offset(), e.rank()));
    edits.dedup();

    let mut out = query.to_string();
    for edit in edits.into_iter().rev() {
        apply(&mut out, edit);
    }
    out
}

fn edits_for(triple: &Triple) -> Vec<Edit> {
    if !triple.needs_flip() {
        return Vec::new();
    }
    let rel = &triple.relation;
    let mut edits = Vec::with_capacity(2);

    match triple.required {
        Some(Direction::DestinationToSource) => {
            let Some(left_inner) = rel.left_inner else {
                return Vec::new();
            };
            if let Some(offset) = rel.right_outer {
                edits.push(Edit::Remove { offset, glyph: GT });
            }
            edits.push(Edit::Insert {
                offset: left_inner,
                glyph: LT,
            });
        }
        Some(Direction::SourceToDestination) => {
            let Some(right_inner) = rel.right_inner else {
                return Vec::new();
            };
            edits.push(Edit::Insert {
                offset: right_inner + HYPHEN.len_utf8(),
                glyph: GT,
            });
            if let Some(offset) = rel.left_outer {
                edits.push(Edit::Remove { offset, glyph: LT });
            }
        }
        _ => return Vec::new(),
    }

    debug!(triple = %triple, edits = edits.len(), "rewrite.flip");
    edits
}

fn apply(text: &mut String, edit: Edit) {
    match edit {
        Edit::Insert { offset, glyph } => {
            if offset > text.len() || !text.is_char_boundary(offset) {
                warn!(offset, %glyph, len = text.len(), "rewrite.insert_out_of_range");
                return;
            }
            text.insert(offset, glyph);
        }
        Edit::Remove { offset, glyph } => {
            if !text.is_char_boundary(offset) || text[offset..].chars().next() != Some(glyph) {
                warn!(offset, %glyph, "rewrite.remove_glyph_mismatch");
                return;
            }
            text.remove(offset);
        }
    }
}
