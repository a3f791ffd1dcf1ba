//! Recognises a single node pattern `( ... )` or relationship pattern `-[ ... ]->` at the
//! current cursor position.
//!
//! Both entry points return [`Probe::NotFound`] instead of an error: the assembler simply keeps
//! probing further along the text. A failed node probe always moves the cursor forward by at
//! least one character, so the probe loop cannot stall.

use crate::model::{Node, Relation};
use crate::scanner::{BACKSLASH, BACKTICK, Scanner};

const LPAREN: char = '(';
const RPAREN: char = ')';
const LBRACKET: char = '[';
const RBRACKET: char = ']';
const LBRACE: char = '{';
const RBRACE: char = '}';
const COLON: char = ':';
const COMMA: char = ',';
const LT: char = '<';
const GT: char = '>';
const HYPHEN: char = '-';
const TYPE_NEGATION: char = '!';
const TYPE_ALTERNATION: char = '|';
const VARIABLE_LENGTH: char = '*';
const RANGE: &str = "..";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Found(T),
    NotFound,
}

impl<T> Probe<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Probe::Found(v) => Some(v),
            Probe::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Probe::Found(_))
    }
}

pub(crate) struct PatternParser<'input> {
    scanner: Scanner<'input>,
}

impl<'input> PatternParser<'input> {
    pub(crate) fn new(input: &'input str) -> Self {
        Self {
            scanner: Scanner::new(input),
        }
    }

    pub(crate) fn pos(&self) -> usize {
        self.scanner.pos()
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.scanner.is_eof()
    }

    pub(crate) fn skip_whitespace(&mut self) {
        self.scanner.skip_whitespace();
    }

    pub(crate) fn try_parse_node(&mut self) -> Probe<Node> {
        let offset = self.scanner.pos();
        if !self.scanner.eat(LPAREN) {
            self.scanner.advance();
            return Probe::NotFound;
        }
        self.scanner.skip_whitespace();

        // Parenthesised path groups `((a)-->(b))` are not node patterns. Stop on the inner
        // paren so the next probe starts there.
        if self.scanner.at(LPAREN) {
            return Probe::NotFound;
        }

        let variable = self.scanner.read_word();
        self.scanner.skip_whitespace();

        let labels = if self.scanner.at(COLON) {
            match self.parse_labels() {
                Some(labels) => labels,
                None => return Probe::NotFound,
            }
        } else {
            Vec::new()
        };

        self.scanner.skip_whitespace();
        self.scanner.skip_escaped();
        self.skip_property_block();
        self.scanner.skip_whitespace();

        if !self.scanner.eat(RPAREN) {
            return Probe::NotFound;
        }

        Probe::Found(Node {
            variable,
            labels,
            offset,
            label_was_inferred: false,
        })
    }

    /// `:A:B:C`
    fn parse_labels(&mut self) -> Option<Vec<String>> {
        let mut labels = Vec::new();
        while self.scanner.eat(COLON) {
            self.scanner.skip_whitespace();
            let label = self.scanner.read_word();
            if label.is_empty() {
                return None;
            }
            labels.push(label);
            self.scanner.skip_whitespace();
        }
        Some(labels)
    }

    /// Recognises `-`, `<-`, an optional `[...]` body, `-`, and an optional `>`.
    ///
    /// Nothing is consumed when the cursor is not on `<` or `-`.
    pub(crate) fn try_parse_relation(&mut self) -> Probe<Relation> {
        let mut rel = Relation::default();

        if self.scanner.at(LT) {
            rel.left_outer = Some(self.scanner.pos());
            rel.left.push(LT);
            self.scanner.advance();
            self.scanner.skip_whitespace();
            if !self.scanner.at(HYPHEN) {
                return Probe::NotFound;
            }
        } else if !self.scanner.at(HYPHEN) {
            return Probe::NotFound;
        }

        rel.left_inner = Some(self.scanner.pos());
        rel.left.push(HYPHEN);
        self.scanner.advance();
        self.scanner.skip_whitespace();

        if self.scanner.at(LBRACKET) && self.parse_relation_body(&mut rel).is_none() {
            return Probe::NotFound;
        }
        self.scanner.skip_whitespace();

        if !self.scanner.at(HYPHEN) {
            return Probe::NotFound;
        }
        rel.right_inner = Some(self.scanner.pos());
        rel.right.push(HYPHEN);
        self.scanner.advance();
        self.scanner.skip_whitespace();

        if self.scanner.at(GT) {
            rel.right_outer = Some(self.scanner.pos());
            rel.right.push(GT);
            self.scanner.advance();
        }

        Probe::Found(rel)
    }

    /// `[var:TYPE1|!TYPE2*1..3 {props}]`. Returns `None` as soon as anything does not fit,
    /// leaving the rest of the bracket unread.
    fn parse_relation_body(&mut self, rel: &mut Relation) -> Option<()> {
        if !self.scanner.eat(LBRACKET) {
            return None;
        }
        self.scanner.skip_whitespace();

        rel.variable = self.scanner.read_word();
        self.scanner.skip_whitespace();

        if self.scanner.eat(COLON) {
            self.parse_relation_types(rel)?;
        }
        self.scanner.skip_whitespace();

        rel.variable_length = self.skip_variable_length();
        self.scanner.skip_whitespace();

        self.skip_property_block();
        self.scanner.skip_whitespace();

        self.scanner.eat(RBRACKET).then_some(())
    }

    /// Type list after the colon: `A|B|!C`. The legacy `A|:B` spelling is accepted too.
    fn parse_relation_types(&mut self, rel: &mut Relation) -> Option<()> {
        loop {
            self.scanner.skip_whitespace();
            let negated = self.scanner.eat(TYPE_NEGATION);
            if negated {
                self.scanner.skip_whitespace();
            }

            let name = self.scanner.read_word();
            if name.is_empty() {
                return None;
            }
            if negated {
                rel.negative_types.push(name);
            } else {
                rel.types.push(name);
            }

            self.scanner.skip_whitespace();
            if !self.scanner.eat(TYPE_ALTERNATION) {
                return Some(());
            }
            self.scanner.skip_whitespace();
            self.scanner.eat(COLON);
        }
    }

    /// `*`, `*2`, `*2..`, `*..4`, `*1..4`, whitespace allowed between the parts.
    fn skip_variable_length(&mut self) -> bool {
        if !self.scanner.eat(VARIABLE_LENGTH) {
            return false;
        }
        self.scanner.skip_whitespace();
        self.scanner.skip_digits();
        self.scanner.skip_whitespace();

        if self.scanner.at_str(RANGE) {
            self.scanner.advance();
            self.scanner.advance();
            self.scanner.skip_whitespace();
            self.scanner.skip_digits();
            self.scanner.skip_whitespace();
        }
        true
    }

    /// Skips a `{name: value, ...}` map. Stops after the closing brace, or at end of input.
    pub(crate) fn skip_property_block(&mut self) {
        if !self.scanner.eat(LBRACE) {
            return;
        }
        loop {
            self.skip_properties();
            if self.scanner.eat(RBRACE) || self.scanner.is_eof() {
                return;
            }
            self.scanner.advance();
        }
    }

    /// `name: value, name: value` up to (not including) whatever ends the list.
    fn skip_properties(&mut self) {
        loop {
            self.scanner.skip_escaped();
            self.scanner.skip_whitespace();
            self.scanner.read_word();
            self.scanner.skip_whitespace();
            if !self.scanner.eat(COLON) {
                return;
            }
            self.scanner.skip_whitespace();
            self.skip_property_value();
            self.scanner.skip_whitespace();
            if !self.scanner.eat(COMMA) {
                return;
            }
        }
    }

    /// A value runs until a `,` or a closing delimiter at nesting depth zero. Quoted strings
    /// and backtick names inside it are skipped whole.
    fn skip_property_value(&mut self) {
        let mut depth = 0usize;
        while let Some(c) = self.scanner.peek() {
            match c {
                '\'' | '"' => {
                    self.scanner.skip_quoted(c);
                    continue;
                }
                BACKTICK => {
                    self.scanner.read_word();
                    continue;
                }
                BACKSLASH => {
                    self.scanner.skip_escaped();
                    continue;
                }
                LBRACKET | LBRACE | LPAREN => depth += 1,
                RBRACKET | RBRACE | RPAREN => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                COMMA if depth == 0 => return,
                _ => {}
            }
            self.scanner.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_node(text: &str) -> (Probe<Node>, Option<char>) {
        let mut p = PatternParser::new(text);
        let node = p.try_parse_node();
        (node, p.scanner.peek())
    }

    fn parse_relation(text: &str) -> Relation {
        let mut p = PatternParser::new(text);
        p.try_parse_relation()
            .found()
            .unwrap_or_else(|| panic!("no relation in {text:?}"))
    }

    fn found_node(text: &str) -> Node {
        parse_node(text)
            .0
            .found()
            .unwrap_or_else(|| panic!("no node in {text:?}"))
    }

    #[test]
    fn empty_node_stops_after_closing_paren() {
        let (node, next) = parse_node("()*");
        let node = node.found().unwrap();
        assert_eq!(node.variable, "");
        assert!(node.labels.is_empty());
        assert_eq!(node.offset, 0);
        assert_eq!(next, Some('*'));
    }

    #[test]
    fn node_with_variable_only() {
        let (node, next) = parse_node("(n)*");
        assert_eq!(node.found().unwrap().variable, "n");
        assert_eq!(next, Some('*'));
    }

    #[test]
    fn node_with_label_only() {
        let node = found_node("(:Road)");
        assert_eq!(node.variable, "");
        assert_eq!(node.labels, vec!["Road"]);
    }

    #[test]
    fn node_with_multiple_labels_and_backtick_variable() {
        let node = found_node("(`person`:Person:Employee)");
        assert_eq!(node.variable, "person");
        assert_eq!(node.labels, vec!["Person", "Employee"]);
    }

    #[test]
    fn node_tolerates_whitespace_and_newlines() {
        let node = found_node("( r :\n\n    Road )");
        assert_eq!(node.variable, "r");
        assert_eq!(node.labels, vec!["Road"]);
    }

    #[test]
    fn escaped_paren_does_not_close_node() {
        let (node, _) = parse_node("(r:Road \\)");
        assert_eq!(node, Probe::NotFound);

        let node = found_node("(r:Road \\))");
        assert_eq!(node.labels, vec!["Road"]);
    }

    #[test]
    fn node_with_property_block() {
        let node = found_node("(r:Road {`Rudimentär`: 'Test'})");
        assert_eq!(node.variable, "r");
        assert_eq!(node.labels, vec!["Road"]);
    }

    #[test]
    fn node_property_block_with_delimiters_inside_strings() {
        let (node, next) = parse_node("(r:Road {`Rudimentär`: 'Test}', Namn: \"Mitt namn\\}\"})*");
        assert_eq!(node.found().unwrap().labels, vec!["Road"]);
        assert_eq!(next, Some('*'));
    }

    #[test]
    fn node_property_block_with_unquoted_values() {
        let node = found_node("(m:Movie {year: 1999, tags: [test, 'a]b'], meta: {x: 1}} )");
        assert_eq!(node.variable, "m");
        assert_eq!(node.labels, vec!["Movie"]);
    }

    #[test]
    fn double_paren_is_not_a_node_but_inner_one_is() {
        let mut p = PatternParser::new("((p:Person))");
        assert_eq!(p.try_parse_node(), Probe::NotFound);
        assert_eq!(p.pos(), 1);
        let node = p.try_parse_node().found().unwrap();
        assert_eq!(node.variable, "p");
        assert_eq!(node.offset, 1);
    }

    #[test]
    fn non_paren_advances_exactly_one_char() {
        let mut p = PatternParser::new("MATCH");
        assert_eq!(p.try_parse_node(), Probe::NotFound);
        assert_eq!(p.pos(), 1);
    }

    #[test]
    fn unclosed_node_is_not_found_but_cursor_moves() {
        let mut p = PatternParser::new("(a:Person WHERE");
        assert_eq!(p.try_parse_node(), Probe::NotFound);
        assert!(p.pos() > 0);
    }

    #[test]
    fn empty_label_is_not_a_node() {
        assert_eq!(parse_node("(a:)").0, Probe::NotFound);
    }

    #[test]
    fn undirected_relation_offsets() {
        let rel = parse_relation("--");
        assert_eq!(rel.left, "-");
        assert_eq!(rel.right, "-");
        assert_eq!(rel.left_outer, None);
        assert_eq!(rel.left_inner, Some(0));
        assert_eq!(rel.right_inner, Some(1));
        assert_eq!(rel.right_outer, None);
        assert!(!rel.has_any_types());
        assert!(!rel.variable_length);
    }

    #[test]
    fn left_arrow_relation_offsets() {
        let rel = parse_relation("<--");
        assert_eq!(rel.left, "<-");
        assert_eq!(rel.right, "-");
        assert_eq!(rel.left_outer, Some(0));
        assert_eq!(rel.left_inner, Some(1));
        assert_eq!(rel.right_inner, Some(2));
        assert_eq!(rel.right_outer, None);
    }

    #[test]
    fn right_arrow_relation_offsets() {
        let rel = parse_relation("-->");
        assert_eq!(rel.left, "-");
        assert_eq!(rel.right, "->");
        assert_eq!(rel.left_outer, None);
        assert_eq!(rel.left_inner, Some(0));
        assert_eq!(rel.right_inner, Some(1));
        assert_eq!(rel.right_outer, Some(2));
    }

    #[test]
    fn arrowheads_on_both_ends_are_recorded() {
        let rel = parse_relation("<-[:KNOWS]->");
        assert_eq!(rel.left, "<-");
        assert_eq!(rel.right, "->");
        assert_eq!(rel.left_outer, Some(0));
        assert_eq!(rel.right_outer, Some(11));
    }

    #[test]
    fn relation_with_variable_body() {
        let rel = parse_relation("-[r]->");
        assert_eq!(rel.variable, "r");
        assert_eq!(rel.left_inner, Some(0));
        assert_eq!(rel.right_inner, Some(4));
        assert_eq!(rel.right_outer, Some(5));
    }

    #[test]
    fn full_relation_body() {
        let rel = parse_relation(
            "<-[r:`MyRel Type`|!Relation|!Rel*1..2 {Name: \"Andy\" , `Other()))Name` : 'Malle'} ]-",
        );
        assert_eq!(rel.left, "<-");
        assert_eq!(rel.right, "-");
        assert_eq!(rel.left_outer, Some(0));
        assert_eq!(rel.left_inner, Some(1));
        assert_eq!(rel.right_inner, Some(82));
        assert_eq!(rel.right_outer, None);
        assert_eq!(rel.types, vec!["MyRel Type"]);
        assert_eq!(rel.negative_types, vec!["Relation", "Rel"]);
        assert!(rel.variable_length);
        assert_eq!(rel.variable, "r");
    }

    #[test]
    fn full_relation_body_spread_over_lines() {
        let text = "<   -   [r:`MyRel Type`\n\n    |!Relation|!Rel\n\n    *\n\n    1 ..\n    2\n\n    {Name: \"Andy\" ,\n\n    `Other()))Name` : 'Malle'} ]-";
        let rel = parse_relation(text);
        assert_eq!(rel.left, "<-");
        assert_eq!(rel.left_outer, Some(0));
        assert_eq!(rel.left_inner, Some(4));
        assert_eq!(rel.right_inner, Some(text.len() - 1));
        assert_eq!(rel.types, vec!["MyRel Type"]);
        assert_eq!(rel.negative_types, vec!["Relation", "Rel"]);
        assert!(rel.variable_length);
    }

    #[test]
    fn types_with_backticks_and_negation() {
        let rel = parse_relation("-[:!`Relation\r\\()}}-` | Name ]-");
        assert_eq!(rel.negative_types, vec!["Relation\r\\()}}-"]);
        assert_eq!(rel.types, vec!["Name"]);
    }

    #[test]
    fn legacy_colon_alternation_is_accepted() {
        let rel = parse_relation("-[:KNOWS|:WORKS_AT]->");
        assert_eq!(rel.types, vec!["KNOWS", "WORKS_AT"]);
    }

    #[test]
    fn quantifier_variants_mark_variable_length() {
        for body in ["*", "*2", "*2..", "*..4", "*1..4", "* 1 ..    2", "*1 ..", "*2 {since: 1}"] {
            let rel = parse_relation(&format!("-[:DIRECTED{body}]->"));
            assert!(rel.variable_length, "{body}");
        }
        assert!(!parse_relation("-[:DIRECTED]->").variable_length);
    }

    #[test]
    fn malformed_bodies_are_not_relations() {
        for text in ["-[:]->", "-[:A|]->", "-[:A*1.2]->", "-[r:A", "-[r:A}]->", "-x", "<x"] {
            let mut p = PatternParser::new(text);
            assert_eq!(p.try_parse_relation(), Probe::NotFound, "{text}");
        }
    }

    #[test]
    fn relation_probe_consumes_nothing_off_glyph() {
        let mut p = PatternParser::new(", (b)");
        assert_eq!(p.try_parse_relation(), Probe::NotFound);
        assert_eq!(p.pos(), 0);
    }

    #[test]
    fn property_block_skip_stops_on_following_char() {
        for text in [
            "{Name: \"Test\"})",
            "{`Name`: \"Test\\)\n\n    \" }) ",
            "{`Name}`: \"Test\"})",
        ] {
            let mut p = PatternParser::new(text);
            p.skip_property_block();
            assert_eq!(p.scanner.peek(), Some(')'), "{text:?}");
        }
    }

    #[test]
    fn property_block_with_escapes_across_lines() {
        let mut p = PatternParser::new("{`Rudimentär`: 'Test}',\n\n\n    Namn: \"Mitt namn\\}\"}*");
        p.skip_property_block();
        assert_eq!(p.scanner.peek(), Some('*'));
    }

    #[test]
    fn unterminated_property_block_stops_at_end() {
        let mut p = PatternParser::new("{name: 'x'");
        p.skip_property_block();
        assert!(p.is_eof());
    }
}
