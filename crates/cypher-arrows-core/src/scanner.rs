//! Character cursor over the query text.
//!
//! Positions are byte offsets, so they can be handed straight to `String::insert`/`remove`
//! when the rewriter edits the original text. End of input is `None`; running out of input in
//! the middle of a token just truncates it.

pub(crate) const BACKSLASH: char = '\\';
pub(crate) const BACKTICK: char = '`';

pub(crate) struct Scanner<'input> {
    input: &'input str,
    pos: usize,
}

impl<'input> Scanner<'input> {
    pub(crate) fn new(input: &'input str) -> Self {
        Self { input, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    pub(crate) fn at(&self, c: char) -> bool {
        self.peek() == Some(c)
    }

    pub(crate) fn at_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    /// Consumes exactly one character. A no-op at end of input.
    pub(crate) fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes `c` if it is the current character.
    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.at(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Skips any run of `\x` escape pairs.
    pub(crate) fn skip_escaped(&mut self) {
        while self.eat(BACKSLASH) {
            self.advance();
        }
    }

    pub(crate) fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    /// Skips a `'...'` or `"..."` run including both quotes, honouring backslash escapes.
    /// Does nothing unless the cursor sits on `quote`.
    pub(crate) fn skip_quoted(&mut self, quote: char) {
        if !self.eat(quote) {
            return;
        }
        loop {
            self.skip_escaped();
            match self.advance() {
                None => return,
                Some(c) if c == quote => return,
                Some(_) => {}
            }
        }
    }

    /// Reads an identifier: a letter followed by letters, digits or `_`, or a backtick-quoted
    /// name whose interior is returned verbatim (escapes included). Returns an empty string
    /// when the cursor is not on an identifier start.
    pub(crate) fn read_word(&mut self) -> String {
        if self.eat(BACKTICK) {
            let start = self.pos;
            loop {
                self.skip_escaped();
                let end = self.pos;
                match self.advance() {
                    None | Some(BACKTICK) => return self.input[start..end].to_string(),
                    Some(_) => {}
                }
            }
        }

        let start = self.pos;
        if !self.peek().is_some_and(is_word_start) {
            return String::new();
        }
        while let Some(c) = self.peek() {
            if !is_word_char(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.input[start..self.pos].to_string()
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
