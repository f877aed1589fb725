//! Whitespace-delimited token stream over source text
//!
//! Parsing words (`hook`, `chron`, `doc{`, `key:` ...) consume their
//! arguments straight from the input the interpreter is currently reading, so
//! the tokenizer is a cursor rather than a pre-split token list.

/// The only characters that separate tokens
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// A string literal as written in source plus its decoded value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    pub raw: String,
    pub value: String,
}

/// Cursor over a piece of source text
#[derive(Debug, Clone)]
pub struct Tokenizer {
    source: String,
    pos: usize,
}

impl Tokenizer {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            pos: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Unconsumed input
    pub fn rest(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.rest().chars().all(is_whitespace)
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let skipped = rest.len() - rest.trim_start_matches(is_whitespace).len();
        self.pos += skipped;
    }

    fn token_bounds(&self) -> Option<(usize, usize)> {
        let rest = self.rest();
        let start = self.pos + (rest.len() - rest.trim_start_matches(is_whitespace).len());
        let tail = &self.source[start..];
        if tail.is_empty() {
            return None;
        }
        let len = tail.find(is_whitespace).unwrap_or(tail.len());
        Some((start, start + len))
    }

    /// Look at the next token without consuming it
    pub fn peek_token(&self) -> Option<&str> {
        self.token_bounds().map(|(start, end)| &self.source[start..end])
    }

    /// Consume and return the next token
    pub fn consume_token(&mut self) -> Option<String> {
        let (start, end) = self.token_bounds()?;
        self.pos = end;
        Some(self.source[start..end].to_string())
    }

    /// Consume raw characters up to the first one matching `predicate`.
    ///
    /// The matching character is consumed but not returned. Returns `None`
    /// (leaving the cursor at the end of input) when no character matches.
    pub fn consume_until<P>(&mut self, mut predicate: P) -> Option<String>
    where
        P: FnMut(char) -> bool,
    {
        let rest = self.rest();
        match rest.char_indices().find(|(_, c)| predicate(*c)) {
            Some((offset, c)) => {
                let text = rest[..offset].to_string();
                self.pos += offset + c.len_utf8();
                Some(text)
            }
            None => {
                self.pos = self.source.len();
                None
            }
        }
    }

    /// Skip to the end of the current line
    pub fn skip_line(&mut self) {
        let _ = self.consume_until(|c| c == '\n');
    }

    /// Consume a `"..."` literal starting at the next token.
    ///
    /// Supports `\"`, `\\`, `\n` and `\t` escapes. Returns `None` if the next
    /// token does not start with a quote or the literal is unterminated.
    pub fn consume_string_literal(&mut self) -> Option<StringLiteral> {
        self.skip_whitespace();
        let rest = self.rest();
        if !rest.starts_with('"') {
            return None;
        }

        let mut value = String::new();
        let mut escaped = false;
        for (offset, c) in rest.char_indices().skip(1) {
            if escaped {
                value.push(match c {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                let end = offset + 1;
                let raw = rest[..end].to_string();
                self.pos += end;
                return Some(StringLiteral { raw, value });
            } else {
                value.push(c);
            }
        }
        None
    }

    /// Consume tokens up to the `close` token matching an already consumed
    /// `open` token, honouring nesting, string literals and `!` comments.
    ///
    /// Returns the raw source between the delimiters.
    pub fn consume_balanced(&mut self, open: &str, close: &str) -> Option<String> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            let token = self.peek_token()?;
            if token.starts_with('"') {
                self.consume_string_literal()?;
                continue;
            }
            if token == "!" {
                self.skip_line();
                continue;
            }
            let (token_start, token_end) = self.token_bounds()?;
            let token = &self.source[token_start..token_end];
            if token == open {
                depth += 1;
            } else if token == close {
                if depth == 0 {
                    let inner = self.source[start..token_start].to_string();
                    self.pos = token_end;
                    return Some(inner);
                }
                depth -= 1;
            }
            self.pos = token_end;
        }
    }
}
