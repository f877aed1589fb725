//! Multi-line input collection for the REPL
//!
//! Lines are buffered until quotations, list literals, `doc{` blocks,
//! `: ... ;` definitions and string literals are all closed.

use bassline_core::tokenizer::Tokenizer;

/// Result of processing a line of input
#[derive(Debug, PartialEq, Eq)]
pub enum LineProcessResult {
    /// Input is complete and ready for execution
    Complete(String),
    /// More input is needed to complete the statement
    NeedMore,
}

/// Collects multi-line input for complete statements
#[derive(Debug, Default)]
pub struct MultiLineCollector {
    /// Buffer for collecting lines
    buffer: String,
}

impl MultiLineCollector {
    /// Create a new multi-line collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the appropriate prompt for the current state
    pub fn get_prompt(&self) -> &'static str {
        if self.is_collecting() {
            "   " // Continuation prompt
        } else {
            ">> " // Main prompt
        }
    }

    /// Check if we're currently collecting a multi-line statement
    pub fn is_collecting(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Reset the collector state
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Process a line of input
    pub fn process_line(&mut self, line: &str) -> LineProcessResult {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(line);

        if is_complete(&self.buffer) {
            let complete_code = std::mem::take(&mut self.buffer);
            LineProcessResult::Complete(complete_code)
        } else {
            LineProcessResult::NeedMore
        }
    }
}

fn is_complete(source: &str) -> bool {
    let mut tokens = Tokenizer::new(source);
    let mut depth = 0i32;
    let mut defining = false;

    while let Some(is_string) = tokens.peek_token().map(|t| t.starts_with('"')) {
        if is_string {
            if tokens.consume_string_literal().is_none() {
                return false;
            }
            continue;
        }
        let Some(token) = tokens.consume_token() else {
            break;
        };
        match token.as_str() {
            "!" => tokens.skip_line(),
            // doc text runs to the first `}` character, attached or not
            "doc{" => {
                if tokens.consume_until(|c| c == '}').is_none() {
                    return false;
                }
            }
            "[" | "{" => depth += 1,
            "]" | "}" => depth -= 1,
            ":" => defining = true,
            ";" => defining = false,
            _ => {}
        }
    }

    depth <= 0 && !defining
}
