use thiserror::Error;

/// Errors raised while defining or executing words
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Configuration error: '{word}' requires a current vocabulary")]
    NoCurrentVocabulary { word: String },

    #[error("{0}")]
    Panic(String),

    #[error("Stack underflow in '{word}'")]
    StackUnderflow { word: String },

    #[error("Type error: '{word}' expected {expected}, got {actual}")]
    TypeError {
        word: String,
        expected: String,
        actual: String,
    },

    #[error("Unknown word: {0}")]
    UnknownWord(String),

    #[error("Unknown vocabulary: {0}")]
    UnknownVocabulary(String),

    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEnd { expected: String },

    #[error("Call depth exceeded ({0} frames)")]
    CallDepthExceeded(usize),

    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl RuntimeError {
    /// Create a type error for a word's argument
    pub fn type_error(word: &str, expected: &str, actual: &str) -> Self {
        Self::TypeError {
            word: word.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn underflow(word: &str) -> Self {
        Self::StackUnderflow {
            word: word.to_string(),
        }
    }

    pub fn unexpected_end(expected: &str) -> Self {
        Self::UnexpectedEnd {
            expected: expected.to_string(),
        }
    }

    /// True for errors produced by the `panic` primitive
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panic(_))
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
