//! # Bassline Core
//!
//! Word interpreter runtime for Bassline, including:
//! - Tokenizer and value model
//! - Interpreter with vocabularies, immediate words and quotations
//! - Hook objects, event dispatch and periodic chrons
//! - Editor annotations and reflection over word metadata
//!
//! The REPL crate builds on this; embedding applications can drive an
//! [`Interpreter`] directly and subscribe to its [`EventBus`].

#![warn(clippy::all)]

pub mod events;
pub mod interpreter;
pub mod storage;
pub mod tokenizer;
pub mod value;
pub mod vocabs;

// Re-export commonly used types
pub use events::{Event, EventBus, EventPattern, Subscription};
pub use interpreter::{
    console::{BufferConsole, Console, ConsoleLevel, StdConsole},
    errors::RuntimeError,
    hook::{Hook, HookRef},
    scheduler::{ChronScheduler, ChronTick, TokioChronScheduler},
    word::{AttributeValue, Attributes, Vocab, VocabRef, Word, WordBody, WordRef},
    Interpreter,
};
pub use storage::{Database, QueryResult, SqliteDatabase, StorageError};
pub use value::{Quotation, Value};

/// Bassline version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for Bassline components.
///
/// `RUST_LOG` wins when set; otherwise core logs at info.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bassline_core=info"));
    // A subscriber may already be installed by the embedding application
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Core runtime configuration
#[derive(Debug, Clone)]
pub struct BasslineConfig {
    /// SQLite database backing the `query` word, if any
    pub database_path: Option<std::path::PathBuf>,
    /// Enable debug mode
    pub debug: bool,
    /// Maximum nesting of input frames (quotations, definitions, lists)
    pub max_call_depth: usize,
}

impl Default for BasslineConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            debug: false,
            max_call_depth: 1000,
        }
    }
}

/// Error types for Bassline core operations
#[derive(thiserror::Error, Debug)]
pub enum BasslineError {
    /// Error raised by a word
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Storage-related error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for Bassline core operations
pub type Result<T> = std::result::Result<T, BasslineError>;
