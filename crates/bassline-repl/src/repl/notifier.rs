//! Output notification system for the REPL
//!
//! Provides a trait-based system for handling REPL output, allowing different
//! output backends (console, file, test buffers) to be plugged in.

use parking_lot::Mutex;

/// Trait for handling REPL output notifications
pub trait ReplNotifier: Send + Sync {
    /// Handle regular output
    fn on_output(&self, content: &str);

    /// Handle error output
    fn on_error(&self, content: &str);

    /// Handle the stack after an evaluation, with timing information
    fn on_result(&self, stack: &str, duration_ms: u64, quiet: bool);
}

/// Default console-based notifier
#[derive(Debug, Default)]
pub struct DefaultNotifier;

impl DefaultNotifier {
    /// Create a new default notifier
    pub fn new() -> Self {
        Self
    }
}

impl ReplNotifier for DefaultNotifier {
    fn on_output(&self, content: &str) {
        if !content.is_empty() {
            println!("{}", content);
        }
    }

    fn on_error(&self, content: &str) {
        eprintln!("{}", content);
    }

    fn on_result(&self, stack: &str, duration_ms: u64, quiet: bool) {
        if quiet {
            if !stack.is_empty() {
                println!("{}", stack);
            }
        } else if stack.is_empty() {
            println!("ok ({}ms)", duration_ms);
        } else {
            println!("=> {} ({}ms)", stack, duration_ms);
        }
    }
}

/// Collects notifications in memory
#[derive(Debug, Default)]
pub struct BufferNotifier {
    lines: Mutex<Vec<String>>,
}

impl BufferNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl ReplNotifier for BufferNotifier {
    fn on_output(&self, content: &str) {
        self.lines.lock().push(content.to_string());
    }

    fn on_error(&self, content: &str) {
        self.lines.lock().push(format!("error: {}", content));
    }

    fn on_result(&self, stack: &str, _duration_ms: u64, _quiet: bool) {
        self.lines.lock().push(format!("=> {}", stack));
    }
}
