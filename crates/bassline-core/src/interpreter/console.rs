//! Output sink behind the io vocabulary

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Error,
    Warn,
}

/// Where `.log`, `.error` and `.warn` write
pub trait Console: Send + Sync {
    fn log(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Writes to stdout / stderr
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn log(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn warn(&self, message: &str) {
        eprintln!("warning: {}", message);
    }
}

/// Records every line, for tests and embedding
#[derive(Debug, Default)]
pub struct BufferConsole {
    lines: Mutex<Vec<(ConsoleLevel, String)>>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(ConsoleLevel, String)> {
        self.lines.lock().clone()
    }

    /// Messages only, regardless of level
    pub fn messages(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    fn push(&self, level: ConsoleLevel, message: &str) {
        self.lines.lock().push((level, message.to_string()));
    }
}

impl Console for BufferConsole {
    fn log(&self, message: &str) {
        self.push(ConsoleLevel::Log, message);
    }

    fn error(&self, message: &str) {
        self.push(ConsoleLevel::Error, message);
    }

    fn warn(&self, message: &str) {
        self.push(ConsoleLevel::Warn, message);
    }
}
