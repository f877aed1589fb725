//! REPL (Read-Eval-Print Loop) functionality for Bassline
//!
//! This module wraps the core interpreter with user-friendly features like:
//! - Multi-line input collection
//! - REPL commands (.help, .quit, .words, etc.)
//! - Chron tick dispatch and toast display
//! - Output formatting and notifications

use std::{sync::Arc, time::Instant};

use anyhow::Result;
use bassline_core::{Attributes, BasslineConfig, Event, Interpreter, Value};
use serde::Serialize;
use tracing::{debug, warn};

pub mod commands;
pub mod multiline;
pub mod notifier;

pub use commands::{is_command, ReplCommand};
pub use multiline::{LineProcessResult, MultiLineCollector};
pub use notifier::{BufferNotifier, DefaultNotifier, ReplNotifier};

/// What `.describe` prints
#[derive(Debug, Serialize)]
struct WordDescription<'a> {
    name: &'a str,
    vocab: &'a str,
    immediate: bool,
    attributes: Attributes,
}

/// Interactive REPL for the Bassline interpreter
pub struct Repl {
    /// Core interpreter
    interpreter: Interpreter,
    /// Current notifier for output
    notifier: Arc<dyn ReplNotifier>,
    /// Pending multi-line input
    multiline: MultiLineCollector,
    /// Whether the REPL is running
    running: bool,
    /// Quiet mode (suppress timing info)
    quiet: bool,
    /// Debug mode
    debug: bool,
}

impl Repl {
    /// Create a new REPL around the given interpreter
    pub fn new(interpreter: Interpreter) -> Result<Self> {
        let debug = interpreter.config().debug;
        Ok(Self {
            interpreter,
            notifier: Arc::new(DefaultNotifier::new()),
            multiline: MultiLineCollector::new(),
            running: true,
            quiet: false,
            debug,
        })
    }

    /// Create a new REPL backed by a database file (for testing)
    pub fn with_database_path<P: Into<std::path::PathBuf>>(path: P) -> Result<Self> {
        let config = BasslineConfig {
            database_path: Some(path.into()),
            ..Default::default()
        };
        let interpreter = Interpreter::new(config)?;
        Self::new(interpreter)
    }

    /// Set the notifier for this REPL
    pub fn set_notifier(&mut self, notifier: Arc<dyn ReplNotifier>) {
        self.notifier = notifier;
    }

    /// Get the current notifier
    pub fn notifier(&self) -> Arc<dyn ReplNotifier> {
        self.notifier.clone()
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Check if the REPL is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Set quiet mode
    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    /// Set debug mode
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Prompt for the next line
    pub fn prompt(&self) -> &'static str {
        self.multiline.get_prompt()
    }

    /// Drop any partially collected input
    pub fn cancel_input(&mut self) -> bool {
        let was_collecting = self.multiline.is_collecting();
        self.multiline.reset();
        was_collecting
    }

    /// Parse REPL input into a command
    pub fn parse_input(&self, input: &str) -> Result<ReplCommand> {
        commands::parse_command(input)
    }

    /// Route one line of input: REPL commands run immediately, anything
    /// else is collected until complete and then executed
    pub async fn handle_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if !self.multiline.is_collecting() {
            if trimmed.is_empty() {
                return;
            }
            if is_command(trimmed) {
                let result = self
                    .parse_input(trimmed)
                    .and_then(|command| self.handle_command(command));
                match result {
                    Ok(output) => self.notifier.on_output(&output),
                    Err(e) => self.notifier.on_error(&format!("Error: {e}")),
                }
                return;
            }
        }

        if let LineProcessResult::Complete(code) = self.multiline.process_line(line) {
            match self.execute(&code).await {
                Ok((output, duration)) => self.notifier.on_result(&output, duration, self.quiet),
                Err(e) => self.report_error(&e),
            }
        }
    }

    /// Handle a REPL command
    pub fn handle_command(&mut self, command: ReplCommand) -> Result<String> {
        match command {
            ReplCommand::Help => Ok(self.get_help_text()),
            ReplCommand::Quit => {
                self.running = false;
                Ok("Goodbye!".to_string())
            }
            ReplCommand::Stack => Ok(self.show_stack()),
            ReplCommand::ClearStack => {
                self.interpreter.clear_stack();
                Ok("Stack cleared.".to_string())
            }
            ReplCommand::Words => Ok(self.list_words()),
            ReplCommand::Describe(name) => self.describe(&name),
            ReplCommand::Chrons => Ok(self.list_chrons()),
            ReplCommand::Quiet => {
                self.quiet = !self.quiet;
                Ok(format!(
                    "Quiet mode: {}",
                    if self.quiet { "on" } else { "off" }
                ))
            }
            ReplCommand::Debug => {
                self.debug = !self.debug;
                Ok(format!(
                    "Debug mode: {}",
                    if self.debug { "on" } else { "off" }
                ))
            }
        }
    }

    /// Execute Bassline source and return the resulting stack with timing
    pub async fn execute(&mut self, code: &str) -> Result<(String, u64)> {
        let start = Instant::now();
        self.interpreter.execute(code).await?;
        let duration = start.elapsed().as_millis() as u64;
        Ok((format_stack(self.interpreter.stack()), duration))
    }

    /// Execute a whole script and report the final stack.
    ///
    /// Nothing dispatches ticks once a script finishes, so chrons it leaves
    /// running are reported instead of silently never firing.
    pub async fn run_script(&mut self, source: &str) -> Result<()> {
        let (output, duration) = self.execute(source).await?;
        self.notifier.on_result(&output, duration, self.quiet);

        let chrons = self.interpreter.active_chrons();
        if !chrons.is_empty() {
            let names: Vec<&str> = chrons.iter().map(|(name, _)| name.as_str()).collect();
            warn!(chrons = %names.join(", "), "Chrons started by a script do not fire");
            self.notifier.on_error(&format!(
                "Warning: chrons do not fire in script mode: {}",
                names.join(", ")
            ));
        }
        Ok(())
    }

    /// Run the listeners of a chron that just ticked
    pub async fn fire_chron(&mut self, name: &str) {
        debug!(chron = name, "Dispatching chron tick");
        if let Err(e) = self.interpreter.fire_chron(name).await {
            self.report_error(&anyhow::Error::from(e).context(format!("chron '{}'", name)));
        }
    }

    fn report_error(&self, error: &anyhow::Error) {
        if self.debug {
            self.notifier.on_error(&format!("Error: {error:?}"));
        } else {
            self.notifier.on_error(&format!("Error: {error:#}"));
        }
    }

    fn show_stack(&self) -> String {
        let stack = self.interpreter.stack();
        if stack.is_empty() {
            return "Stack is empty.".to_string();
        }
        stack
            .iter()
            .enumerate()
            .map(|(depth, value)| format!("  {}: {}", stack.len() - depth - 1, value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn list_words(&self) -> String {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for word in self.interpreter.words() {
            match groups.last_mut() {
                Some((vocab, names)) if vocab.as_str() == word.vocab() => names.push(word.name().to_string()),
                _ => groups.push((word.vocab().to_string(), vec![word.name().to_string()])),
            }
        }
        groups
            .iter()
            .map(|(vocab, names)| format!("{}: {}", vocab, names.join(" ")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn describe(&self, name: &str) -> Result<String> {
        let word = self
            .interpreter
            .find(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown word: {}", name))?;
        let description = WordDescription {
            name: word.name(),
            vocab: word.vocab(),
            immediate: word.is_immediate(),
            attributes: word.attributes(),
        };
        Ok(serde_json::to_string_pretty(&description)?)
    }

    fn list_chrons(&self) -> String {
        let chrons = self.interpreter.active_chrons();
        if chrons.is_empty() {
            return "No chrons running.".to_string();
        }
        chrons
            .iter()
            .map(|(name, period)| format!("  {} every {}ms", name, period.as_millis()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Get help text
    fn get_help_text(&self) -> String {
        let vocabs: Vec<&str> = self.interpreter.vocabs().iter().map(|v| v.name()).collect();
        format!(
            r#"Bassline REPL Commands:
  .help              - Show this help message
  .quit              - Exit the REPL
  .stack             - Show the data stack
  .clear-stack       - Empty the data stack
  .words             - List words by vocabulary
  .describe <word>   - Show a word's attributes
  .chrons            - List running chrons
  .quiet             - Toggle quiet mode (hide timing info)
  .debug             - Toggle debug mode

Language:
  - Literals: 42 1.5 "text" [ quotation ] {{ list }}
  - Definitions: : name body ;
  - Annotations: : save cmd key: ctrl+s doc{{ Saves }} ... ;
  - Hooks: hook saved  saved "k" [ ... ] .when  saved .trigger
  - Events: "name" payload emit   "info" "Saved" toast
  - Chrons: chron refresh 5s   : poll every: 10m ... ;

Vocabularies: {}"#,
            vocabs.join(" ")
        )
    }

    /// Show exit statistics
    pub fn show_exit_stats(&self) {
        if !self.quiet {
            println!("\nSession complete.");
        }
    }
}

/// Render the data stack bottom to top
pub fn format_stack(stack: &[Value]) -> String {
    stack
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a `toast:show` event
pub fn format_toast(event: &Event) -> String {
    let kind = event.payload["type"].as_str().unwrap_or("info");
    let message = match &event.payload["message"] {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("[{}] {}", kind, message)
}
