//! Host interpreter: word registry, data stack, input frames and the
//! primitives vocabularies build on (`def`, `find`, `parse`, `run_fresh`,
//! `emit_event`, `start_chron`, `stop_chron`, `db`, `panic`).

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, trace, warn};

pub mod console;
pub mod errors;
pub mod hook;
pub mod scheduler;
pub mod word;

use self::{
    console::{Console, StdConsole},
    errors::{Result, RuntimeError},
    hook::{HookRef, HookTable},
    scheduler::{ChronScheduler, ChronTick, TokioChronScheduler},
    word::{Primitive, Vocab, VocabRef, Word, WordBody, WordRef},
};
use crate::{
    events::{Event, EventBus},
    storage::{Database, SqliteDatabase},
    tokenizer::Tokenizer,
    value::{Quotation, Value},
    BasslineConfig, BasslineError,
};


/// Vocabulary that receives user definitions in a fresh interpreter
pub const DEFAULT_VOCABULARY: &str = "scratchpad";

enum Item {
    Literal(Value),
    /// Source of a `{ ... }` literal, evaluated when reached
    List(String),
    Word(String),
}

/// Interpreter state shared by every vocabulary
pub struct Interpreter {
    stack: Vec<Value>,
    frames: Vec<Tokenizer>,
    /// Every known vocabulary by name
    dictionary: IndexMap<String, VocabRef>,
    /// Search list used by `find` and `words`
    vocabs: Vec<VocabRef>,
    current: Option<VocabRef>,
    last: Option<WordRef>,
    hooks: HookTable,
    scheduler: Box<dyn ChronScheduler>,
    chron_ticks: Option<UnboundedReceiver<ChronTick>>,
    events: Arc<EventBus>,
    console: Arc<dyn Console>,
    db: Option<Arc<dyn Database>>,
    config: BasslineConfig,
}

impl Interpreter {
    /// Create an interpreter with every vocabulary installed and
    /// `scratchpad` as the current vocabulary
    pub fn new(config: BasslineConfig) -> std::result::Result<Self, BasslineError> {
        if config.max_call_depth == 0 {
            return Err(BasslineError::Config(
                "max_call_depth must be at least 1".to_string(),
            ));
        }

        let db: Option<Arc<dyn Database>> = match &config.database_path {
            Some(path) => Some(Arc::new(SqliteDatabase::open(path)?)),
            None => None,
        };

        let (tick_sender, tick_receiver) = mpsc::unbounded_channel();
        let mut interpreter = Self {
            stack: Vec::new(),
            frames: Vec::new(),
            dictionary: IndexMap::new(),
            vocabs: Vec::new(),
            current: None,
            last: None,
            hooks: HookTable::default(),
            scheduler: Box::new(TokioChronScheduler::new(tick_sender)),
            chron_ticks: Some(tick_receiver),
            events: Arc::new(EventBus::new()),
            console: Arc::new(StdConsole),
            db,
            config,
        };

        crate::vocabs::install_all(&mut interpreter)?;
        interpreter.set_current(Some(DEFAULT_VOCABULARY));
        interpreter.last = None;
        Ok(interpreter)
    }

    pub fn with_console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = console;
        self
    }

    pub fn with_database(mut self, db: Arc<dyn Database>) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Box<dyn ChronScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn config(&self) -> &BasslineConfig {
        &self.config
    }

    // --- data stack -------------------------------------------------------

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn set_stack(&mut self, stack: Vec<Value>) {
        self.stack = stack;
    }

    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop(&mut self, word: &str) -> Result<Value> {
        self.stack.pop().ok_or_else(|| RuntimeError::underflow(word))
    }

    pub fn pop_string(&mut self, word: &str) -> Result<String> {
        match self.pop(word)? {
            Value::String(s) => Ok(s),
            other => Err(RuntimeError::type_error(word, "string", other.type_name())),
        }
    }

    pub fn pop_quotation(&mut self, word: &str) -> Result<Quotation> {
        match self.pop(word)? {
            Value::Quotation(q) => Ok(q),
            other => Err(RuntimeError::type_error(word, "quotation", other.type_name())),
        }
    }

    pub fn pop_hook(&mut self, word: &str) -> Result<HookRef> {
        match self.pop(word)? {
            Value::Hook(h) => Ok(h),
            other => Err(RuntimeError::type_error(word, "hook", other.type_name())),
        }
    }

    // --- vocabularies and words ------------------------------------------

    pub fn last(&self) -> Option<WordRef> {
        self.last.clone()
    }

    pub fn current(&self) -> Option<VocabRef> {
        self.current.clone()
    }

    /// The search list
    pub fn vocabs(&self) -> &[VocabRef] {
        &self.vocabs
    }

    pub fn vocabulary(&self, name: &str) -> Option<VocabRef> {
        self.dictionary.get(name).cloned()
    }

    fn vocabulary_or_create(&mut self, name: &str) -> VocabRef {
        self.dictionary
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Vocab::new(name)))
            .clone()
    }

    /// Make `name` the current vocabulary (creating it if needed), or clear it
    pub fn set_current(&mut self, name: Option<&str>) {
        self.current = name.map(|name| self.vocabulary_or_create(name));
    }

    /// Append a known vocabulary to the search list
    pub fn use_vocabulary(&mut self, name: &str) -> Result<()> {
        let vocab = self
            .vocabulary(name)
            .ok_or_else(|| RuntimeError::UnknownVocabulary(name.to_string()))?;
        if !self.vocabs.iter().any(|v| Arc::ptr_eq(v, &vocab)) {
            self.vocabs.push(vocab);
        }
        Ok(())
    }

    /// Run a vocabulary factory: `name` joins the search list and is current
    /// while `install` runs, then the previous current vocabulary is restored
    pub fn with_vocabulary<F>(&mut self, name: &str, install: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let vocab = self.vocabulary_or_create(name);
        if !self.vocabs.iter().any(|v| Arc::ptr_eq(v, &vocab)) {
            self.vocabs.push(vocab.clone());
        }
        let previous = self.current.replace(vocab);
        let result = install(self);
        self.current = previous;
        debug!(vocab = name, "Installed vocabulary");
        result
    }

    /// Define a word in the current vocabulary; it becomes `last`
    pub fn def(&mut self, name: &str, body: WordBody, immediate: bool) -> Result<WordRef> {
        let vocab = self
            .current
            .clone()
            .ok_or_else(|| RuntimeError::NoCurrentVocabulary {
                word: name.to_string(),
            })?;
        let word = Arc::new(Word::new(name, vocab.name(), body, immediate));
        vocab.insert(word.clone());
        self.last = Some(word.clone());
        trace!(word = name, vocab = vocab.name(), "Defined word");
        Ok(word)
    }

    /// Look a word up in the current vocabulary, then the search list from
    /// the most recently added vocabulary backwards
    pub fn find(&self, name: &str) -> Option<WordRef> {
        if let Some(word) = self.current.as_ref().and_then(|v| v.get(name)) {
            return Some(word);
        }
        self.vocabs.iter().rev().find_map(|v| v.get(name))
    }

    /// Every word in the search list, plus the current vocabulary's words
    /// when it is not part of the search list
    pub fn words(&self) -> Vec<WordRef> {
        let mut words: Vec<WordRef> = self.vocabs.iter().flat_map(|v| v.words()).collect();
        if let Some(current) = &self.current {
            if !self.vocabs.iter().any(|v| Arc::ptr_eq(v, current)) {
                words.extend(current.words());
            }
        }
        words
    }

    pub fn hooks(&self) -> &HookTable {
        &self.hooks
    }

    pub(crate) fn hooks_mut(&mut self) -> &mut HookTable {
        &mut self.hooks
    }

    // --- input ------------------------------------------------------------

    fn push_frame(&mut self, source: String) -> Result<()> {
        if self.frames.len() >= self.config.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded(self.frames.len()));
        }
        self.frames.push(Tokenizer::new(source));
        Ok(())
    }

    /// Consume the next whitespace-delimited token of the input being read
    pub fn parse_token(&mut self, word: &str) -> Result<String> {
        self.frames
            .last_mut()
            .and_then(Tokenizer::consume_token)
            .ok_or_else(|| RuntimeError::unexpected_end(&format!("a token after '{}'", word)))
    }

    /// Consume raw input up to the first character matching `predicate`
    pub fn parse_until<P>(&mut self, word: &str, predicate: P) -> Result<String>
    where
        P: FnMut(char) -> bool,
    {
        self.frames
            .last_mut()
            .and_then(|frame| frame.consume_until(predicate))
            .ok_or_else(|| RuntimeError::unexpected_end(&format!("terminator for '{}'", word)))
    }

    fn next_item(&mut self) -> Result<Option<Item>> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Ok(None);
            };
            let Some(is_string) = frame.peek_token().map(|t| t.starts_with('"')) else {
                return Ok(None);
            };
            if is_string {
                let literal = frame
                    .consume_string_literal()
                    .ok_or_else(|| RuntimeError::unexpected_end("closing '\"'"))?;
                return Ok(Some(Item::Literal(Value::String(literal.value))));
            }

            let Some(token) = frame.consume_token() else {
                return Ok(None);
            };
            match token.as_str() {
                "!" => frame.skip_line(),
                "[" => {
                    let body = frame
                        .consume_balanced("[", "]")
                        .ok_or_else(|| RuntimeError::unexpected_end("']'"))?;
                    return Ok(Some(Item::Literal(Value::Quotation(Quotation::new(body)))));
                }
                "{" => {
                    let body = frame
                        .consume_balanced("{", "}")
                        .ok_or_else(|| RuntimeError::unexpected_end("'}'"))?;
                    return Ok(Some(Item::List(body)));
                }
                _ => {
                    return Ok(Some(match parse_number(&token) {
                        Some(number) => Item::Literal(number),
                        None => Item::Word(token),
                    }))
                }
            }
        }
    }

    // --- execution --------------------------------------------------------

    /// Run top-level source; the data stack persists between calls
    pub fn execute<'a>(&'a mut self, source: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.push_frame(source.to_string())?;
            let result = self.run_frame().await;
            self.frames.pop();
            result
        })
    }

    fn run_frame(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            while let Some(item) = self.next_item()? {
                match item {
                    Item::Literal(value) => self.push(value),
                    Item::List(source) => self.evaluate_list(source).await?,
                    Item::Word(name) => {
                        let word = self
                            .find(&name)
                            .ok_or_else(|| RuntimeError::UnknownWord(name.clone()))?;
                        self.execute_word(word).await?;
                    }
                }
            }
            Ok(())
        })
    }

    fn evaluate_list(&mut self, source: String) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let saved = std::mem::take(&mut self.stack);
            let result = self.call_quotation(Quotation::new(source)).await;
            let items = std::mem::replace(&mut self.stack, saved);
            result?;
            self.push(Value::List(items));
            Ok(())
        })
    }

    pub fn execute_word(&mut self, word: WordRef) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            trace!(word = word.name(), "Executing word");
            match word.body() {
                WordBody::Primitive(Primitive::Sync(f)) => f(self),
                WordBody::Primitive(Primitive::Async(f)) => f(self).await,
                WordBody::Compiled(quot) => self.call_quotation(quot).await,
                WordBody::Hook(hook) => {
                    self.push(Value::Hook(hook));
                    Ok(())
                }
            }
        })
    }

    /// Run a quotation in a new input frame on the current stack
    pub fn call_quotation(&mut self, quot: Quotation) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.push_frame(quot.source().to_string())?;
            let result = self.run_frame().await;
            self.frames.pop();
            result
        })
    }

    /// Run a quotation to completion on an empty stack, independently of the
    /// caller's stack, which is restored afterwards
    pub fn run_fresh(&mut self, quot: Quotation) -> BoxFuture<'_, Result<()>> {
        self.run_fresh_with(quot, Vec::new())
    }

    /// Like [`run_fresh`](Self::run_fresh) with the fresh stack seeded by `args`
    pub fn run_fresh_with(&mut self, quot: Quotation, args: Vec<Value>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let saved = std::mem::replace(&mut self.stack, args);
            let result = self.call_quotation(quot).await;
            self.stack = saved;
            result
        })
    }

    /// Execute a word on a fresh stack seeded by `args`
    pub fn run_word_fresh(&mut self, word: WordRef, args: Vec<Value>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let saved = std::mem::replace(&mut self.stack, args);
            let result = self.execute_word(word).await;
            self.stack = saved;
            result
        })
    }

    /// Compile the body of a `: name ... ;` definition from the current
    /// input, running immediate words as they are met
    pub(crate) fn compile_definition(&mut self) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let mut body: Vec<String> = Vec::new();
            loop {
                let frame = self
                    .frames
                    .last_mut()
                    .ok_or_else(|| RuntimeError::unexpected_end("';'"))?;
                let Some(is_string) = frame.peek_token().map(|t| t.starts_with('"')) else {
                    return Err(RuntimeError::unexpected_end("';' to close definition"));
                };
                if is_string {
                    let literal = frame
                        .consume_string_literal()
                        .ok_or_else(|| RuntimeError::unexpected_end("closing '\"'"))?;
                    body.push(literal.raw);
                    continue;
                }

                let Some(token) = frame.consume_token() else {
                    return Err(RuntimeError::unexpected_end("';' to close definition"));
                };
                match token.as_str() {
                    ";" => break,
                    "!" => frame.skip_line(),
                    "[" | "{" => {
                        let close = if token == "[" { "]" } else { "}" };
                        let inner = frame
                            .consume_balanced(&token, close)
                            .ok_or_else(|| RuntimeError::unexpected_end(&format!("'{}'", close)))?;
                        body.push(format!("{} {} {}", token, inner.trim(), close));
                    }
                    _ => match self.find(&token) {
                        Some(word) if word.is_immediate() => self.execute_word(word).await?,
                        _ => body.push(token),
                    },
                }
            }
            Ok(body.join(" "))
        })
    }

    // --- host primitives ----------------------------------------------------

    /// Build the error that aborts the current word with `message`
    pub fn panic(&self, message: impl Into<String>) -> RuntimeError {
        RuntimeError::Panic(message.into())
    }

    pub fn console(&self) -> Arc<dyn Console> {
        self.console.clone()
    }

    pub fn db(&self) -> Option<Arc<dyn Database>> {
        self.db.clone()
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    /// Emit an event: words whose `hook` attribute names the event run first
    /// (higher `priority` first), then bus subscribers are notified
    pub fn emit_event<'a>(&'a mut self, name: &'a str, payload: Value) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut listeners: Vec<WordRef> = self
                .words()
                .into_iter()
                .filter(|w| w.attribute("hook").as_ref().and_then(|h| h.as_text()) == Some(name))
                .collect();
            listeners.sort_by_key(|w| std::cmp::Reverse(w.priority()));
            debug!(event = name, listeners = listeners.len(), "Emitting event");

            for word in listeners {
                self.run_word_fresh(word, vec![payload.clone()]).await?;
            }

            let delivered = self.events.publish(Event::new(name, payload.to_json()));
            trace!(event = name, delivered, "Published event");
            Ok(())
        })
    }

    pub fn start_chron(&mut self, name: &str, period: Duration) -> Result<()> {
        debug!(chron = name, period_ms = period.as_millis() as u64, "Starting chron");
        self.scheduler.start(name, period)
    }

    pub fn stop_chron(&mut self, name: &str) -> bool {
        let stopped = self.scheduler.stop(name);
        if !stopped {
            debug!(chron = name, "stop-chron on a chron that is not running");
        }
        stopped
    }

    pub fn active_chrons(&self) -> Vec<(String, Duration)> {
        self.scheduler.active()
    }

    /// Hand the chron tick stream to whoever drives the interpreter.
    ///
    /// Only the first call returns the receiver.
    pub fn take_chron_ticks(&mut self) -> Option<UnboundedReceiver<ChronTick>> {
        let ticks = self.chron_ticks.take();
        if ticks.is_none() {
            warn!("Chron tick receiver already taken");
        }
        ticks
    }

    /// Emit `chron:<name>` with a null payload
    pub fn fire_chron<'a>(&'a mut self, name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let event = format!("chron:{}", name);
            self.emit_event(&event, Value::Null).await
        })
    }
}

/// Integer or float literal; anything else is a word
fn parse_number(token: &str) -> Option<Value> {
    if let Ok(i) = token.parse::<i64>() {
        return Some(Value::Integer(i));
    }
    let looks_numeric = token
        .trim_start_matches(['-', '+'])
        .starts_with(|c: char| c.is_ascii_digit() || c == '.');
    if looks_numeric && token.contains(['.', 'e', 'E']) {
        return token.parse::<f64>().ok().map(Value::Float);
    }
    None
}
