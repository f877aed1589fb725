//! Words, their attributes, and the vocabularies that hold them

use std::{fmt, sync::Arc};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;

use super::{errors::Result, hook::HookRef, Interpreter};
use crate::value::{Quotation, Value};

/// Synchronous native word
pub type SyncFn = fn(&mut Interpreter) -> Result<()>;

/// Native word that awaits host primitives (`run_fresh`, `emit_event`, `db.query`)
pub type AsyncFn = for<'a> fn(&'a mut Interpreter) -> BoxFuture<'a, Result<()>>;

#[derive(Clone, Copy)]
pub enum Primitive {
    Sync(SyncFn),
    Async(AsyncFn),
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Sync(_) => write!(f, "Primitive::Sync"),
            Primitive::Async(_) => write!(f, "Primitive::Async"),
        }
    }
}

/// What running a word does
#[derive(Debug, Clone)]
pub enum WordBody {
    Primitive(Primitive),
    /// Defined with `: name ... ;`
    Compiled(Quotation),
    /// Defined by `hook <name>`; pushes this definition's hook
    Hook(HookRef),
}

impl WordBody {
    pub fn sync(f: SyncFn) -> Self {
        WordBody::Primitive(Primitive::Sync(f))
    }

    pub fn future(f: AsyncFn) -> Self {
        WordBody::Primitive(Primitive::Async(f))
    }
}

/// Attribute values attached to words by the editor vocabulary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Flag(bool),
    List(Vec<String>),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            AttributeValue::Text(s) => Value::String(s.clone()),
            AttributeValue::Integer(i) => Value::Integer(*i),
            AttributeValue::Number(n) => Value::Float(*n),
            AttributeValue::Flag(b) => Value::Boolean(*b),
            AttributeValue::List(items) => {
                Value::List(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

/// Open attribute mapping, ordered by first assignment
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Attributes(IndexMap<String, AttributeValue>);

impl Attributes {
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: &str, value: AttributeValue) {
        self.0.insert(key.to_string(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A named operation registered in a vocabulary
pub struct Word {
    name: String,
    vocab: String,
    immediate: bool,
    body: RwLock<WordBody>,
    attributes: RwLock<Attributes>,
}

pub type WordRef = Arc<Word>;

impl Word {
    pub fn new(name: &str, vocab: &str, body: WordBody, immediate: bool) -> Self {
        Self {
            name: name.to_string(),
            vocab: vocab.to_string(),
            immediate,
            body: RwLock::new(body),
            attributes: RwLock::new(Attributes::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vocab(&self) -> &str {
        &self.vocab
    }

    /// Immediate words run while a `: ... ;` definition is being compiled
    pub fn is_immediate(&self) -> bool {
        self.immediate
    }

    pub fn body(&self) -> WordBody {
        self.body.read().clone()
    }

    pub(crate) fn set_body(&self, body: WordBody) {
        *self.body.write() = body;
    }

    pub fn attribute(&self, key: &str) -> Option<AttributeValue> {
        self.attributes.read().get(key).cloned()
    }

    pub fn set_attribute(&self, key: &str, value: AttributeValue) {
        self.attributes.write().set(key, value);
    }

    /// Snapshot of all attributes
    pub fn attributes(&self) -> Attributes {
        self.attributes.read().clone()
    }

    /// Dispatch priority for event listeners, 0 when unset
    pub fn priority(&self) -> i64 {
        self.attribute("priority")
            .and_then(|v| v.as_integer())
            .unwrap_or(0)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Word")
            .field("name", &self.name)
            .field("vocab", &self.vocab)
            .field("immediate", &self.immediate)
            .field("attributes", &*self.attributes.read())
            .finish()
    }
}

/// A named, insertion-ordered group of words
#[derive(Debug)]
pub struct Vocab {
    name: String,
    words: RwLock<IndexMap<String, WordRef>>,
}

pub type VocabRef = Arc<Vocab>;

impl Vocab {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            words: RwLock::new(IndexMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a word, replacing any previous word of the same name in place
    pub fn insert(&self, word: WordRef) {
        self.words.write().insert(word.name().to_string(), word);
    }

    pub fn get(&self, name: &str) -> Option<WordRef> {
        self.words.read().get(name).cloned()
    }

    pub fn words(&self) -> Vec<WordRef> {
        self.words.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.words.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.read().is_empty()
    }
}
