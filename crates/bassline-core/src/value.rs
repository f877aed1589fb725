//! Runtime values that live on the interpreter's data stack

use std::{fmt, sync::Arc};

use indexmap::IndexMap;

use crate::interpreter::{hook::HookRef, word::WordRef};

/// A code fragment captured from `[ ... ]` or a word body.
///
/// Quotations keep their source text; running one re-tokenizes it in a new
/// input frame so parsing words inside it read from the quotation itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Quotation {
    source: Arc<str>,
}

impl Quotation {
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.source.trim().is_empty()
    }
}

impl fmt::Debug for Quotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quotation({:?})", self.source.trim())
    }
}

impl fmt::Display for Quotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.source.trim();
        if body.is_empty() {
            write!(f, "[ ]")
        } else {
            write!(f, "[ {} ]", body)
        }
    }
}

/// Values manipulated by words
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Quotation(Quotation),
    Word(WordRef),
    Hook(HookRef),
}

impl Value {
    /// Short type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Quotation(_) => "quotation",
            Value::Word(_) => "word",
            Value::Hook(_) => "hook",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    /// Convert to JSON for event payloads and attribute dumps.
    ///
    /// Quotations, words and hooks have no JSON form and are rendered as
    /// their display strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Quotation(_) | Value::Word(_) | Value::Hook(_) => {
                serde_json::Value::String(self.to_string())
            }
        }
    }

    /// Render the way `.log` prints: strings without quotes
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Quotation(a), Value::Quotation(b)) => a == b,
            (Value::Word(a), Value::Word(b)) => Arc::ptr_eq(a, b),
            (Value::Hook(a), Value::Hook(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "{{")?;
                for item in items {
                    write!(f, " {}", item)?;
                }
                write!(f, " }}")
            }
            Value::Map(map) => {
                write!(f, "H{{")?;
                for (k, v) in map {
                    write!(f, " {:?}: {}", k, v)?;
                }
                write!(f, " }}")
            }
            Value::Quotation(q) => write!(f, "{}", q),
            Value::Word(w) => write!(f, "\\{}", w.name()),
            Value::Hook(h) => write!(f, "hook<{}>", h.lock().name()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::from("hi").to_display_string(), "hi");
        assert_eq!(
            Value::List(vec![Value::Integer(1), Value::from("a")]).to_string(),
            "{ 1 \"a\" }"
        );
        assert_eq!(Value::Quotation(Quotation::new(" 1 2 + ")).to_string(), "[ 1 2 + ]");
    }

    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!({ "type": "info", "count": 3, "tags": ["a", "b"] });
        let value = Value::from(json.clone());
        match &value {
            Value::Map(map) => {
                assert_eq!(map.get("type"), Some(&Value::from("info")));
                assert_eq!(map.get("count"), Some(&Value::Integer(3)));
            }
            other => panic!("Expected map, got {other:?}"),
        }
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_numeric_equality_crosses_int_and_float() {
        assert_eq!(Value::Integer(2), Value::Float(2.0));
        assert_ne!(Value::Integer(2), Value::from("2"));
    }
}
