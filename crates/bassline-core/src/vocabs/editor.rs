//! Declarative metadata for the most recently defined word, plus `query`
//!
//! Annotation words are lenient: with no word defined yet they consume
//! their argument and do nothing, and a numeric annotation without a
//! numeric prefix is skipped with a warning.

use std::{sync::LazyLock, time::Duration};

use futures::future::BoxFuture;
use regex::Regex;
use tracing::{debug, warn};

use super::events::parse_duration;
use crate::{
    interpreter::{
        errors::Result,
        word::{AttributeValue, WordBody},
        Interpreter,
    },
    value::Value,
};

static LEADING_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("integer pattern is valid"));

static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("float pattern is valid")
});

pub fn create_editor_vocab(rt: &mut Interpreter) -> Result<()> {
    rt.with_vocabulary("editor", |rt| {
        rt.def("cmd", WordBody::sync(|rt| flag(rt, "command")), true)?;
        rt.def("setting", WordBody::sync(|rt| flag(rt, "setting")), true)?;
        rt.def("doc{", WordBody::sync(doc), true)?;

        rt.def("key:", WordBody::sync(|rt| text(rt, "key:", "key")), true)?;
        rt.def("menu:", WordBody::sync(|rt| text(rt, "menu:", "menu")), true)?;
        rt.def("icon:", WordBody::sync(|rt| text(rt, "icon:", "icon")), true)?;
        rt.def("when:", WordBody::sync(|rt| text(rt, "when:", "when")), true)?;
        rt.def("category:", WordBody::sync(|rt| text(rt, "category:", "category")), true)?;
        rt.def("on:", WordBody::sync(|rt| text(rt, "on:", "hook")), true)?;
        rt.def("type:", WordBody::sync(|rt| text(rt, "type:", "settingType")), true)?;

        rt.def("priority:", WordBody::sync(priority), true)?;
        rt.def("min:", WordBody::sync(|rt| number(rt, "min:", "min")), true)?;
        rt.def("max:", WordBody::sync(|rt| number(rt, "max:", "max")), true)?;
        rt.def("step:", WordBody::sync(|rt| number(rt, "step:", "step")), true)?;

        rt.def("every:", WordBody::sync(every), true)?;
        rt.def("choices:", WordBody::sync(choices), false)?;
        rt.def("query", WordBody::future(query), false)?;
        Ok(())
    })
}

fn annotate(rt: &Interpreter, key: &str, value: AttributeValue) {
    if let Some(word) = rt.last() {
        debug!(word = word.name(), key, "Annotating word");
        word.set_attribute(key, value);
    }
}

fn flag(rt: &mut Interpreter, key: &str) -> Result<()> {
    annotate(rt, key, AttributeValue::Flag(true));
    Ok(())
}

fn text(rt: &mut Interpreter, word: &str, key: &str) -> Result<()> {
    let token = rt.parse_token(word)?;
    annotate(rt, key, AttributeValue::Text(token));
    Ok(())
}

/// `doc{ free text }`
fn doc(rt: &mut Interpreter) -> Result<()> {
    let text = rt.parse_until("doc{", |c| c == '}')?;
    annotate(rt, "doc", AttributeValue::Text(text.trim().to_string()));
    Ok(())
}

fn priority(rt: &mut Interpreter) -> Result<()> {
    let token = rt.parse_token("priority:")?;
    match LEADING_INTEGER
        .find(&token)
        .and_then(|m| m.as_str().parse::<i64>().ok())
    {
        Some(value) => annotate(rt, "priority", AttributeValue::Integer(value)),
        None => warn!(token = %token, "priority: expects an integer, ignoring"),
    }
    Ok(())
}

fn number(rt: &mut Interpreter, word: &str, key: &str) -> Result<()> {
    let token = rt.parse_token(word)?;
    match LEADING_FLOAT
        .find(&token)
        .and_then(|m| m.as_str().parse::<f64>().ok())
    {
        Some(value) => annotate(rt, key, AttributeValue::Number(value)),
        None => warn!(token = %token, word, "expects a number, ignoring"),
    }
    Ok(())
}

/// `every: <duration>` annotates the word as a chron listener and starts
/// the chron named after it
fn every(rt: &mut Interpreter) -> Result<()> {
    let literal = rt.parse_token("every:")?;
    let Some(word) = rt.last() else {
        return Ok(());
    };
    let ms = parse_duration(&literal).ok_or_else(|| {
        rt.panic(format!("Invalid duration '{}' for every: on '{}'", literal, word.name()))
    })?;

    word.set_attribute("interval", AttributeValue::Integer(ms as i64));
    word.set_attribute("hook", AttributeValue::Text(format!("chron:{}", word.name())));
    rt.start_chron(word.name(), Duration::from_millis(ms))
}

/// `( list -- )`
fn choices(rt: &mut Interpreter) -> Result<()> {
    let items: Vec<String> = match rt.pop("choices:")? {
        Value::List(items) => items.iter().map(Value::to_display_string).collect(),
        other => vec![other.to_display_string()],
    };
    annotate(rt, "choices", AttributeValue::List(items));
    Ok(())
}

/// `( params sql -- data )`
fn query(rt: &mut Interpreter) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let sql = rt.pop_string("query")?;
        let params = match rt.pop("query")? {
            Value::List(items) => items,
            Value::Null => Vec::new(),
            single => vec![single],
        };
        let db = rt.db().ok_or_else(|| rt.panic("No database connection"))?;

        let result = db.query(&sql, &params).await;
        if let Some(error) = result.error {
            return Err(rt.panic(error));
        }
        rt.push(result.data.unwrap_or(Value::Null));
        Ok(())
    })
}
