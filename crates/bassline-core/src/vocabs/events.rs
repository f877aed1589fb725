//! Event emission and named periodic chrons

use std::{sync::LazyLock, time::Duration};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use regex::Regex;

use crate::{
    interpreter::{errors::Result, word::WordBody, Interpreter},
    value::Value,
};

/// Event emitted by `toast`
pub const TOAST_EVENT: &str = "toast:show";

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(s|m|h|d)$").expect("duration pattern is valid")
});

/// Parse a duration literal such as `5s`, `10m`, `2h` or `1d` into
/// milliseconds. Returns `None` for anything else, including values that
/// overflow.
pub fn parse_duration(literal: &str) -> Option<u64> {
    let captures = DURATION.captures(literal)?;
    let amount: u64 = captures[1].parse().ok()?;
    let unit = match &captures[2] {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        _ => return None,
    };
    amount
        .checked_mul(unit)
        .filter(|ms| i64::try_from(*ms).is_ok())
}

pub fn create_events_vocab(rt: &mut Interpreter) -> Result<()> {
    rt.with_vocabulary("events", |rt| {
        rt.def("emit", WordBody::future(emit), false)?;
        rt.def("trigger", WordBody::future(trigger), false)?;
        rt.def("toast", WordBody::future(toast), false)?;
        rt.def("chron", WordBody::sync(chron), true)?;
        rt.def("stop-chron", WordBody::sync(stop_chron), true)?;
        Ok(())
    })
}

/// `( eventName data -- )`
fn emit(rt: &mut Interpreter) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let data = rt.pop("emit")?;
        let name = rt.pop_string("emit")?;
        rt.emit_event(&name, data).await
    })
}

/// `( payload eventName -- )`
fn trigger(rt: &mut Interpreter) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let name = rt.pop_string("trigger")?;
        let payload = rt.pop("trigger")?;
        rt.emit_event(&name, payload).await
    })
}

/// `( type message -- )`
fn toast(rt: &mut Interpreter) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let message = rt.pop("toast")?;
        let kind = rt.pop("toast")?;
        let mut payload = IndexMap::new();
        payload.insert("type".to_string(), kind);
        payload.insert("message".to_string(), message);
        rt.emit_event(TOAST_EVENT, Value::Map(payload)).await
    })
}

/// `chron <name> <duration>`
fn chron(rt: &mut Interpreter) -> Result<()> {
    let name = rt.parse_token("chron")?;
    let literal = rt.parse_token("chron")?;
    let ms = parse_duration(&literal)
        .ok_or_else(|| rt.panic(format!("Invalid duration '{}' for chron '{}'", literal, name)))?;
    rt.start_chron(&name, Duration::from_millis(ms))
}

/// `stop-chron <name>`
fn stop_chron(rt: &mut Interpreter) -> Result<()> {
    let name = rt.parse_token("stop-chron")?;
    rt.stop_chron(&name);
    Ok(())
}
