//! Per-name hook objects with keyed, toggle-able and one-shot handlers

use std::collections::HashSet;

use futures::future::BoxFuture;
use tracing::{debug, trace};

use crate::{
    interpreter::{
        errors::{Result, RuntimeError},
        hook::HookRef,
        word::WordBody,
        Interpreter,
    },
    value::Value,
};

pub fn create_hooks_vocab(rt: &mut Interpreter) -> Result<()> {
    rt.with_vocabulary("hooks", |rt| {
        rt.def("hook", WordBody::sync(define_hook), true)?;
        rt.def(".trigger", WordBody::future(trigger_word), false)?;
        rt.def(".when", WordBody::sync(when), false)?;
        rt.def(".once", WordBody::sync(once), false)?;
        rt.def(".enable", WordBody::sync(|rt| set_enabled(rt, ".enable", true)), false)?;
        rt.def(".disable", WordBody::sync(|rt| set_enabled(rt, ".disable", false)), false)?;
        rt.def(".remove", WordBody::sync(remove), false)?;
        rt.def(".clear", WordBody::sync(clear), false)?;
        rt.def(".handlers", WordBody::sync(handlers), false)?;
        Ok(())
    })
}

/// `hook <name>` defines `<name>`, which pushes the same hook every time
fn define_hook(rt: &mut Interpreter) -> Result<()> {
    let Some(vocab) = rt.current() else {
        return Err(RuntimeError::NoCurrentVocabulary {
            word: "hook".to_string(),
        });
    };
    let vocab = vocab.name().to_string();
    let name = rt.parse_token("hook")?;
    let hook = rt.hooks_mut().create(&vocab, &name);
    rt.def(&name, WordBody::Hook(hook), false)?;
    debug!(hook = %name, vocab = %vocab, "Defined hook");
    Ok(())
}

/// Run the enabled keyed handlers in map order, then drain the one-shot
/// handlers.
///
/// The hook is read live between handlers: a handler that adds, removes,
/// enables or disables keys affects the rest of the pass, and one-shot
/// handlers appended during the drain run in the same pass. An error from
/// any handler stops the pass and leaves the one-shot list as it was.
pub fn trigger(rt: &mut Interpreter, hook: HookRef) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let mut visited = HashSet::new();
        loop {
            let next = hook.lock().next_unvisited(&visited);
            let Some((key, handler)) = next else {
                break;
            };
            visited.insert(key.clone());
            if !handler.enabled {
                trace!(key = %key, "Skipping disabled handler");
                continue;
            }
            trace!(key = %key, "Running handler");
            rt.run_fresh(handler.quot).await?;
        }

        let mut index = 0;
        loop {
            let next = hook.lock().once_at(index);
            let Some(quot) = next else {
                break;
            };
            rt.run_fresh(quot).await?;
            index += 1;
        }
        hook.lock().drain_once();
        Ok(())
    })
}

/// `( hook -- )`
fn trigger_word(rt: &mut Interpreter) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let hook = rt.pop_hook(".trigger")?;
        trigger(rt, hook).await
    })
}

/// `( hook key quot -- )`
fn when(rt: &mut Interpreter) -> Result<()> {
    let quot = rt.pop_quotation(".when")?;
    let key = rt.pop_string(".when")?;
    let hook = rt.pop_hook(".when")?;
    let mut hook = hook.lock();
    debug!(hook = hook.name(), key = %key, "Registered handler");
    hook.when(&key, quot);
    Ok(())
}

/// `( hook quot -- )`
fn once(rt: &mut Interpreter) -> Result<()> {
    let quot = rt.pop_quotation(".once")?;
    let hook = rt.pop_hook(".once")?;
    hook.lock().push_once(quot);
    Ok(())
}

/// `( hook key -- )`
fn set_enabled(rt: &mut Interpreter, word: &str, enabled: bool) -> Result<()> {
    let key = rt.pop_string(word)?;
    let hook = rt.pop_hook(word)?;
    hook.lock().set_enabled(&key, enabled);
    Ok(())
}

/// `( hook key -- )`
fn remove(rt: &mut Interpreter) -> Result<()> {
    let key = rt.pop_string(".remove")?;
    let hook = rt.pop_hook(".remove")?;
    hook.lock().remove(&key);
    Ok(())
}

/// `( hook -- )`
fn clear(rt: &mut Interpreter) -> Result<()> {
    let hook = rt.pop_hook(".clear")?;
    hook.lock().clear();
    Ok(())
}

/// `( hook -- keys )`
fn handlers(rt: &mut Interpreter) -> Result<()> {
    let hook = rt.pop_hook(".handlers")?;
    let keys = hook.lock().keys().into_iter().map(Value::String).collect();
    rt.push(Value::List(keys));
    Ok(())
}
