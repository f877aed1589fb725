//! Stack shuffling, arithmetic, quotation calls and the defining words

use futures::future::BoxFuture;
use tracing::debug;

use crate::{
    interpreter::{
        errors::{Result, RuntimeError},
        word::WordBody,
        Interpreter,
    },
    value::{Quotation, Value},
};

pub fn create_kernel_vocab(rt: &mut Interpreter) -> Result<()> {
    rt.with_vocabulary("kernel", |rt| {
        rt.def("dup", WordBody::sync(dup), false)?;
        rt.def("drop", WordBody::sync(drop_top), false)?;
        rt.def("swap", WordBody::sync(swap), false)?;
        rt.def("over", WordBody::sync(over), false)?;
        rt.def("call", WordBody::future(call), false)?;

        rt.def("+", WordBody::sync(add), false)?;
        rt.def("-", WordBody::sync(subtract), false)?;
        rt.def("*", WordBody::sync(multiply), false)?;
        rt.def("/", WordBody::sync(divide), false)?;
        rt.def("=", WordBody::sync(equals), false)?;
        rt.def("not", WordBody::sync(not), false)?;

        rt.def("true", WordBody::sync(|rt| push(rt, Value::Boolean(true))), false)?;
        rt.def("false", WordBody::sync(|rt| push(rt, Value::Boolean(false))), false)?;
        rt.def("null", WordBody::sync(|rt| push(rt, Value::Null)), false)?;

        rt.def(":", WordBody::future(define), true)?;
        rt.def("IN:", WordBody::sync(set_in), true)?;
        rt.def("USE:", WordBody::sync(use_vocab), true)?;
        Ok(())
    })
}

fn push(rt: &mut Interpreter, value: Value) -> Result<()> {
    rt.push(value);
    Ok(())
}

fn dup(rt: &mut Interpreter) -> Result<()> {
    let top = rt.pop("dup")?;
    rt.push(top.clone());
    rt.push(top);
    Ok(())
}

fn drop_top(rt: &mut Interpreter) -> Result<()> {
    rt.pop("drop").map(|_| ())
}

fn swap(rt: &mut Interpreter) -> Result<()> {
    let b = rt.pop("swap")?;
    let a = rt.pop("swap")?;
    rt.push(b);
    rt.push(a);
    Ok(())
}

fn over(rt: &mut Interpreter) -> Result<()> {
    let b = rt.pop("over")?;
    let a = rt.pop("over")?;
    rt.push(a.clone());
    rt.push(b);
    rt.push(a);
    Ok(())
}

fn call(rt: &mut Interpreter) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let quot = rt.pop_quotation("call")?;
        rt.call_quotation(quot).await
    })
}

enum Operands {
    Integers(i64, i64),
    Floats(f64, f64),
}

fn pop_operands(rt: &mut Interpreter, word: &str) -> Result<Operands> {
    let b = rt.pop(word)?;
    let a = rt.pop(word)?;
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Operands::Integers(a, b)),
        (Value::Integer(a), Value::Float(b)) => Ok(Operands::Floats(a as f64, b)),
        (Value::Float(a), Value::Integer(b)) => Ok(Operands::Floats(a, b as f64)),
        (Value::Float(a), Value::Float(b)) => Ok(Operands::Floats(a, b)),
        (Value::Integer(_) | Value::Float(_), other) | (other, _) => {
            Err(RuntimeError::type_error(word, "number", other.type_name()))
        }
    }
}

fn arithmetic(
    rt: &mut Interpreter,
    word: &str,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<()> {
    let result = match pop_operands(rt, word)? {
        Operands::Integers(a, b) => Value::Integer(
            int_op(a, b).ok_or_else(|| rt.panic(format!("Integer overflow in '{}'", word)))?,
        ),
        Operands::Floats(a, b) => Value::Float(float_op(a, b)),
    };
    rt.push(result);
    Ok(())
}

fn add(rt: &mut Interpreter) -> Result<()> {
    arithmetic(rt, "+", i64::checked_add, |a, b| a + b)
}

fn subtract(rt: &mut Interpreter) -> Result<()> {
    arithmetic(rt, "-", i64::checked_sub, |a, b| a - b)
}

fn multiply(rt: &mut Interpreter) -> Result<()> {
    arithmetic(rt, "*", i64::checked_mul, |a, b| a * b)
}

fn divide(rt: &mut Interpreter) -> Result<()> {
    let result = match pop_operands(rt, "/")? {
        Operands::Integers(_, 0) => return Err(rt.panic("Division by zero")),
        Operands::Floats(_, b) if b == 0.0 => return Err(rt.panic("Division by zero")),
        Operands::Integers(a, b) => Value::Integer(
            a.checked_div(b)
                .ok_or_else(|| rt.panic("Integer overflow in '/'"))?,
        ),
        Operands::Floats(a, b) => Value::Float(a / b),
    };
    rt.push(result);
    Ok(())
}

fn equals(rt: &mut Interpreter) -> Result<()> {
    let b = rt.pop("=")?;
    let a = rt.pop("=")?;
    rt.push(Value::Boolean(a == b));
    Ok(())
}

fn not(rt: &mut Interpreter) -> Result<()> {
    let value = rt.pop("not")?;
    rt.push(Value::Boolean(!value.is_truthy()));
    Ok(())
}

/// `: name body ;`
fn define(rt: &mut Interpreter) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let name = rt.parse_token(":")?;
        let word = rt.def(&name, WordBody::Compiled(Quotation::new("")), false)?;
        let body = rt.compile_definition().await?;
        debug!(word = %name, body = %body, "Compiled definition");
        word.set_body(WordBody::Compiled(Quotation::new(body)));
        Ok(())
    })
}

fn set_in(rt: &mut Interpreter) -> Result<()> {
    let name = rt.parse_token("IN:")?;
    rt.set_current(Some(&name));
    Ok(())
}

fn use_vocab(rt: &mut Interpreter) -> Result<()> {
    let name = rt.parse_token("USE:")?;
    rt.use_vocabulary(&name)
}
