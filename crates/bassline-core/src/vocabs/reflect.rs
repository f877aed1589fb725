//! Read-only introspection over the word registry

use crate::{
    interpreter::{errors::Result, word::WordBody, Interpreter},
    value::Value,
};

pub fn create_reflect_vocab(rt: &mut Interpreter) -> Result<()> {
    rt.with_vocabulary("reflect", |rt| {
        rt.def("words", WordBody::sync(words), false)?;
        rt.def("word-name", WordBody::sync(word_name), false)?;
        rt.def("word-attr", WordBody::sync(word_attr), false)?;
        rt.def("find", WordBody::sync(find), false)?;
        rt.def("last-word", WordBody::sync(last_word), false)?;
        Ok(())
    })
}

fn words(rt: &mut Interpreter) -> Result<()> {
    let words = rt.words().into_iter().map(Value::Word).collect();
    rt.push(Value::List(words));
    Ok(())
}

fn word_name(rt: &mut Interpreter) -> Result<()> {
    let name = match rt.pop("word-name")? {
        Value::Word(word) => Value::String(word.name().to_string()),
        _ => Value::Null,
    };
    rt.push(name);
    Ok(())
}

fn word_attr(rt: &mut Interpreter) -> Result<()> {
    let key = rt.pop("word-attr")?;
    let word = rt.pop("word-attr")?;
    let value = match (word, key.as_str()) {
        (Value::Word(word), Some(key)) => word
            .attribute(key)
            .map(|attr| attr.to_value())
            .unwrap_or(Value::Null),
        _ => Value::Null,
    };
    rt.push(value);
    Ok(())
}

fn find(rt: &mut Interpreter) -> Result<()> {
    let found = match rt.pop("find")? {
        Value::String(name) => rt.find(&name).map(Value::Word),
        _ => None,
    };
    rt.push(found.unwrap_or(Value::Null));
    Ok(())
}

fn last_word(rt: &mut Interpreter) -> Result<()> {
    let last = rt.last().map(Value::Word).unwrap_or(Value::Null);
    rt.push(last);
    Ok(())
}
