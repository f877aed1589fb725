use pretty_assertions::assert_eq;

use super::test_support::harness;
use crate::{
    interpreter::errors::RuntimeError,
    value::{Quotation, Value},
};

async fn run(source: &str) -> Vec<Value> {
    let mut h = harness();
    h.rt.execute(source).await.unwrap();
    h.rt.stack().to_vec()
}

#[tokio::test]
async fn test_stack_shuffling() {
    assert_eq!(run("1 dup").await, vec![Value::Integer(1), Value::Integer(1)]);
    assert_eq!(run("1 2 drop").await, vec![Value::Integer(1)]);
    assert_eq!(run("1 2 swap").await, vec![Value::Integer(2), Value::Integer(1)]);
    assert_eq!(
        run("1 2 over").await,
        vec![Value::Integer(1), Value::Integer(2), Value::Integer(1)]
    );
}

#[tokio::test]
async fn test_arithmetic() {
    assert_eq!(run("1 2 + 3 *").await, vec![Value::Integer(9)]);
    assert_eq!(run("7 2 /").await, vec![Value::Integer(3)]);
    assert_eq!(run("10 4 -").await, vec![Value::Integer(6)]);
    assert_eq!(run("1 0.5 +").await, vec![Value::Float(1.5)]);
    assert_eq!(run("1.5 2 *").await, vec![Value::Float(3.0)]);
}

#[tokio::test]
async fn test_division_by_zero_panics() {
    let mut h = harness();
    let err = h.rt.execute("1 0 /").await.unwrap_err();
    assert_eq!(err, RuntimeError::Panic("Division by zero".to_string()));

    let err = h.rt.execute("1.0 0 /").await.unwrap_err();
    assert!(err.is_panic());
}

#[tokio::test]
async fn test_arithmetic_type_errors() {
    let mut h = harness();
    let err = h.rt.execute(r#"1 "a" +"#).await.unwrap_err();
    assert_eq!(err, RuntimeError::type_error("+", "number", "string"));
}

#[tokio::test]
async fn test_equality_and_not() {
    assert_eq!(
        run(r#"1 1.0 = "a" "b" = null not 0 not"#).await,
        vec![
            Value::Boolean(true),
            Value::Boolean(false),
            Value::Boolean(true),
            Value::Boolean(false),
        ]
    );
    assert_eq!(
        run("true false null").await,
        vec![Value::Boolean(true), Value::Boolean(false), Value::Null]
    );
}

#[tokio::test]
async fn test_literals() {
    assert_eq!(
        run(r#"-3 2.5 1e3 "hello world" "say \"hi\"""#).await,
        vec![
            Value::Integer(-3),
            Value::Float(2.5),
            Value::Float(1000.0),
            Value::from("hello world"),
            Value::from("say \"hi\""),
        ]
    );
}

#[tokio::test]
async fn test_quotations_and_call() {
    assert_eq!(
        run("[ 1 [ 2 ] ]").await,
        vec![Value::Quotation(Quotation::new(" 1 [ 2 ] "))]
    );
    assert_eq!(run("[ 1 2 + ] call").await, vec![Value::Integer(3)]);
    assert_eq!(run("5 [ dup * ] call").await, vec![Value::Integer(25)]);
}

#[tokio::test]
async fn test_list_literal_runs_on_fresh_stack() {
    assert_eq!(
        run("9 { 1 2 3 + }").await,
        vec![
            Value::Integer(9),
            Value::List(vec![Value::Integer(1), Value::Integer(5)])
        ]
    );
    assert_eq!(run("{ }").await, vec![Value::List(vec![])]);
}

#[tokio::test]
async fn test_comments_are_skipped() {
    assert_eq!(
        run("1 ! ignored 2 3\n4").await,
        vec![Value::Integer(1), Value::Integer(4)]
    );
}

#[tokio::test]
async fn test_colon_definitions() {
    assert_eq!(run(": square dup * ; 4 square").await, vec![Value::Integer(16)]);
    assert_eq!(
        run(r#": greet "hi there" ; : twice dup ; greet twice"#).await,
        vec![Value::from("hi there"), Value::from("hi there")]
    );
    assert_eq!(
        run(": later [ 1 { 2 } ] call ; later").await,
        vec![Value::Integer(1), Value::List(vec![Value::Integer(2)])]
    );
}

#[tokio::test]
async fn test_definition_becomes_last_before_body() {
    let mut h = harness();
    h.rt.execute(": poll ;").await.unwrap();
    assert_eq!(h.rt.last().unwrap().name(), "poll");
    assert_eq!(h.rt.current().unwrap().name(), "scratchpad");
}

#[tokio::test]
async fn test_unterminated_definition() {
    let mut h = harness();
    let err = h.rt.execute(": broken 1 2").await.unwrap_err();
    assert!(matches!(err, RuntimeError::UnexpectedEnd { .. }));
}

#[tokio::test]
async fn test_unknown_word() {
    let mut h = harness();
    let err = h.rt.execute("frobnicate").await.unwrap_err();
    assert_eq!(err, RuntimeError::UnknownWord("frobnicate".to_string()));
}

#[tokio::test]
async fn test_underflow_names_word() {
    let mut h = harness();
    let err = h.rt.execute("swap").await.unwrap_err();
    assert_eq!(err, RuntimeError::underflow("swap"));
}

#[tokio::test]
async fn test_in_and_use() {
    let mut h = harness();
    h.rt.execute("IN: app : dup 42 ; 1 dup").await.unwrap();
    // the current vocabulary shadows the search list
    assert_eq!(h.rt.stack(), &[Value::Integer(1), Value::Integer(42)]);

    h.rt.clear_stack();
    h.rt.execute("IN: other 1 dup").await.unwrap();
    assert_eq!(h.rt.stack(), &[Value::Integer(1), Value::Integer(1)]);

    h.rt.clear_stack();
    h.rt.execute("USE: app 1 dup").await.unwrap();
    assert_eq!(h.rt.stack(), &[Value::Integer(1), Value::Integer(42)]);

    let err = h.rt.execute("USE: nowhere").await.unwrap_err();
    assert_eq!(err, RuntimeError::UnknownVocabulary("nowhere".to_string()));
}
