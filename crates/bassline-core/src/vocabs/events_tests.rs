use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::{events::TOAST_EVENT, parse_duration, test_support::harness};
use crate::{events::EventPattern, interpreter::errors::RuntimeError};

#[test]
fn test_parse_duration_units() {
    assert_eq!(parse_duration("5s"), Some(5_000));
    assert_eq!(parse_duration("10m"), Some(600_000));
    assert_eq!(parse_duration("2h"), Some(7_200_000));
    assert_eq!(parse_duration("1d"), Some(86_400_000));
    assert_eq!(parse_duration("0s"), Some(0));
}

#[test]
fn test_parse_duration_rejects_malformed() {
    for literal in ["bogus", "5", "s5", "-5s", "5S", "1.5h", "5s ", "", "5ms"] {
        assert_eq!(parse_duration(literal), None, "{:?}", literal);
    }
    assert_eq!(parse_duration("99999999999999999999d"), None);
    assert_eq!(parse_duration("9999999999999999s"), None);
}

#[tokio::test]
async fn test_chron_starts_with_parsed_interval() {
    let mut h = harness();
    h.rt.execute("chron refresh 5s chron backup 2h").await.unwrap();
    assert_eq!(
        h.scheduler.started(),
        vec![
            ("refresh".to_string(), Duration::from_millis(5_000)),
            ("backup".to_string(), Duration::from_millis(7_200_000)),
        ]
    );
}

#[tokio::test]
async fn test_chron_with_bad_duration_panics_without_starting() {
    let mut h = harness();
    let err = h.rt.execute("chron refresh bogus").await.unwrap_err();
    assert!(err.is_panic());
    assert!(err.to_string().contains("bogus"));
    assert!(h.scheduler.started().is_empty());
}

#[tokio::test]
async fn test_chron_missing_tokens() {
    let mut h = harness();
    let err = h.rt.execute("chron refresh").await.unwrap_err();
    assert!(matches!(err, RuntimeError::UnexpectedEnd { .. }));
    assert!(h.scheduler.started().is_empty());
}

#[tokio::test]
async fn test_stop_chron() {
    let mut h = harness();
    h.rt.execute("chron refresh 5s stop-chron refresh stop-chron never-started")
        .await
        .unwrap();
    assert_eq!(h.scheduler.stopped(), vec!["refresh", "never-started"]);
    assert!(h.rt.active_chrons().is_empty());
}

#[tokio::test]
async fn test_emit_runs_listeners_then_publishes() {
    let mut h = harness();
    let mut sub = h.rt.event_bus().subscribe(EventPattern::parse("file:*"));
    h.rt.execute(
        r#"
        : on-save on: file:saved .log ;
        "file:saved" "a.txt" emit
        "#,
    )
    .await
    .unwrap();

    // the listener ran before emit returned
    assert_eq!(h.console.messages(), vec!["a.txt"]);
    assert!(h.rt.stack().is_empty());

    let event = sub.receiver.try_recv().unwrap();
    assert_eq!(event.name, "file:saved");
    assert_eq!(event.payload, json!("a.txt"));
}

#[tokio::test]
async fn test_trigger_takes_payload_first() {
    let mut h = harness();
    h.rt.execute(
        r#"
        : on-save on: file:saved .log ;
        "b.txt" "file:saved" trigger
        "#,
    )
    .await
    .unwrap();
    assert_eq!(h.console.messages(), vec!["b.txt"]);
}

#[tokio::test]
async fn test_toast_emits_show_event() {
    let mut h = harness();
    let mut sub = h.rt.event_bus().subscribe(EventPattern::parse(TOAST_EVENT));
    h.rt.execute(r#""info" "Saved" toast"#).await.unwrap();

    let event = sub.receiver.try_recv().unwrap();
    assert_eq!(event.name, "toast:show");
    assert_eq!(event.payload, json!({"type": "info", "message": "Saved"}));
}

#[tokio::test]
async fn test_listeners_run_by_priority() {
    let mut h = harness();
    h.rt.execute(
        r#"
        : low on: app:ready drop "low" .log ;
        : high on: app:ready priority: 10 drop "high" .log ;
        : mid on: app:ready priority: 1 drop "mid" .log ;
        : default on: app:ready drop "default" .log ;
        : other on: app:closed drop "other" .log ;
        "app:ready" null emit
        "#,
    )
    .await
    .unwrap();
    assert_eq!(h.console.messages(), vec!["high", "mid", "low", "default"]);
}

#[tokio::test]
async fn test_listener_error_propagates_from_emit() {
    let mut h = harness();
    let mut sub = h.rt.event_bus().subscribe(EventPattern::All);
    h.rt.execute(": broken on: app:ready drop 1 0 / ;").await.unwrap();

    let err = h.rt.execute(r#""app:ready" null emit"#).await.unwrap_err();
    assert!(err.is_panic());
    // subscribers are not notified when a listener fails
    assert!(sub.receiver.try_recv().is_err());
}

#[tokio::test]
async fn test_fire_chron_runs_every_listener() {
    let mut h = harness();
    h.rt.execute(r#": poll every: 10m drop "polled" .log ;"#)
        .await
        .unwrap();
    h.rt.fire_chron("poll").await.unwrap();
    h.rt.fire_chron("unrelated").await.unwrap();
    assert_eq!(h.console.messages(), vec!["polled"]);
}

#[tokio::test]
async fn test_emit_requires_string_name() {
    let mut h = harness();
    let err = h.rt.execute("42 null emit").await.unwrap_err();
    assert_eq!(err, RuntimeError::type_error("emit", "string", "integer"));
}
