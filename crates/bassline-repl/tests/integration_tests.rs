use std::sync::Arc;

use bassline_repl::repl::{BufferNotifier, Repl, ReplCommand};
use tempfile::TempDir;

fn repl_in(temp_dir: &TempDir) -> Repl {
    Repl::with_database_path(temp_dir.path().join("repl.db")).unwrap()
}

#[tokio::test]
async fn test_basic_arithmetic() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);

    // Execute simple arithmetic
    let result = repl.execute("1 2 +").await;
    assert!(result.is_ok());
    let (output, _duration) = result.unwrap();
    assert_eq!(output, "3");

    // The stack carries over between inputs
    let (output, _) = repl.execute("\"done\"").await.unwrap();
    assert_eq!(output, "3 \"done\"");
}

#[tokio::test]
async fn test_describe_shows_attributes_as_json() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);
    repl.execute(": save-file cmd key: ctrl+s priority: 2 ;")
        .await
        .unwrap();

    let output = repl
        .handle_command(ReplCommand::Describe("save-file".to_string()))
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["name"], "save-file");
    assert_eq!(json["vocab"], "scratchpad");
    assert_eq!(json["attributes"]["command"], true);
    assert_eq!(json["attributes"]["key"], "ctrl+s");
    assert_eq!(json["attributes"]["priority"], 2);

    assert!(repl
        .handle_command(ReplCommand::Describe("missing".to_string()))
        .is_err());
}

#[tokio::test]
async fn test_stack_commands() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);
    repl.execute("1 2").await.unwrap();

    let stack = repl.handle_command(ReplCommand::Stack).unwrap();
    assert_eq!(stack, "  1: 1\n  0: 2");

    repl.handle_command(ReplCommand::ClearStack).unwrap();
    assert_eq!(
        repl.handle_command(ReplCommand::Stack).unwrap(),
        "Stack is empty."
    );
}

#[tokio::test]
async fn test_words_grouped_by_vocabulary() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);
    repl.execute(": greet ;").await.unwrap();

    let words = repl.handle_command(ReplCommand::Words).unwrap();
    assert!(words.contains("hooks: hook .trigger .when"));
    assert!(words.lines().any(|line| line == "scratchpad: greet"));
}

#[tokio::test]
async fn test_chrons_listing() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);
    assert_eq!(
        repl.handle_command(ReplCommand::Chrons).unwrap(),
        "No chrons running."
    );

    repl.execute("chron refresh 5s").await.unwrap();
    assert_eq!(
        repl.handle_command(ReplCommand::Chrons).unwrap(),
        "  refresh every 5000ms"
    );
}

#[tokio::test]
async fn test_handle_line_routes_commands_and_code() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);
    let notifier = Arc::new(BufferNotifier::new());
    repl.set_notifier(notifier.clone());

    repl.handle_line(": double").await;
    repl.handle_line("  dup + ;").await;
    repl.handle_line("21 double").await;
    repl.handle_line(".stack").await;
    repl.handle_line("frobnicate").await;
    repl.handle_line(".quit").await;

    assert_eq!(
        notifier.lines(),
        vec![
            "=> ".to_string(),
            "=> 42".to_string(),
            "  0: 42".to_string(),
            "error: Error: Unknown word: frobnicate".to_string(),
            "Goodbye!".to_string(),
        ]
    );
    assert!(!repl.is_running());
}

#[tokio::test]
async fn test_query_uses_database_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);
    repl.execute(r#"null "CREATE TABLE t (x INTEGER)" query drop"#)
        .await
        .unwrap();
    repl.execute(r#"{ 5 } "INSERT INTO t VALUES (?1)" query drop"#)
        .await
        .unwrap();
    let (output, _) = repl
        .execute(r#"null "SELECT x FROM t" query"#)
        .await
        .unwrap();
    assert_eq!(output, r#"{ H{ "x": 5 } }"#);
    assert!(temp_dir.path().join("repl.db").exists());
}

#[tokio::test]
async fn test_run_script_reports_idle_chrons() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);
    let notifier = Arc::new(BufferNotifier::new());
    repl.set_notifier(notifier.clone());

    repl.run_script("1 2 +").await.unwrap();
    repl.run_script(": poll every: 10m ; chron refresh 5s").await.unwrap();

    assert_eq!(
        notifier.lines(),
        vec![
            "=> 3".to_string(),
            "=> 3".to_string(),
            "error: Warning: chrons do not fire in script mode: poll, refresh".to_string(),
        ]
    );
}
