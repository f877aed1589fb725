use std::{
    fs,
    io::{self, IsTerminal},
    path::PathBuf,
};

use anyhow::{Context, Result};
use bassline_core::{init_tracing, BasslineConfig, EventPattern, Interpreter};
use bassline_repl::repl::{format_toast, Repl};
use clap::{Arg, Command};
use rustyline::{error::ReadlineError, DefaultEditor};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One read from the line editor
enum Input {
    Line(String),
    Interrupted,
    Eof,
    Failed(String),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("bassline-repl")
        .version(bassline_core::VERSION)
        .about("Interactive REPL for the Bassline word interpreter")
        .arg(
            Arg::new("database")
                .long("db")
                .value_name("PATH")
                .help("SQLite database file for the query word"),
        )
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Execute a Bassline script instead of reading input")
                .index(1),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug mode")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Extract command line options
    let db_path = matches.get_one::<String>("database").map(PathBuf::from);
    let input_file = matches.get_one::<String>("file").cloned();
    let debug = matches.get_flag("debug");

    // Initialize logging
    if debug {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(
                "bassline_core=debug,bassline_repl=debug",
            ))
            .try_init();
    } else {
        init_tracing();
    }

    // Configure the interpreter
    let config = BasslineConfig {
        database_path: db_path.clone(),
        debug,
        ..Default::default()
    };
    let interpreter = Interpreter::new(config)?;
    let mut repl = Repl::new(interpreter)?;

    // Print toasts as they are emitted
    let mut toasts = repl
        .interpreter()
        .event_bus()
        .subscribe(EventPattern::parse("toast:show"));
    let notifier = repl.notifier();
    tokio::spawn(async move {
        while let Some(event) = toasts.receiver.recv().await {
            notifier.on_output(&format_toast(&event));
        }
    });

    if let Some(filename) = input_file {
        return run_script(&mut repl, &filename).await;
    }

    println!("Bassline REPL v{}", bassline_core::VERSION);
    if let Some(path) = &db_path {
        println!("Database: {}", path.display());
    }
    if debug {
        println!("Debug mode: enabled");
    }
    println!("Type .help for help, .quit to exit");
    println!();

    run_repl(&mut repl).await
}

async fn run_script(repl: &mut Repl, filename: &str) -> Result<()> {
    let source =
        fs::read_to_string(filename).with_context(|| format!("reading {}", filename))?;
    debug!(file = filename, "Running script");
    repl.run_script(&source).await?;
    Ok(())
}

/// Read lines on a blocking thread; the next prompt is requested by sending it
fn spawn_reader() -> Result<(std::sync::mpsc::Sender<String>, mpsc::UnboundedReceiver<Input>)> {
    let mut editor = DefaultEditor::new()?;
    let (prompt_tx, prompt_rx) = std::sync::mpsc::channel::<String>();
    let (input_tx, input_rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || {
        while let Ok(prompt) = prompt_rx.recv() {
            let input = match editor.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    Input::Line(line)
                }
                Err(ReadlineError::Interrupted) => Input::Interrupted,
                Err(ReadlineError::Eof) => Input::Eof,
                Err(err) => Input::Failed(err.to_string()),
            };
            if input_tx.send(input).is_err() {
                break;
            }
        }
    });

    Ok((prompt_tx, input_rx))
}

async fn run_repl(repl: &mut Repl) -> Result<()> {
    let mut ticks = repl
        .interpreter_mut()
        .take_chron_ticks()
        .context("chron ticks already taken")?;
    let (prompts, mut inputs) = spawn_reader()?;
    let is_interactive = io::stdin().is_terminal();

    prompts.send(repl.prompt().to_string())?;
    while repl.is_running() {
        tokio::select! {
            input = inputs.recv() => {
                match input {
                    Some(Input::Line(line)) => {
                        // Echo input in non-interactive mode
                        if !is_interactive {
                            println!("{}{}", repl.prompt(), line);
                        }
                        repl.handle_line(&line).await;
                    }
                    Some(Input::Interrupted) => {
                        if repl.cancel_input() {
                            println!("^C");
                        } else {
                            println!("Use .quit to exit");
                        }
                    }
                    Some(Input::Eof) | None => {
                        println!("Goodbye!");
                        break;
                    }
                    Some(Input::Failed(err)) => {
                        eprintln!("Error: {err}");
                        break;
                    }
                }
                if repl.is_running() && prompts.send(repl.prompt().to_string()).is_err() {
                    warn!("Line reader stopped");
                    break;
                }
            }
            Some(tick) = ticks.recv() => {
                repl.fire_chron(&tick.name).await;
            }
        }
    }

    // Show exit statistics
    repl.show_exit_stats();

    Ok(())
}
