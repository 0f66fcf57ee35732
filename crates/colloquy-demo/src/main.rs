//! Colloquy terminal host entry point.
//!
//! Plays the built-in scene on stdin/stdout. Type a choice number, press
//! enter to continue, `h` to toggle the history, or `q` to leave.

use std::error::Error;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use colloquy_core::error::DialogueError;
use colloquy_dialogue::{DialogueSession, SessionConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

mod error;
mod scene;
mod terminal;

use error::DemoError;
use terminal::{Command, TerminalPresenter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr so they never interleave with the conversation.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let player = std::env::args().nth(1).unwrap_or_else(|| "Traveller".to_string());
    run(&player).await?;
    Ok(())
}

async fn run(player: &str) -> Result<(), DemoError> {
    let config = SessionConfig::from_env()?;
    let graph = Arc::new(scene::graph()?);
    tracing::info!(nodes = graph.node_count(), title = %config.title, "starting conversation");

    let presenter = TerminalPresenter::new(std::io::stdout());
    let mut session = DialogueSession::new(graph, Box::new(presenter)).with_config(config);
    if let Err(err) = session.open(scene::START, scene::initial_store(player)) {
        report(err)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while session.is_open() {
        let deadline = session.next_deadline();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    session.close();
                    break;
                };
                handle(&mut session, Command::parse(&line))?;
            }
            () = sleep_until(deadline) => {
                if let Err(err) = session.tick() {
                    report(err)?;
                }
            }
        }
    }
    Ok(())
}

fn handle(session: &mut DialogueSession, command: Command) -> Result<(), DemoError> {
    let result = match command {
        Command::Quit => {
            session.close();
            Ok(())
        }
        Command::History => session.toggle_history().map(|_| ()),
        Command::Continue => match session.snapshot() {
            Ok(snapshot) if snapshot.choices.is_empty() => session.advance(None).map(|_| ()),
            Ok(_) => session.skip_reveal(),
            Err(err) => Err(err),
        },
        Command::Choose(n) => match session.snapshot() {
            Ok(snapshot) => match snapshot.choices.get(n - 1) {
                Some(choice) => session.select_choice(&choice.id).map(|outcome| {
                    tracing::debug!(?outcome, "choice handled");
                }),
                None => {
                    tracing::warn!(choice = n, "no such choice");
                    Ok(())
                }
            },
            Err(err) => Err(err),
        },
        Command::Unknown => {
            tracing::warn!("unrecognised input");
            Ok(())
        }
    };
    result.or_else(report)
}

/// Non-fatal errors are logged and the conversation continues.
fn report(err: DialogueError) -> Result<(), DemoError> {
    if err.is_fatal() {
        return Err(err.into());
    }
    tracing::warn!(error = %err, "input rejected");
    Ok(())
}

async fn sleep_until(deadline: Option<DateTime<Utc>>) {
    match deadline {
        Some(deadline) => {
            let wait = (deadline - Utc::now()).to_std().unwrap_or_default();
            tokio::time::sleep_until(Instant::now() + wait).await;
        }
        None => std::future::pending().await,
    }
}
