//! Line-oriented mode for terminals without TUI support and for scripting.
//! Same session semantics as the full interface: deltas print as they
//! stream, failed turns are reported and left out of the history.

use std::io::Write as _;
use std::sync::Arc;

use color_eyre::eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::{
    agent::roster,
    app::WELCOME_MESSAGE,
    config::GameConfig,
    error::user_visible_error,
    runner::{self, TurnEvent},
    session::Session,
};

pub async fn run(config: GameConfig) -> Result<()> {
    let client = config.client();
    let roster = roster();
    let mut session = Session::new();

    println!("{WELCOME_MESSAGE}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\n> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "quit" || text == "exit" {
            break;
        }

        session.push_user(text);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let TurnEvent::Delta(text) = event {
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
            }
        });

        let result = runner::run_streamed(
            &client,
            &config,
            Arc::clone(&roster.triage),
            session.history(),
            &tx,
        )
        .await;
        drop(tx);
        let _ = printer.await;

        match result {
            Ok(response) => {
                println!();
                session.push_assistant(response);
            }
            Err(err) => {
                log::error!("turn failed: {err}");
                println!("{}", user_visible_error(err));
            }
        }
    }

    Ok(())
}
