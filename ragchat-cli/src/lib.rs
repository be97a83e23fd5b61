//! Library half of the `ragchat` binary: argument parsing and the console loop.

pub mod cli;
pub mod console;

use anyhow::Result;
use tracing::info;

pub use cli::{Cli, Command};

/// Run the command selected by `cli`.
pub async fn execute(cli: Cli) -> Result<()> {
    let orchestrator = cli.build_orchestrator()?;

    if cli.eager_index {
        if let Some(corpus) = &cli.corpus {
            let index = orchestrator.build_index(corpus).await?;
            info!(passages = index.len(), "index ready");
        }
    }

    match &cli.command {
        Some(Command::Ask { question }) => {
            let session = match &cli.session {
                Some(id) => id.clone(),
                None => orchestrator.create_session().await,
            };
            let answer = orchestrator.ask(&session, question).await?;
            println!("{answer}");
            Ok(())
        }
        Some(Command::Chat) | None => console::run(&orchestrator, cli.session.clone()).await,
    }
}
