//! Interactive console on top of [`ConversationOrchestrator`].

use anyhow::Result;
use ragchat_core::RagChatError;
use ragchat_runner::ConversationOrchestrator;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

const PROMPT: &str = "you > ";

/// A parsed line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Start a fresh session.
    New,
    /// Print the current transcript.
    History,
    /// Leave the console.
    Exit,
    /// Unrecognized `/command`.
    Unknown(String),
    /// A question for the orchestrator.
    Ask(String),
    /// Blank line.
    Empty,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        match line {
            "/new" => Self::New,
            "/history" => Self::History,
            "/exit" | "/quit" => Self::Exit,
            cmd if cmd.starts_with('/') => Self::Unknown(cmd.to_string()),
            question => Self::Ask(question.to_string()),
        }
    }
}

/// Run the read-eval-print loop until `/exit`, Ctrl-C or Ctrl-D.
pub async fn run(orchestrator: &ConversationOrchestrator, session: Option<String>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut session_id = match session {
        Some(id) => id,
        None => orchestrator.create_session().await,
    };

    println!("ragchat ({:?} mode), session {session_id}", orchestrator.mode());
    println!("Commands: /new, /history, /exit");

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match ConsoleCommand::parse(&line) {
            ConsoleCommand::Empty => continue,
            ConsoleCommand::Exit => break,
            ConsoleCommand::New => {
                session_id = orchestrator.create_session().await;
                println!("new session {session_id}");
            }
            ConsoleCommand::History => {
                let turns = orchestrator.transcript(&session_id).await;
                if turns.is_empty() {
                    println!("(no turns yet)");
                }
                for (i, turn) in turns.iter().enumerate() {
                    println!("[{}] you: {}\n    bot: {}", i + 1, turn.question, turn.answer);
                }
            }
            ConsoleCommand::Unknown(cmd) => println!("unknown command {cmd}"),
            ConsoleCommand::Ask(question) => {
                let _ = rl.add_history_entry(question.as_str());
                match orchestrator.ask(&session_id, &question).await {
                    Ok(answer) => println!("bot > {answer}"),
                    Err(e) => report(&e),
                }
            }
        }
    }
    Ok(())
}

fn report(err: &RagChatError) {
    if err.is_transient() {
        eprintln!("error: {err} (the question was not recorded; try again)");
    } else {
        warn!(error = %err, "question failed");
        eprintln!("error: {err}");
    }
}
