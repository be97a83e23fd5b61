use anyhow::Result;
use clap::Parser;
use ragchat_cli::{Cli, execute};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = ragchat_telemetry::init_telemetry("ragchat") {
        eprintln!("warning: logging disabled: {e}");
    }

    let cli = Cli::parse();
    execute(cli).await
}
