//! Command-line arguments and orchestrator assembly.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ragchat_model::{OPENAI_API_BASE, OpenAIChatConfig, OpenAIChatModel};
use ragchat_rag::{OpenAIEmbeddingProvider, RagConfig, RagPipeline};
use ragchat_runner::{ChatMode, ConversationOrchestrator};

/// Chat with a document corpus, or with the model alone.
#[derive(Parser, Debug)]
#[command(name = "ragchat", version, about)]
pub struct Cli {
    /// File or directory to answer from (enables RAG mode).
    #[arg(long, env = "RAGCHAT_CORPUS", global = true)]
    pub corpus: Option<PathBuf>,

    /// Chat with the model directly, without retrieval.
    #[arg(long, global = true)]
    pub plain: bool,

    /// Build the index before the first question instead of on demand.
    #[arg(long, global = true)]
    pub eager_index: bool,

    /// Session id to use. A new one is generated when omitted.
    #[arg(long, global = true)]
    pub session: Option<String>,

    /// API key for the OpenAI-compatible endpoint.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, env = "RAGCHAT_BASE_URL", default_value = OPENAI_API_BASE, global = true)]
    pub base_url: String,

    #[arg(long, env = "RAGCHAT_CHAT_MODEL", default_value = "gpt-4o-mini", global = true)]
    pub chat_model: String,

    #[arg(
        long,
        env = "RAGCHAT_EMBEDDING_MODEL",
        default_value = "text-embedding-3-small",
        global = true
    )]
    pub embedding_model: String,

    #[arg(long, default_value_t = 0.5, global = true)]
    pub temperature: f32,

    #[arg(long, default_value_t = 0.9, global = true)]
    pub top_p: f32,

    /// Maximum characters per passage.
    #[arg(long, default_value_t = 1000, global = true)]
    pub chunk_size: usize,

    /// Characters shared by consecutive passages.
    #[arg(long, default_value_t = 50, global = true)]
    pub chunk_overlap: usize,

    /// Passages retrieved per question.
    #[arg(long, default_value_t = 4, global = true)]
    pub top_k: usize,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the interactive console (default).
    Chat,
    /// Answer a single question and exit.
    Ask {
        /// The question to answer.
        question: String,
    },
}

impl Cli {
    /// The chat mode implied by the flags. `--plain` wins over a corpus.
    pub fn mode(&self) -> Result<ChatMode> {
        match (self.plain, &self.corpus) {
            (true, _) => Ok(ChatMode::Plain),
            (false, Some(_)) => Ok(ChatMode::Rag),
            (false, None) => bail!("pass --corpus <path> to chat with documents, or --plain"),
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .context("no API key: set OPENAI_API_KEY or pass --api-key")
    }

    pub fn rag_config(&self) -> Result<RagConfig> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .top_k(self.top_k)
            .build()
            .context("invalid retrieval settings")
    }

    /// Assemble the orchestrator for the selected mode.
    pub fn build_orchestrator(&self) -> Result<ConversationOrchestrator> {
        let mode = self.mode()?;
        let api_key = self.api_key()?;

        let chat_config = OpenAIChatConfig::new(api_key, &self.chat_model)
            .with_base_url(&self.base_url)
            .with_temperature(self.temperature)
            .with_top_p(self.top_p);
        let llm = Arc::new(OpenAIChatModel::new(chat_config)?);

        let mut builder = ConversationOrchestrator::builder().mode(mode).llm(llm);
        if let (ChatMode::Rag, Some(corpus)) = (mode, &self.corpus) {
            let embedder = OpenAIEmbeddingProvider::new(api_key)?
                .with_model(&self.embedding_model)
                .with_base_url(&self.base_url);
            let pipeline = RagPipeline::builder()
                .config(self.rag_config()?)
                .embedding_provider(Arc::new(embedder))
                .build()?;
            builder = builder.pipeline(pipeline).corpus_path(corpus);
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ragchat").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_follow_the_pipeline_defaults() {
        let cli = parse(&["--plain", "--api-key", "k"]);
        assert_eq!(cli.chunk_size, 1000);
        assert_eq!(cli.chunk_overlap, 50);
        assert_eq!(cli.top_k, 4);
        assert_eq!(cli.temperature, 0.5);
        assert_eq!(cli.top_p, 0.9);
        assert_eq!(cli.base_url, OPENAI_API_BASE);
        assert!(cli.command.is_none());
    }

    #[test]
    fn plain_wins_over_corpus() {
        let cli = parse(&["--corpus", "handbook.txt", "--plain"]);
        assert_eq!(cli.mode().unwrap(), ChatMode::Plain);
    }

    #[test]
    fn corpus_selects_rag_mode() {
        let cli = parse(&["--corpus", "handbook.txt"]);
        assert_eq!(cli.mode().unwrap(), ChatMode::Rag);
    }

    #[test]
    fn ask_subcommand_accepts_global_flags_after_it() {
        let cli = parse(&["ask", "What is the leave policy?", "--top-k", "2"]);
        assert!(matches!(cli.command, Some(Command::Ask { ref question }) if question == "What is the leave policy?"));
        assert_eq!(cli.top_k, 2);
    }

    #[test]
    fn overlap_not_below_size_is_rejected() {
        let cli = parse(&["--chunk-size", "50", "--chunk-overlap", "50"]);
        assert!(cli.rag_config().is_err());
    }

    #[test]
    fn rag_orchestrator_starts_uninitialized() {
        let cli = parse(&["--corpus", "handbook.txt", "--api-key", "k"]);
        let orchestrator = cli.build_orchestrator().unwrap();
        assert_eq!(orchestrator.mode(), ChatMode::Rag);
        assert_eq!(orchestrator.state(), ragchat_runner::OrchestratorState::Uninitialized);
    }
}
