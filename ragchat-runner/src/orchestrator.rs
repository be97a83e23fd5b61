//! The public question-answering entry point.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragchat_runner::ConversationOrchestrator;
//!
//! let orchestrator = ConversationOrchestrator::builder()
//!     .llm(model)
//!     .pipeline(pipeline)
//!     .corpus_path("handbook.txt")
//!     .build()?;
//!
//! let session = orchestrator.create_session().await;
//! let answer = orchestrator.ask(&session, "What is the remote work policy?").await?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ragchat_core::{Llm, RagChatError, Result, Turn, conversation};
use ragchat_rag::{RagPipeline, Retriever, VectorIndex};
use ragchat_session::SessionStore;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::answer::AnswerGenerator;
use crate::contextualizer::QueryContextualizer;

/// Whether questions are answered from a corpus or by the model alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// Rewrite, retrieve, then answer from the retrieved passages.
    Rag,
    /// Send the transcript and question straight to the model.
    Plain,
}

/// Lifecycle of a [`ConversationOrchestrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    /// RAG mode without a bound index yet.
    Uninitialized,
    /// Able to answer.
    Ready,
    /// At least one `ask` is in flight.
    Answering,
}

/// Binds sessions to transcripts and runs contextualize → answer → append.
///
/// In RAG mode the vector index is built at most once per instance, either by
/// an explicit [`build_index`](Self::build_index) or lazily on the first
/// [`ask`](Self::ask) when a corpus path is configured. A failed build leaves
/// the orchestrator `Uninitialized` so a later call can retry.
pub struct ConversationOrchestrator {
    mode: ChatMode,
    llm: Arc<dyn Llm>,
    pipeline: Option<RagPipeline>,
    corpus_path: Option<PathBuf>,
    contextualizer: OnceCell<Arc<QueryContextualizer>>,
    answerer: AnswerGenerator,
    sessions: SessionStore,
    system_prompt: Option<String>,
    in_flight: AtomicUsize,
}

/// Counts an `ask` as in flight until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConversationOrchestrator {
    pub fn builder() -> ConversationOrchestratorBuilder {
        ConversationOrchestratorBuilder::default()
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn state(&self) -> OrchestratorState {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            OrchestratorState::Answering
        } else if self.mode == ChatMode::Plain || self.contextualizer.initialized() {
            OrchestratorState::Ready
        } else {
            OrchestratorState::Uninitialized
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// The bound vector index, once built.
    pub fn index(&self) -> Option<Arc<VectorIndex>> {
        self.contextualizer.get().map(|c| c.retriever().index().clone())
    }

    /// Register a new session and return its id.
    pub async fn create_session(&self) -> String {
        self.sessions.create_session().await
    }

    /// The turns recorded for `session_id` so far.
    pub async fn transcript(&self, session_id: &str) -> Vec<Turn> {
        match self.sessions.get(session_id).await {
            Some(transcript) => transcript.turns().await,
            None => Vec::new(),
        }
    }

    /// Build the vector index from `path` and bind the contextualizer.
    ///
    /// Idempotent: once an index is bound, later calls return it without
    /// rebuilding, whatever `path` they pass.
    ///
    /// # Errors
    ///
    /// - [`RagChatError::Config`] in plain chat mode or without an embedding pipeline.
    /// - Any loader, [`RagChatError::EmptyCorpus`] or embedding error from the build.
    pub async fn build_index(&self, path: impl AsRef<Path>) -> Result<Arc<VectorIndex>> {
        if self.mode == ChatMode::Plain {
            return Err(RagChatError::Config("plain chat mode does not use an index".into()));
        }
        let contextualizer = self.init_contextualizer(path.as_ref()).await?;
        Ok(contextualizer.retriever().index().clone())
    }

    async fn init_contextualizer(&self, path: &Path) -> Result<&Arc<QueryContextualizer>> {
        if let Some(contextualizer) = self.contextualizer.get() {
            return Ok(contextualizer);
        }
        let pipeline = self.pipeline.as_ref().ok_or_else(|| {
            RagChatError::Config("building an index requires an embedding pipeline".into())
        })?;

        self.contextualizer
            .get_or_try_init(|| async move {
                info!(path = %path.display(), "building vector index");
                let index = pipeline.build_index(path).await.map_err(|e| {
                    error!(path = %path.display(), error = %e, "index build failed");
                    e
                })?;
                let retriever = pipeline.retriever(Arc::new(index))?;
                Ok::<_, RagChatError>(Arc::new(QueryContextualizer::new(
                    self.llm.clone(),
                    retriever,
                )))
            })
            .await
    }

    /// The bound contextualizer, building it lazily from the configured corpus.
    async fn contextualizer(&self) -> Result<&Arc<QueryContextualizer>> {
        if let Some(contextualizer) = self.contextualizer.get() {
            return Ok(contextualizer);
        }
        match (&self.corpus_path, &self.pipeline) {
            (Some(path), Some(_)) => self.init_contextualizer(path).await,
            _ => Err(RagChatError::RetrieverNotConfigured),
        }
    }

    /// Answer `question` within `session_id` and record the exchange.
    ///
    /// Turns on the same session are serialized; different sessions proceed
    /// concurrently.
    ///
    /// # Errors
    ///
    /// - [`RagChatError::InvalidInput`] for a blank question.
    /// - [`RagChatError::RetrieverNotConfigured`] in RAG mode with neither an index
    ///   nor a corpus path; raised before any external call.
    /// - Service errors from the embedding or generation call, unchanged. The
    ///   transcript is not modified when a turn fails.
    pub async fn ask(&self, session_id: &str, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(RagChatError::InvalidInput("question must not be empty".into()));
        }

        let transcript = self.sessions.transcript(session_id).await;
        let _turn = transcript.lock_turn().await;
        let _in_flight = InFlight::enter(&self.in_flight);
        let history = transcript.turns().await;

        info!(session.id = %session_id, history_turns = history.len(), mode = ?self.mode, "answering question");

        let result = match self.mode {
            ChatMode::Plain => {
                let messages = conversation(self.system_prompt.clone(), &history, question);
                self.llm.generate(&messages).await
            }
            ChatMode::Rag => self.answer_with_retrieval(&history, question).await,
        };

        let answer = result.map_err(|e| {
            if e.is_precondition() {
                warn!(session.id = %session_id, error = %e, "question rejected");
            } else {
                error!(session.id = %session_id, error = %e, "turn failed");
            }
            e
        })?;

        transcript.push(Turn::new(question, answer.clone())).await;
        Ok(answer)
    }

    async fn answer_with_retrieval(&self, history: &[Turn], question: &str) -> Result<String> {
        let contextualizer = self.contextualizer().await?;
        let contextualized = contextualizer.contextualize(history, question).await?;
        self.answerer.answer(history, &contextualized.passages, question).await
    }
}

/// Builder for [`ConversationOrchestrator`].
///
/// The mode is [`ChatMode::Rag`] when a pipeline or retriever is supplied and
/// [`ChatMode::Plain`] otherwise, unless set explicitly with
/// [`mode`](Self::mode).
#[derive(Default)]
pub struct ConversationOrchestratorBuilder {
    mode: Option<ChatMode>,
    llm: Option<Arc<dyn Llm>>,
    pipeline: Option<RagPipeline>,
    retriever: Option<Retriever>,
    corpus_path: Option<PathBuf>,
    sessions: Option<SessionStore>,
    system_prompt: Option<String>,
    qa_prompt: Option<String>,
}

impl ConversationOrchestratorBuilder {
    pub fn mode(mut self, mode: ChatMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// The generation model used for rewriting and answering.
    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// The pipeline used to build the index.
    pub fn pipeline(mut self, pipeline: RagPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Bind an already built index; the orchestrator starts `Ready`.
    pub fn retriever(mut self, retriever: Retriever) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Corpus to index lazily on the first question.
    pub fn corpus_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.corpus_path = Some(path.into());
        self
    }

    /// Share an existing session store.
    pub fn sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// System instruction for plain chat mode. Plain mode sends none by default.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Replace the grounded-answer instruction template.
    pub fn qa_prompt(mut self, template: impl Into<String>) -> Self {
        self.qa_prompt = Some(template.into());
        self
    }

    /// # Errors
    ///
    /// Returns [`RagChatError::Config`] if no model is set, or if a corpus path
    /// is given without a pipeline to index it.
    pub fn build(self) -> Result<ConversationOrchestrator> {
        let llm = self.llm.ok_or_else(|| RagChatError::Config("llm is required".to_string()))?;
        if self.corpus_path.is_some() && self.pipeline.is_none() {
            return Err(RagChatError::Config(
                "corpus_path requires an embedding pipeline".to_string(),
            ));
        }

        let mode = self.mode.unwrap_or(if self.pipeline.is_some() || self.retriever.is_some() {
            ChatMode::Rag
        } else {
            ChatMode::Plain
        });

        let contextualizer = OnceCell::new();
        if let Some(retriever) = self.retriever {
            let _ = contextualizer.set(Arc::new(QueryContextualizer::new(llm.clone(), retriever)));
        }

        let mut answerer = AnswerGenerator::new(llm.clone());
        if let Some(template) = self.qa_prompt {
            answerer = answerer.with_prompt_template(template);
        }

        Ok(ConversationOrchestrator {
            mode,
            llm,
            pipeline: self.pipeline,
            corpus_path: self.corpus_path,
            contextualizer,
            answerer,
            sessions: self.sessions.unwrap_or_default(),
            system_prompt: self.system_prompt,
            in_flight: AtomicUsize::new(0),
        })
    }
}
