mod common;

use std::sync::Arc;

use common::{KeywordEmbedder, echo_system, pipeline, write_corpus};
use ragchat_core::{Message, RagChatError, Turn};
use ragchat_model::MockLlm;
use ragchat_runner::{ChatMode, ConversationOrchestrator, OrchestratorState};

const POLICY: &str = "Remote work is allowed up to 3 days per week.";

#[tokio::test]
async fn answers_from_corpus_and_records_one_turn() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path(), "policy.txt", POLICY);
    let llm = Arc::new(MockLlm::responding("echo", echo_system));

    let orchestrator = ConversationOrchestrator::builder()
        .llm(llm.clone())
        .pipeline(pipeline(Arc::new(KeywordEmbedder::default())))
        .corpus_path(corpus)
        .build()
        .unwrap();
    let session = orchestrator.create_session().await;

    let question = "What is the remote work policy?";
    let answer = orchestrator.ask(&session, question).await.unwrap();

    assert!(answer.contains("3 days per week"));
    assert_eq!(orchestrator.transcript(&session).await, vec![Turn::new(question, answer)]);
    // First turn: no rewrite, one answer call.
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn plain_chat_passes_prior_turns_to_the_model() {
    let llm = Arc::new(MockLlm::new("chat").with_reply("Hello David!").with_reply("David."));
    let orchestrator = ConversationOrchestrator::builder().llm(llm.clone()).build().unwrap();
    assert_eq!(orchestrator.mode(), ChatMode::Plain);
    assert_eq!(orchestrator.state(), OrchestratorState::Ready);

    orchestrator.ask("S", "My name is David.").await.unwrap();
    let answer = orchestrator.ask("S", "What is my name?").await.unwrap();
    assert_eq!(answer, "David.");

    let calls = llm.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1],
        vec![
            Message::user("My name is David."),
            Message::assistant("Hello David!"),
            Message::user("What is my name?"),
        ]
    );
}

#[tokio::test]
async fn rag_without_index_or_corpus_fails_with_zero_external_calls() {
    let llm = Arc::new(MockLlm::responding("echo", echo_system));
    let embedder = Arc::new(KeywordEmbedder::default());
    let orchestrator = ConversationOrchestrator::builder()
        .llm(llm.clone())
        .pipeline(pipeline(embedder.clone()))
        .build()
        .unwrap();
    assert_eq!(orchestrator.state(), OrchestratorState::Uninitialized);

    let err = orchestrator.ask("s", "What is the remote work policy?").await.unwrap_err();
    assert!(matches!(err, RagChatError::RetrieverNotConfigured));
    assert!(err.is_precondition());
    assert_eq!(llm.call_count(), 0);
    assert_eq!(embedder.total_calls(), 0);
    assert!(orchestrator.transcript("s").await.is_empty());
}

#[tokio::test]
async fn rag_mode_without_pipeline_is_not_configured() {
    let llm = Arc::new(MockLlm::new("chat"));
    let orchestrator =
        ConversationOrchestrator::builder().llm(llm.clone()).mode(ChatMode::Rag).build().unwrap();

    let err = orchestrator.ask("s", "anything").await.unwrap_err();
    assert!(matches!(err, RagChatError::RetrieverNotConfigured));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn build_index_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path(), "policy.txt", POLICY);
    let embedder = Arc::new(KeywordEmbedder::default());
    let orchestrator = ConversationOrchestrator::builder()
        .llm(Arc::new(MockLlm::new("chat")))
        .pipeline(pipeline(embedder.clone()))
        .build()
        .unwrap();

    let first = orchestrator.build_index(&corpus).await.unwrap();
    let second = orchestrator.build_index(&corpus).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(embedder.batch_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(orchestrator.state(), OrchestratorState::Ready);
    assert!(orchestrator.index().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lazy_build_runs_once_under_concurrent_first_questions() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path(), "policy.txt", POLICY);
    let embedder = Arc::new(KeywordEmbedder::default());
    let orchestrator = Arc::new(
        ConversationOrchestrator::builder()
            .llm(Arc::new(MockLlm::responding("echo", echo_system)))
            .pipeline(pipeline(embedder.clone()))
            .corpus_path(corpus)
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator.ask(&format!("session-{i}"), "How many remote days?").await
            })
        })
        .collect();
    for result in futures::future::join_all(handles).await {
        assert!(result.unwrap().unwrap().contains("3 days per week"));
    }

    assert_eq!(embedder.batch_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(orchestrator.sessions().len().await, 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_questions_on_one_session_are_serialized() {
    const N: usize = 16;
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let llm = Arc::new(MockLlm::responding("counter", move |messages: &[Message]| {
        // Plain mode sends two messages per prior turn plus the question.
        let prior_turns = (messages.len() - 1) / 2;
        std::thread::sleep(std::time::Duration::from_millis(2));
        recorder.lock().unwrap().push(prior_turns);
        format!("answer after {prior_turns} turns")
    }));
    let orchestrator =
        Arc::new(ConversationOrchestrator::builder().llm(llm).build().unwrap());

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.ask("shared", &format!("question {i}")).await })
        })
        .collect();
    for result in futures::future::join_all(handles).await {
        result.unwrap().unwrap();
    }

    let mut counts = seen.lock().unwrap().clone();
    counts.sort_unstable();
    assert_eq!(counts, (0..N).collect::<Vec<_>>());

    let turns = orchestrator.transcript("shared").await;
    assert_eq!(turns.len(), N);
    for (i, turn) in turns.iter().enumerate() {
        assert_eq!(turn.answer, format!("answer after {i} turns"));
    }
}

#[tokio::test]
async fn failed_build_leaves_orchestrator_retryable() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("late.txt");
    let orchestrator = ConversationOrchestrator::builder()
        .llm(Arc::new(MockLlm::responding("echo", echo_system)))
        .pipeline(pipeline(Arc::new(KeywordEmbedder::default())))
        .corpus_path(&corpus)
        .build()
        .unwrap();

    let err = orchestrator.ask("s", "policy?").await.unwrap_err();
    assert!(matches!(err, RagChatError::Loader { .. }));
    assert_eq!(orchestrator.state(), OrchestratorState::Uninitialized);
    assert!(orchestrator.index().is_none());

    std::fs::write(&corpus, POLICY).unwrap();
    let answer = orchestrator.ask("s", "policy?").await.unwrap();
    assert!(answer.contains("3 days per week"));
    assert_eq!(orchestrator.transcript("s").await.len(), 1);
}

#[tokio::test]
async fn blank_corpus_fails_with_empty_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path(), "blank.txt", "  \n\u{000C}\n ");
    let orchestrator = ConversationOrchestrator::builder()
        .llm(Arc::new(MockLlm::new("chat")))
        .pipeline(pipeline(Arc::new(KeywordEmbedder::default())))
        .build()
        .unwrap();

    let err = orchestrator.build_index(&corpus).await.unwrap_err();
    assert!(matches!(err, RagChatError::EmptyCorpus));
    assert_eq!(orchestrator.state(), OrchestratorState::Uninitialized);
}

#[tokio::test]
async fn follow_up_in_rag_mode_is_rewritten_before_answering() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path(), "policy.txt", POLICY);
    let llm = Arc::new(
        MockLlm::new("scripted")
            .with_reply("Up to 3 days per week.")
            .with_reply("Is remote work allowed on Fridays?")
            .with_reply("I don't know."),
    );
    let orchestrator = ConversationOrchestrator::builder()
        .llm(llm.clone())
        .pipeline(pipeline(Arc::new(KeywordEmbedder::default())))
        .corpus_path(corpus)
        .build()
        .unwrap();

    orchestrator.ask("s", "What is the remote work policy?").await.unwrap();
    let answer = orchestrator.ask("s", "And on Fridays?").await.unwrap();
    assert_eq!(answer, "I don't know.");

    let calls = llm.calls();
    assert_eq!(calls.len(), 3);
    // The rewrite call sees the first exchange.
    assert!(calls[1].iter().any(|m| m.content == "Up to 3 days per week."));
    // The answer call gets the original question, not the rewrite.
    assert_eq!(calls[2].last().unwrap().content, "And on Fridays?");
    assert!(calls[2][0].content.contains(POLICY));

    let turns = orchestrator.transcript("s").await;
    assert_eq!(turns[1], Turn::new("And on Fridays?", "I don't know."));
}

#[tokio::test]
async fn generation_failure_leaves_transcript_untouched() {
    let llm = Arc::new(MockLlm::new("chat").with_error("service unavailable"));
    let orchestrator = ConversationOrchestrator::builder().llm(llm).build().unwrap();

    let err = orchestrator.ask("s", "hello").await.unwrap_err();
    assert!(err.is_transient());
    assert!(orchestrator.transcript("s").await.is_empty());
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let llm = Arc::new(MockLlm::new("chat"));
    let orchestrator = ConversationOrchestrator::builder().llm(llm.clone()).build().unwrap();

    let err = orchestrator.ask("s", "   ").await.unwrap_err();
    assert!(matches!(err, RagChatError::InvalidInput(_)));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn corpus_path_without_pipeline_is_a_config_error() {
    let result = ConversationOrchestrator::builder()
        .llm(Arc::new(MockLlm::new("chat")))
        .corpus_path("handbook.txt")
        .build();
    assert!(matches!(result, Err(RagChatError::Config(_))));
}
