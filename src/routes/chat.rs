//! The chat endpoint.
//!
//! One request runs a linear pipeline: load the user's stored turns, render
//! them as a transcript, compose the prompt, call the completion service,
//! persist the new user/assistant turn pair, answer.  All state lives in
//! the store; the handler itself is stateless between requests.
//!
//! Persistence is strictly best-effort.  A store outage must never block
//! answering a new question, so history reads degrade to empty and write
//! failures are logged instead of surfaced.  Turns are written only after
//! a successful completion; a failed completion leaves no trace of the
//! question.

use axum::Json;
use axum::extract::State;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::db::{ChatTurn, Role};
use crate::error::ServerError;
use crate::schemas::chat::{ChatRequest, ChatResponse};
use crate::state::AppState;

/// Register the chat route.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Answer a question (`POST /chat`), using the user's prior turns as context.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer generated", body = ChatResponse),
        (status = 400, description = "Missing or empty user_id / question"),
        (status = 502, description = "Completion service failure"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    req.validate()
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    let history = load_history(&state, &req.user_id).await;
    let transcript = format_transcript(&history);
    let full_question = compose_prompt(&transcript, &req.question);

    debug!(
        user_id = %req.user_id,
        history_turns = history.len(),
        prompt_len = full_question.len(),
        "chat request"
    );

    // No retry and no fallback: a completion failure fails the request.
    let answer = state.llm.complete(&full_question).await?;

    info!(user_id = %req.user_id, answer_len = answer.len(), "chat completion done");

    // Best-effort persistence of the new turn pair, user first.
    if let Some(store) = &state.history {
        store
            .append(ChatTurn::now(&req.user_id, Role::User, &req.question))
            .await
            .unwrap_or_else(|e| warn!(error = %e, user_id = %req.user_id, "failed to persist user turn"));
        store
            .append(ChatTurn::now(&req.user_id, Role::Assistant, &answer))
            .await
            .unwrap_or_else(|e| warn!(error = %e, user_id = %req.user_id, "failed to persist assistant turn"));
    }

    Ok(Json(ChatResponse { response: answer }))
}

/// Load the user's stored turns, degrading to empty history when no store
/// is configured or the read fails.
async fn load_history(state: &AppState, user_id: &str) -> Vec<ChatTurn> {
    let Some(store) = &state.history else {
        return Vec::new();
    };
    match store.list_by_user(user_id).await {
        Ok(turns) => turns,
        Err(e) => {
            warn!(error = %e, user_id, "history read failed; continuing with empty history");
            Vec::new()
        }
    }
}

/// Render stored turns as one `"role: message"` line per turn.
fn format_transcript(turns: &[ChatTurn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role, t.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefix the question with the transcript when one exists; otherwise the
/// question goes to the model verbatim.
fn compose_prompt(transcript: &str, question: &str) -> String {
    if transcript.is_empty() {
        question.to_owned()
    } else {
        format!("Previous conversation:\n{transcript}\n\nCurrent question: {question}")
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::db::HistoryStore;
    use crate::llm::{CompletionClient, CompletionError};
    use std::sync::Mutex;

    // ── Stubs ─────────────────────────────────────────────────────────────────

    /// In-memory append-only store.
    #[derive(Default)]
    struct MemStore {
        turns: Mutex<Vec<ChatTurn>>,
    }

    #[async_trait::async_trait]
    impl HistoryStore for MemStore {
        async fn append(&self, turn: ChatTurn) -> Result<(), sqlx::Error> {
            self.turns.lock().unwrap().push(turn);
            Ok(())
        }

        async fn list_by_user(&self, user_id: &str) -> Result<Vec<ChatTurn>, sqlx::Error> {
            Ok(self
                .turns
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    /// Store whose every operation fails, as if the database were down.
    struct BrokenStore;

    #[async_trait::async_trait]
    impl HistoryStore for BrokenStore {
        async fn append(&self, _turn: ChatTurn) -> Result<(), sqlx::Error> {
            Err(sqlx::Error::PoolClosed)
        }

        async fn list_by_user(&self, _user_id: &str) -> Result<Vec<ChatTurn>, sqlx::Error> {
            Err(sqlx::Error::PoolClosed)
        }
    }

    /// Completion stub that records every prompt and returns a fixed answer.
    struct RecordingCompletion {
        answer: String,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingCompletion {
        fn answering(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: answer.to_owned(),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl CompletionClient for RecordingCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_owned());
            Ok(self.answer.clone())
        }
    }

    /// Completion stub that always fails.
    struct BrokenCompletion;

    #[async_trait::async_trait]
    impl CompletionClient for BrokenCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Err(CompletionError::Timeout { secs: 60 })
        }
    }

    fn app_state(
        history: Option<Arc<dyn HistoryStore>>,
        llm: Arc<dyn CompletionClient>,
    ) -> Arc<AppState> {
        Arc::new(AppState {
            config: Arc::new(Config::from_env()),
            history,
            llm,
        })
    }

    fn request(user_id: &str, question: &str) -> ChatRequest {
        ChatRequest {
            user_id: user_id.into(),
            question: question.into(),
        }
    }

    // ── Formatter ─────────────────────────────────────────────────────────────

    #[test]
    fn empty_history_formats_to_empty_string() {
        assert_eq!(format_transcript(&[]), "");
    }

    #[test]
    fn transcript_has_one_role_message_line_per_turn() {
        let turns = vec![
            ChatTurn::now("u1", Role::User, "Hi"),
            ChatTurn::now("u1", Role::Assistant, "Hello"),
            ChatTurn::now("u1", Role::User, "And then?"),
        ];
        assert_eq!(
            format_transcript(&turns),
            "user: Hi\nassistant: Hello\nuser: And then?"
        );
    }

    // ── Prompt composition ────────────────────────────────────────────────────

    #[test]
    fn question_is_sent_verbatim_without_history() {
        assert_eq!(compose_prompt("", "What is 2+2?"), "What is 2+2?");
    }

    #[test]
    fn transcript_is_prepended_when_present() {
        assert_eq!(
            compose_prompt("user: Hi\nassistant: Hello", "And then?"),
            "Previous conversation:\nuser: Hi\nassistant: Hello\n\nCurrent question: And then?"
        );
    }

    // ── Endpoint scenarios ────────────────────────────────────────────────────

    #[tokio::test]
    async fn first_question_is_answered_and_both_turns_persisted() {
        let store = Arc::new(MemStore::default());
        let llm = RecordingCompletion::answering("4");
        let state = app_state(Some(store.clone()), llm.clone());

        let Json(body) = chat(State(state), Json(request("u1", "What is 2+2?")))
            .await
            .unwrap();
        assert_eq!(body.response, "4");

        // The prompt had no history prefix.
        assert_eq!(llm.last_prompt(), "What is 2+2?");

        let turns = store.list_by_user("u1").await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].message, "What is 2+2?");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].message, "4");
    }

    #[tokio::test]
    async fn prior_turns_are_prepended_to_the_prompt() {
        let store = Arc::new(MemStore::default());
        store
            .append(ChatTurn::now("u1", Role::User, "Hi"))
            .await
            .unwrap();
        store
            .append(ChatTurn::now("u1", Role::Assistant, "Hello"))
            .await
            .unwrap();

        let llm = RecordingCompletion::answering("Then we continue.");
        let state = app_state(Some(store), llm.clone());

        chat(State(state), Json(request("u1", "And then?")))
            .await
            .unwrap();

        assert_eq!(
            llm.last_prompt(),
            "Previous conversation:\nuser: Hi\nassistant: Hello\n\nCurrent question: And then?"
        );
    }

    #[tokio::test]
    async fn completion_failure_propagates_and_writes_nothing() {
        let store = Arc::new(MemStore::default());
        let state = app_state(Some(store.clone()), Arc::new(BrokenCompletion));

        let err = chat(State(state), Json(request("u1", "What is 2+2?")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Completion(_)));
        assert!(store.list_by_user("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_store_degrades_to_answering_without_history() {
        let llm = RecordingCompletion::answering("4");
        let state = app_state(None, llm.clone());

        let Json(body) = chat(State(state), Json(request("u1", "What is 2+2?")))
            .await
            .unwrap();
        assert_eq!(body.response, "4");
        assert_eq!(llm.last_prompt(), "What is 2+2?");
    }

    #[tokio::test]
    async fn broken_store_neither_fails_reads_nor_writes() {
        let llm = RecordingCompletion::answering("4");
        let state = app_state(Some(Arc::new(BrokenStore)), llm.clone());

        let Json(body) = chat(State(state), Json(request("u1", "What is 2+2?")))
            .await
            .unwrap();
        assert_eq!(body.response, "4");
        // Read degraded to empty, so no history prefix either.
        assert_eq!(llm.last_prompt(), "What is 2+2?");
    }

    #[tokio::test]
    async fn empty_question_is_rejected_before_the_pipeline_runs() {
        let llm = RecordingCompletion::answering("unused");
        let state = app_state(None, llm.clone());

        let err = chat(State(state), Json(request("u1", "")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
        assert!(llm.prompts.lock().unwrap().is_empty());
    }
}
