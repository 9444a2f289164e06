//! Welcome endpoint.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::state::AppState;

/// Register the welcome route.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_home))
}

/// Welcome endpoint.
///
/// Returns a static greeting with HTTP 200.
#[utoipa::path(
    get,
    path = "/",
    tag = "home",
    responses(
        (status = 200, description = "Welcome message", body = Value)
    )
)]
pub async fn get_home() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Groq LLaMA Chat API!",
    }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn welcome_message_matches_the_api_contract() {
        let Json(body) = get_home().await;
        assert_eq!(body["message"], "Welcome to the Groq LLaMA Chat API!");
    }
}
