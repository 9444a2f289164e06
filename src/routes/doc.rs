use utoipa::OpenApi;

use crate::routes::{chat, health, home};
use crate::schemas::chat::{ChatRequest, ChatResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Groq LLaMA Chat API",
        description = "Chat backend forwarding questions to Groq with per-user history",
        version = "0.1.0",
    ),
    paths(home::get_home, health::get_health, chat::chat),
    components(schemas(ChatRequest, ChatResponse))
)]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
