//! Chat endpoint request / response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChatRequest {
    /// Identifier grouping the turns of one conversation.
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,
    /// The question to forward to the model.
    #[validate(length(min = 1, message = "question must not be empty"))]
    pub question: String,
}

/// Response body for `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// The generated answer.
    pub response: String,
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_user_id_fails_validation() {
        let req = ChatRequest {
            user_id: "".into(),
            question: "hi".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn empty_question_fails_validation() {
        let req = ChatRequest {
            user_id: "u1".into(),
            question: "".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn well_formed_request_passes_validation() {
        let req = ChatRequest {
            user_id: "u1".into(),
            question: "What is 2+2?".into(),
        };
        assert!(req.validate().is_ok());
    }
}
