use crate::state::AppState;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};

/// Build the CORS layer.
///
/// Default is wildcard origins / methods / headers, a development posture.
/// `tower-http` rejects wildcard origins combined with credentials, so
/// credentials are only allowed when `CHAT_CORS_ORIGINS` names explicit
/// origins.
pub fn cors_layer(state: Arc<AppState>) -> CorsLayer {
    if let Some(origins_str) = &state.config.cors_allowed_origins {
        // Parse the comma-separated origin list and build a restrictive layer.
        let origins: Vec<axum::http::HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        if origins.is_empty() {
            permissive()
        } else {
            // Credentials forbid wildcard headers/methods, so mirror the
            // preflight request instead.
            CorsLayer::new()
                .allow_origin(origins)
                .allow_headers(AllowHeaders::mirror_request())
                .allow_methods(AllowMethods::mirror_request())
                .allow_credentials(true)
        }
    } else {
        // Wildcard – suitable for development; set CHAT_CORS_ORIGINS in
        // production.
        permissive()
    }
}

fn permissive() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any)
}
