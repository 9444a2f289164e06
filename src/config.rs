//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for the chat server.
///
/// Every field except `database_url` has a sensible default so the server
/// works out-of-the-box; without `CHAT_DATABASE_URL` it runs in the degraded
/// no-persistence mode described on [`crate::state::AppState`].
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite (or other sqlx-compatible) database URL, e.g.
    /// `"sqlite://chat.db"`.  `None` when `CHAT_DATABASE_URL` is unset;
    /// the server then answers questions without conversation history.
    pub database_url: Option<String>,

    /// Bearer credential for the Groq API.  Not validated at startup —
    /// a missing or wrong key surfaces as a completion failure on first use.
    pub groq_api_key: String,

    /// Completion model identifier (default: `"llama-3.1-8b-instant"`).
    pub model: String,

    /// Upper bound on one completion round-trip, in seconds (default: 60).
    pub completion_timeout_secs: u64,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS origin allow-list.  `None` → wildcard origins
    /// (development posture).
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui` (default: true).
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("CHAT_BIND", "0.0.0.0:3000"),
            database_url: std::env::var("CHAT_DATABASE_URL").ok(),
            groq_api_key: env_or("GROQ_API_KEY", ""),
            model: env_or("CHAT_MODEL", "llama-3.1-8b-instant"),
            completion_timeout_secs: parse_env("CHAT_COMPLETION_TIMEOUT_SECS", 60),
            log_level: env_or("CHAT_LOG", "info"),
            log_json: env_bool("CHAT_LOG_JSON", false),
            cors_allowed_origins: std::env::var("CHAT_CORS_ORIGINS").ok(),
            enable_swagger: env_bool("CHAT_ENABLE_SWAGGER", true),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
