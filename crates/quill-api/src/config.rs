// Server configuration loaded from environment variables.
// Decision: Unset DATABASE_URL selects the in-memory backend (dev mode)
// Decision: Unset AUTH_SECRET generates a random per-process secret, so dev
//           tokens stop working across restarts

use std::time::Duration;

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub addr: String,
    /// Whole-request budget enforced by the timeout layer.
    pub request_timeout: Duration,
}

/// Database pool settings. `url == None` means dev mode (in-memory).
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub idle_timeout: Duration,
}

/// Token issuing/verification settings. The issuer doubles as the audience.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    pub token_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http: HttpConfig,
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// Optional prefix for all API routes, e.g. "/api/v1".
    pub api_prefix: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "quill".to_string(),
            token_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let addr = env_string("ADDR", "0.0.0.0:8080");

        let request_timeout = env_parse("REQUEST_TIMEOUT_SECS", 60u64);

        let db = DbConfig {
            url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            max_connections: env_parse("DB_MAX_CONNECTIONS", 30u32),
            idle_timeout: Duration::from_secs(env_parse("DB_IDLE_TIMEOUT_SECS", 15 * 60u64)),
        };

        let secret = std::env::var("AUTH_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!(
                    "AUTH_SECRET not set, generating a random secret; issued tokens will not \
                     survive a restart"
                );
                use rand::Rng;
                let bytes: [u8; 32] = rand::thread_rng().gen();
                hex::encode(bytes)
            });

        let auth = AuthConfig {
            secret,
            issuer: env_string("AUTH_ISSUER", "quill"),
            token_ttl: Duration::from_secs(env_parse("AUTH_TOKEN_TTL_SECS", 24 * 60 * 60u64)),
        };

        Self {
            http: HttpConfig {
                addr,
                request_timeout: Duration::from_secs(request_timeout),
            },
            db,
            auth,
            api_prefix: std::env::var("API_PREFIX").unwrap_or_default(),
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
