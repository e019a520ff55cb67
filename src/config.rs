use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

/// What the article handler does when the simplification call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimplifyFailurePolicy {
    /// Surface the failure as an error response and leave the cache untouched.
    Propagate,
    /// Log the failure, then serve and cache an empty string.
    Degrade,
}

impl SimplifyFailurePolicy {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "degrade" | "empty" => Self::Degrade,
            _ => Self::Propagate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub url: String,
    pub max_retries: u32,
    pub retry_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Redis
    pub redis: RedisSettings,

    // DeepL
    pub deepl_api_url: String,
    pub deepl_api_key: String,

    // OpenAI
    pub openai_api_url: String,
    pub openai_api_key: String,
    pub openai_model: String,

    pub http_timeout_seconds: u64,
    pub simplify_failure_policy: SimplifyFailurePolicy,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Redis
        let redis_url = match env::var("REDIS_URL") {
            Ok(url) => url,
            Err(_) => {
                let host = env::var("REDIS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
                let port = env::var("REDIS_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(6379);
                let password = env::var("REDIS_PW").ok().filter(|s| !s.is_empty());
                let tls = env::var("REDIS_TLS")
                    .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false);
                build_redis_url(&host, port, password.as_deref(), tls)?
            }
        };
        let redis_max_retries = env::var("REDIS_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        let redis_retry_interval_ms = env::var("REDIS_RETRY_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1000);

        // DeepL
        let deepl_api_url = env::var("DEEPL_API_URL")
            .unwrap_or_else(|_| "https://api-free.deepl.com/v2/translate".to_string());
        let deepl_api_key = env::var("DEEPL_API_KEY").context("DEEPL_API_KEY must be set")?;

        // OpenAI
        let openai_api_url =
            env::var("OPENAI_API_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let openai_api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let http_timeout_seconds = env::var("HTTP_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        let simplify_failure_policy = SimplifyFailurePolicy::from_str(
            &env::var("SIMPLIFY_FAILURE_POLICY").unwrap_or_else(|_| "propagate".to_string()),
        );

        Ok(Settings {
            env,
            server_addr,
            redis: RedisSettings {
                url: redis_url,
                max_retries: redis_max_retries,
                retry_interval: Duration::from_millis(redis_retry_interval_ms),
            },
            deepl_api_url,
            deepl_api_key,
            openai_api_url,
            openai_api_key,
            openai_model,
            http_timeout_seconds,
            simplify_failure_policy,
        })
    }
}

/// Assemble a Redis connection URL, percent-encoding the password.
pub fn build_redis_url(host: &str, port: u16, password: Option<&str>, tls: bool) -> Result<String> {
    let scheme = if tls { "rediss" } else { "redis" };
    let mut url = Url::parse(&format!("{}://{}:{}", scheme, host, port))
        .with_context(|| format!("Invalid Redis host: {}", host))?;

    if let Some(password) = password {
        url.set_password(Some(password))
            .map_err(|_| anyhow!("Redis URL cannot carry a password"))?;
    }

    Ok(url.to_string())
}

#[cfg(test)]
impl Settings {
    pub fn for_tests(policy: SimplifyFailurePolicy) -> Self {
        Settings {
            env: Environment::Dev,
            server_addr: "127.0.0.1:0".to_string(),
            redis: RedisSettings {
                url: "redis://127.0.0.1:6379".to_string(),
                max_retries: 0,
                retry_interval: Duration::from_millis(1),
            },
            deepl_api_url: "http://deepl.invalid/v2/translate".to_string(),
            deepl_api_key: "test-deepl-key".to_string(),
            openai_api_url: "http://openai.invalid/v1".to_string(),
            openai_api_key: "test-openai-key".to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            http_timeout_seconds: 5,
            simplify_failure_policy: policy,
        }
    }
}
