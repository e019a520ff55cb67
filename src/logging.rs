//! Tracing subscriber setup.
//!
//! Provider and cache calls run inside `#[instrument]` spans under the
//! per-request span. Closing a span logs how long it was open, which is how a
//! slow DeepL or OpenAI call shows up in the logs.

use anyhow::Result;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::config::Environment;

/// Filter used when `RUST_LOG` is unset.
pub fn default_directives(env: &Environment) -> String {
    let (crate_level, http_level, other_level) = match env {
        Environment::Dev => ("debug", "debug", "info"),
        Environment::Staging => ("debug", "info", "info"),
        // reqwest, hyper and redis stay quiet unless they warn
        Environment::Prod => ("info", "info", "warn"),
    };

    format!(
        "{}={},tower_http={},{}",
        env!("CARGO_CRATE_NAME"),
        crate_level,
        http_level,
        other_level
    )
}

pub fn init_logging(env: &Environment) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(env))?,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    let registry = tracing_subscriber::registry().with(filter);

    // One JSON object per line, with the request span's fields on every event
    if matches!(env, Environment::Prod) {
        registry
            .with(fmt_layer.json().with_current_span(true).with_span_list(false))
            .try_init()?;
    } else {
        registry.with(fmt_layer.pretty()).try_init()?;
    }

    tracing::info!(env = ?env, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_per_environment() {
        assert_eq!(
            default_directives(&Environment::Dev),
            "easy_japanese_news=debug,tower_http=debug,info"
        );
        assert_eq!(
            default_directives(&Environment::Prod),
            "easy_japanese_news=info,tower_http=info,warn"
        );
    }

    #[test]
    fn test_default_directives_parse() {
        for env in [Environment::Dev, Environment::Staging, Environment::Prod] {
            assert!(EnvFilter::try_new(default_directives(&env)).is_ok());
        }
    }
}
