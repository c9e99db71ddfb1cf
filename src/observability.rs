use anyhow::{Error, Result};
use once_cell::sync::OnceCell;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    /// `RUST_LOG_FORMAT=json` (also the default) or anything else for text.
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(std::env::var("RUST_LOG_FORMAT").ok().as_deref())
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("" | "json") => Self::Json,
            Some(_) => Self::Text,
        }
    }
}

/// Installs the global subscriber once. Logs go to stderr so stdout stays
/// free for the artifact.
///
/// `RUST_LOG` overrides the default `info` filter.
///
/// # Errors
/// Returns an error if another global subscriber is already installed.
pub fn init() -> Result<()> {
    TRACING_INIT.get_or_try_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let format = LogFormat::from_env();

        let registry = tracing_subscriber::registry().with(env_filter);
        let installed = match format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
            LogFormat::Text => registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .try_init(),
        };
        installed.map_err(|e: tracing_subscriber::util::TryInitError| Error::msg(e.to_string()))?;

        info!(format = ?format, "tracing initialized");
        Ok::<(), Error>(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_the_default_format() {
        assert_eq!(LogFormat::parse(None), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
    }

    #[test]
    fn other_values_select_text() {
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Text);
        assert_eq!(LogFormat::parse(Some("text")), LogFormat::Text);
    }
}
