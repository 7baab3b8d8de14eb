use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` wins over the configured filter; `info` is the fallback.
pub fn init_logging(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| match &cfg.filter {
            Some(directives) => EnvFilter::try_new(directives),
            None => Ok(EnvFilter::new("info")),
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
