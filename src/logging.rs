//! Logging setup
//!
//! Events carry flat structured fields (`transfer_id`, `user_id`,
//! `payment_intent_id`, `payout_id`, `amount`). In JSON mode those fields sit
//! at the top level of each line next to the enclosing span's fields, so log
//! queries can filter on them directly.

use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Dependencies that are noisy at `info`
const QUIET_TARGETS: &[&str] = &["sqlx", "hyper_util", "reqwest"];

/// Log file rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Never,
    Hourly,
    Daily,
}

impl Rotation {
    /// Unknown values fall back to a single file
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Rotation::Hourly,
            "daily" => Rotation::Daily,
            _ => Rotation::Never,
        }
    }

    fn appender(self, dir: &str, file: &str) -> RollingFileAppender {
        match self {
            Rotation::Never => rolling::never(dir, file),
            Rotation::Hourly => rolling::hourly(dir, file),
            Rotation::Daily => rolling::daily(dir, file),
        }
    }
}

/// Filter directives for `level` with dependency noise capped at `warn`
pub fn filter_directives(level: &str) -> String {
    let mut directives = level.to_string();
    for target in QUIET_TARGETS {
        directives.push_str(&format!(",{}=warn", target));
    }
    directives
}

/// Install the global subscriber; keep the guard alive for the process
///
/// `RUST_LOG` overrides `log_level`.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let rotation = Rotation::parse(&config.rotation);
    let (non_blocking, guard) =
        tracing_appender::non_blocking(rotation.appender(&config.log_dir, &config.log_file));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}
