//! Logging setup on top of `tracing`.
//!
//! One-shot runs log compactly to stderr. The terminal UI owns stderr, so it
//! logs to `bugfinder.log` under the configured log directory instead.
//! The filter comes from `BUGFINDER_LOG` (default `warn`).

use std::fs::{self, OpenOptions};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub const LOG_FILE_NAME: &str = "bugfinder.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File,
}

/// Keep alive until exit; dropping it flushes the file writer.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

pub fn init(cfg: &Config, target: LogTarget) -> LoggingGuard {
    let directives = cfg.get("BUGFINDER_LOG").unwrap_or_else(|| "warn".into());
    let env_filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));

    match target {
        LogTarget::Stderr => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact();
            // A subscriber may already be installed (tests); keep it.
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .try_init();
            LoggingGuard { _file_guard: None }
        }
        LogTarget::File => {
            let dir = cfg.log_dir();
            let file = fs::create_dir_all(&dir).and_then(|_| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(dir.join(LOG_FILE_NAME))
            });
            let file = match file {
                Ok(f) => f,
                // Nowhere safe to write; run without logs rather than corrupt the screen.
                Err(_) => return LoggingGuard { _file_guard: None },
            };

            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .try_init();

            tracing::info!(log_dir = %dir.display(), "logging initialized");
            LoggingGuard { _file_guard: Some(guard) }
        }
    }
}
