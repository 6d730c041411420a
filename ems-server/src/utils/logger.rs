//! Logging Infrastructure
//!
//! Console output plus, when a log directory is configured, daily rotating
//! files:
//! - `app/ems-server.YYYY-MM-DD` - everything except security events
//! - `security/security.YYYY-MM-DD` - events logged with `target: "security"`

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::Layered;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

use crate::core::LogConfig;

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Keeps the non-blocking file writers flushing; drop on shutdown
#[derive(Debug, Default)]
pub struct LogGuard {
    _guards: Vec<WorkerGuard>,
}

/// Initialize the global subscriber
///
/// `RUST_LOG` overrides `config.level`. Calling it twice is harmless: the
/// second call leaves the first subscriber in place.
pub fn init_logger(config: &LogConfig) -> LogGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guards = Vec::new();

    layers.push(if config.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    });

    if let Some(dir) = config.dir.as_deref() {
        match file_layers(Path::new(dir), config.json) {
            Ok((file_layers, file_guards)) => {
                layers.extend(file_layers);
                guards.extend(file_guards);
            }
            Err(e) => eprintln!("File logging disabled, cannot use {dir}: {e}"),
        }
    }

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already set");
    }

    LogGuard { _guards: guards }
}

fn file_layers(
    log_dir: &Path,
    json: bool,
) -> std::io::Result<(Vec<BoxedLayer>, Vec<WorkerGuard>)> {
    let app_dir = log_dir.join("app");
    let security_dir = log_dir.join("security");
    std::fs::create_dir_all(&app_dir)?;
    std::fs::create_dir_all(&security_dir)?;

    let (app_writer, app_guard) = tracing_appender::non_blocking(RollingFileAppender::new(
        Rotation::DAILY,
        app_dir,
        "ems-server",
    ));
    let (security_writer, security_guard) = tracing_appender::non_blocking(
        RollingFileAppender::new(Rotation::DAILY, security_dir, "security"),
    );

    let not_security =
        tracing_subscriber::filter::filter_fn(|meta| meta.target() != "security");
    let only_security =
        tracing_subscriber::filter::filter_fn(|meta| meta.target() == "security");

    let layers: Vec<BoxedLayer> = if json {
        vec![
            fmt::layer()
                .json()
                .with_writer(app_writer)
                .with_filter(not_security)
                .boxed(),
            fmt::layer()
                .json()
                .with_writer(security_writer)
                .with_filter(only_security)
                .boxed(),
        ]
    } else {
        vec![
            fmt::layer()
                .with_ansi(false)
                .with_writer(app_writer)
                .with_filter(not_security)
                .boxed(),
            fmt::layer()
                .with_ansi(false)
                .with_writer(security_writer)
                .with_filter(only_security)
                .boxed(),
        ]
    };

    Ok((layers, vec![app_guard, security_guard]))
}
