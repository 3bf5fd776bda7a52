//! Logging setup
//!
//! Console output always; with a log directory, daily rolling files under
//! `app/` plus a separate `audit/` stream for events logged with
//! `target: "audit"`.

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, prelude::*};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "cantine_server=info,tower_http=info";

fn console_layer(json: bool) -> BoxedLayer {
    if json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    }
}

fn file_layer(
    dir: &Path,
    prefix: &str,
    json: bool,
    audit: bool,
) -> anyhow::Result<BoxedLayer> {
    let dir = dir.join(prefix);
    fs::create_dir_all(&dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, prefix);
    let only_audit = tracing_subscriber::filter::filter_fn(move |meta| {
        (meta.target() == "audit") == audit
    });

    let layer = if json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::sync::Mutex::new(appender))
            .with_filter(only_audit)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(appender))
            .with_filter(only_audit)
            .boxed()
    };
    Ok(layer)
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_logger(default_filter: &str, json: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let mut layers: Vec<BoxedLayer> = vec![console_layer(json)];
    if let Some(dir) = log_dir {
        let dir = Path::new(dir);
        layers.push(file_layer(dir, "app", json, false)?);
        layers.push(file_layer(dir, "audit", json, true)?);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;
    Ok(())
}
