use crate::config::AppConfig;
use std::any::Any;
use std::env;
use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, time::UtcTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

static TRACING_INIT: OnceLock<()> = OnceLock::new();
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

pub fn tracing_log_path() -> PathBuf {
    env::var("SERIALWATCH_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("serialwatch_trace.jsonl"))
}

fn stderr_level(config: &AppConfig) -> LevelFilter {
    if config.verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

/// Install the global subscriber: human-readable events on stderr, plus a JSON trace file when
/// file logging is on. Stdout is reserved for device data.
pub fn init_tracing(config: &AppConfig) {
    let _ = TRACING_INIT.get_or_init(|| {
        let stderr_layer = fmt::layer()
            .with_target(false)
            .without_time()
            .with_writer(io::stderr)
            .with_filter(stderr_level(config));

        let file_layer = (config.logs && !config.no_logs)
            .then(|| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(tracing_log_path())
                    .ok()
            })
            .flatten()
            .map(|file| {
                fmt::layer()
                    .json()
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(file)
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_filter(LevelFilter::DEBUG)
            });

        let subscriber = tracing_subscriber::registry()
            .with(stderr_layer)
            .with(file_layer);
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "non-string panic payload"
    }
}

/// Send panics through tracing, so they land in the trace file, before the default hook prints
/// them.
pub fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            tracing::error!(
                %location,
                version = env!("CARGO_PKG_VERSION"),
                "panic: {}",
                panic_message(info.payload())
            );
            previous(info);
        }));
    });
}
