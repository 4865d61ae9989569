//! Structured logging and tracing for the Elvia coordinator
//!
//! Console and daily-rolling file output through `tracing-subscriber`, plus a
//! small context-carrying logger used by the coordinator and the API client.

use crate::config::LoggingConfig;
use crate::error::{ElviaError, Result};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Once;
use tracing::{Level, debug, error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

// Keep the non-blocking worker guard alive for the entire process lifetime
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();
static INIT_ONCE: Once = Once::new();
static INIT_ERROR: OnceCell<String> = OnceCell::new();

/// Initialize logging system based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    INIT_ONCE.call_once(|| {
        let init_result = (|| -> Result<()> {
            let level = parse_log_level(&config.level)?;
            let filter = build_env_filter(level);

            if should_use_console_only() {
                init_console_only_logging(filter, config.json_format, level);
                return Ok(());
            }

            init_file_logging(config, filter, level)
        })();

        if let Err(e) = init_result {
            let _ = INIT_ERROR.set(e.to_string());
        }
    });

    if let Some(err) = INIT_ERROR.get() {
        return Err(ElviaError::config(err.clone()));
    }
    Ok(())
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("elvia={level},reqwest=warn,hyper=warn").into())
}

fn should_use_console_only() -> bool {
    cfg!(test) || std::env::var_os("ELVIA_DISABLE_FILE_LOG").is_some()
}

/// Formatting layer shared by the console and file outputs
fn output_layer<S, W>(writer: W, ansi: bool, json_format: bool, level: Level) -> BoxedLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false);
    let max = LevelFilter::from_level(level);
    if json_format {
        layer.json().with_filter(max).boxed()
    } else {
        layer.with_filter(max).boxed()
    }
}

fn init_console_only_logging(filter: EnvFilter, json_format: bool, level: Level) {
    tracing_subscriber::registry()
        .with(filter)
        .with(output_layer(std::io::stdout, true, json_format, level))
        .init();

    info!("Logging initialized at {level}, console only");
}

/// Directory for the rolling files: the parent of a file path, or the path
/// itself when it has no extension
fn log_dir(file: &str) -> &Path {
    let path = Path::new(file);
    match (path.extension(), path.parent()) {
        (Some(_), Some(parent)) => parent,
        _ => path,
    }
}

fn init_file_logging(config: &LoggingConfig, filter: EnvFilter, level: Level) -> Result<()> {
    let appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix("elvia")
        .filename_suffix("log")
        .max_log_files(config.backup_count.max(1) as usize)
        .build(log_dir(&config.file))
        .map_err(|e| ElviaError::io(format!("Cannot open log directory for {}: {e}", config.file)))?;

    let (writer, guard) = non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let console = config
        .console_output
        .then(|| output_layer(std::io::stdout, true, config.json_format, level));
    tracing_subscriber::registry()
        .with(filter)
        .with(output_layer(writer, false, config.json_format, level))
        .with(console)
        .init();

    info!("Logging initialized at {level}, writing to {}", config.file);
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_uppercase().as_str() {
        "TRACE" => Ok(Level::TRACE),
        "DEBUG" => Ok(Level::DEBUG),
        "INFO" => Ok(Level::INFO),
        "WARN" | "WARNING" => Ok(Level::WARN),
        "ERROR" => Ok(Level::ERROR),
        _ => Err(ElviaError::config(format!("Invalid log level: {level_str}"))),
    }
}

/// Context information for log messages
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Component name (e.g., "coordinator", "client")
    pub component: String,

    /// Metering point the messages concern
    pub metering_point_id: Option<String>,

    /// Additional context fields
    pub extra_fields: BTreeMap<String, String>,
}

impl LogContext {
    /// Create a new log context
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            metering_point_id: None,
            extra_fields: BTreeMap::new(),
        }
    }

    /// Set metering point id
    pub fn with_metering_point(mut self, metering_point_id: &str) -> Self {
        self.metering_point_id = Some(metering_point_id.to_string());
        self
    }

    /// Add extra field
    pub fn with_field(mut self, key: &str, value: String) -> Self {
        self.extra_fields.insert(key.to_string(), value);
        self
    }
}

/// Structured logger with context
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    context: LogContext,
}

impl StructuredLogger {
    /// Create a new structured logger with context
    pub const fn new(context: LogContext) -> Self {
        Self { context }
    }

    pub const fn context(&self) -> &LogContext {
        &self.context
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::INFO, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Level::WARN, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Level::ERROR, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::DEBUG, message);
    }

    pub fn trace(&self, message: &str) {
        self.emit(Level::TRACE, message);
    }

    fn emit(&self, level: Level, message: &str) {
        let fields = self.format_fields();
        match level {
            Level::ERROR => error!(%fields, "{message}"),
            Level::WARN => warn!(%fields, "{message}"),
            Level::INFO => info!(%fields, "{message}"),
            Level::DEBUG => debug!(%fields, "{message}"),
            _ => trace!(%fields, "{message}"),
        }
    }

    /// `component=..,mpid=..` followed by extra fields in key order
    fn format_fields(&self) -> String {
        let ctx = &self.context;
        std::iter::once(format!("component={}", ctx.component))
            .chain(ctx.metering_point_id.iter().map(|id| format!("mpid={id}")))
            .chain(ctx.extra_fields.iter().map(|(k, v)| format!("{k}={v}")))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Create a logger for a specific component
pub fn get_logger(component: &str) -> StructuredLogger {
    StructuredLogger::new(LogContext::new(component))
}

/// Create a logger with full context
pub const fn get_logger_with_context(context: LogContext) -> StructuredLogger {
    StructuredLogger::new(context)
}
