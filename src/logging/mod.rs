//! Structured logging configuration for ZoneRS

use std::str::FromStr;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration, read from `ZONERS_LOG_*` environment variables
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// File path for file output
    pub file_path: Option<String>,
    /// Include source file and line numbers
    pub include_source: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// Human-readable format for development
    Pretty,
    /// Compact format for production
    Compact,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogOutput {
    Stdout,
    File,
}

impl FromStr for LogOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdout" => Ok(LogOutput::Stdout),
            "file" => Ok(LogOutput::File),
            _ => Err(format!("Invalid log output: {}", s)),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            output: LogOutput::Stdout,
            file_path: None,
            include_source: false,
        }
    }
}

impl LogConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("ZONERS_LOG_LEVEL") {
            if let Ok(parsed) = LogLevel::from_str(&level) {
                config.level = parsed;
            }
        }

        if let Ok(format) = std::env::var("ZONERS_LOG_FORMAT") {
            if let Ok(parsed) = LogFormat::from_str(&format) {
                config.format = parsed;
            }
        }

        if let Ok(output) = std::env::var("ZONERS_LOG_OUTPUT") {
            if let Ok(parsed) = LogOutput::from_str(&output) {
                config.output = parsed;
            }
        }

        if let Ok(file_path) = std::env::var("ZONERS_LOG_FILE") {
            config.file_path = Some(file_path);
        }

        if let Ok(include_source) = std::env::var("ZONERS_LOG_SOURCE") {
            config.include_source = include_source.to_lowercase() == "true";
        }

        config
    }
}

/// Initialize the global tracing subscriber with the given configuration
pub fn init_logging(config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = create_filter(config);

    match (&config.output, &config.file_path) {
        (LogOutput::Stdout, _) => {
            let layer = create_layer(config, None)?;
            tracing_subscriber::registry()
                .with(layer.with_filter(filter))
                .init();
        }
        (LogOutput::File, Some(file_path)) => {
            let layer = create_layer(config, Some(file_path))?;
            tracing_subscriber::registry()
                .with(layer.with_filter(filter))
                .init();
        }
        (LogOutput::File, None) => {
            return Err("File path required for file output".into());
        }
    }

    info!("Logging initialized with config: {:?}", config);
    Ok(())
}

fn create_filter(config: &LogConfig) -> EnvFilter {
    let base_level = match config.level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    };

    // RUST_LOG wins over the configured level when set.
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("zoners={}", base_level)))
}

fn create_layer(
    config: &LogConfig,
    file_path: Option<&str>,
) -> Result<Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>, Box<dyn std::error::Error>>
{
    macro_rules! build {
        ($layer:expr) => {{
            let layer = $layer
                .with_timer(UtcTime::rfc_3339())
                .with_file(config.include_source)
                .with_line_number(config.include_source);
            match file_path {
                Some(path) => {
                    let file = std::fs::OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(path)?;
                    Box::new(layer.with_writer(file)) as Box<dyn Layer<_> + Send + Sync>
                }
                None => Box::new(layer) as Box<dyn Layer<_> + Send + Sync>,
            }
        }};
    }

    Ok(match config.format {
        LogFormat::Pretty => build!(fmt::layer().pretty()),
        LogFormat::Compact => build!(fmt::layer().compact()),
        LogFormat::Json => build!(fmt::layer().json()),
    })
}
