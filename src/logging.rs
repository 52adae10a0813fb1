use crate::utils::clip_width;
use crate::{BlockData, PreviewError};
use std::fmt::Display;
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt as subscriber_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

#[derive(Debug)]
pub struct LogConfig {
    pub log_dir: PathBuf,
    pub log_level: String,
    pub console_output: bool,
    pub file_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".into(),
            log_level: "info".into(),
            console_output: true,
            file_output: true,
        }
    }
}

const CARD_WIDTH: usize = 80;
const CONTENT_WIDTH: usize = CARD_WIDTH - 2;

fn create_separator(width: usize, ch: char) -> String {
    std::iter::repeat_n(ch, width).collect()
}

/// Boxed multi-line summary of a block's saved data.
pub fn format_block_card(data: &BlockData) -> String {
    let field = |label: &str, value: Option<&str>| {
        let value = value.filter(|v| !v.is_empty()).unwrap_or("N/A");
        format!("{label}: {}", clip_width(value, CONTENT_WIDTH - label.len() - 2))
    };

    let horizontal_line = create_separator(CARD_WIDTH - 2, '═');

    [
        format!("╔{horizontal_line}╗"),
        field("Link", Some(data.link.as_str())),
        field("Title", data.meta.title.as_deref()),
        field("Desc", data.meta.description.as_deref()),
        field("Image", data.meta.image_url()),
        format!("╚{horizontal_line}╝"),
    ]
    .join("\n")
}

pub fn log_block_card(data: &BlockData) {
    info!("\n{}", format_block_card(data));
}

pub fn log_error_card<E: Display + std::error::Error>(url: &str, error: &E) {
    const ERROR_CARD_WIDTH: usize = 70;
    const ERROR_CONTENT_WIDTH: usize = ERROR_CARD_WIDTH - 8;

    let top_bottom = create_separator(ERROR_CARD_WIDTH - 2, '═');
    let middle = create_separator(ERROR_CARD_WIDTH - 2, '─');

    let mut error_details = error.to_string();
    if let Some(source) = error.source() {
        error_details = format!("{error_details} (cause: {source})");
    }

    error!(
        "\n╔═{}═╗\n\
         ║ URL: {:<width$} ║\n\
         ║{}║\n\
         ║ Error: {:<width$} ║\n\
         ╚═{}═╝",
        top_bottom,
        clip_width(url, ERROR_CONTENT_WIDTH),
        middle,
        clip_width(&error_details, ERROR_CONTENT_WIDTH),
        top_bottom,
        width = ERROR_CONTENT_WIDTH
    );
}

pub fn setup_logging(config: LogConfig) -> Result<(), PreviewError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let mut layers = Vec::new();

    if config.console_output {
        let console_layer = subscriber_fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .pretty();
        layers.push(console_layer.boxed());
    }

    if config.file_output {
        std::fs::create_dir_all(&config.log_dir).map_err(|e| {
            PreviewError::LoggingError(format!(
                "failed to create log directory {}: {e}",
                config.log_dir.display()
            ))
        })?;

        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "link-preview.log");

        let file_layer = subscriber_fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_writer(file_appender);

        layers.push(file_layer.boxed());
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .map_err(|e| PreviewError::LoggingError(e.to_string()))?;

    debug!("Logging system initialized with config: {:?}", config);
    Ok(())
}
