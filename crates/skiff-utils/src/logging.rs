/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Skiff Logging Module
//!
//! A process-wide logger behind the `log` facade, shared by every Skiff binary.
//!
//! ## Usage
//!
//! ```
//! use skiff_utils::logging::{self, prelude::*};
//!
//! logging::init("info").expect("Failed to initialize logger");
//! info!("start handle deployments...");
//! ```
//!
//! Lines are written to stderr, either as human-readable text
//! (`2025-01-01 12:00:00 - INFO: message`) or as one JSON object per line.
//! The level can be changed after initialization with [`update_log_level`].
//! Unknown level names fall back to `info`.

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

pub use log::{debug, error, info, trace, warn};

static LOGGER: SkiffLogger = SkiffLogger;
static CURRENT_LEVEL: AtomicUsize = AtomicUsize::new(LevelFilter::Info as usize);
static FORMAT: AtomicU8 = AtomicU8::new(LogFormat::Text as u8);
static INIT: OnceCell<Result<(), String>> = OnceCell::new();

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LogFormat {
    Text = 0,
    Json = 1,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl LogFormat {
    fn current() -> Self {
        match FORMAT.load(Ordering::Relaxed) {
            1 => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Logger installed by [`init`].
pub struct SkiffLogger;

impl log::Log for SkiffLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= current_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = match LogFormat::current() {
            LogFormat::Json => json_line(record),
            LogFormat::Text => text_line(record),
        };
        eprintln!("{}", line);
    }

    fn flush(&self) {}
}

fn text_line(record: &Record) -> String {
    format!(
        "{} - {}: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.args()
    )
}

fn json_line(record: &Record) -> String {
    serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "level": record.level().to_string().to_lowercase(),
        "target": record.target(),
        "message": record.args().to_string(),
        "module": record.module_path(),
        "file": record.file(),
        "line": record.line()
    })
    .to_string()
}

/// Initializes logging with text output at the given level.
pub fn init(level: &str) -> Result<(), SetLoggerError> {
    init_with_format(level, "text")
}

/// Initializes logging at `level` with `format` ("text" or "json").
///
/// Installing the logger happens once per process; later calls only change
/// the level and format. An unknown format is treated as text.
pub fn init_with_format(level: &str, format: &str) -> Result<(), SetLoggerError> {
    let installed = INIT.get_or_init(|| {
        log::set_logger(&LOGGER)
            .map(|()| log::set_max_level(LevelFilter::Trace))
            .map_err(|e| e.to_string())
    });
    if installed.is_err() {
        // Another logger owns the facade; surface the original error kind.
        log::set_logger(&LOGGER)?;
    }

    let format = format.parse().unwrap_or(LogFormat::Text);
    FORMAT.store(format as u8, Ordering::Relaxed);
    store_level(parse_level(level));
    Ok(())
}

/// Changes the active log level.
pub fn update_log_level(level: &str) {
    store_level(parse_level(level));
}

/// Maps a level name onto a filter, defaulting to `Info`.
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

fn store_level(level: LevelFilter) {
    CURRENT_LEVEL.store(level as usize, Ordering::Relaxed);
    log::set_max_level(level);
}

fn current_level() -> LevelFilter {
    match CURRENT_LEVEL.load(Ordering::Relaxed) {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub mod prelude {
    pub use log::{debug, error, info, trace, warn};
}
