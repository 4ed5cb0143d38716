//! Diagnostic logging to disk.
//!
//! The terminal belongs to the UI, so when enabled, `tracing` events go to a
//! daily file named `storefront_<date>.log` in the configured log directory
//! (default: `~/.local/share/storefront/logs/`). Disabled means no subscriber
//! is installed and every event is dropped at the macro.

use crate::config::{expand_home, LoggingConfig};
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;

/// Unknown names fall back to `info`.
pub fn parse_level(name: &str) -> Level {
    name.trim().parse::<Level>().unwrap_or(Level::INFO)
}

pub fn log_file_path(log_dir: &Path, date: chrono::NaiveDate) -> PathBuf {
    log_dir.join(format!("storefront_{}.log", date.format("%Y-%m-%d")))
}

/// Install the global subscriber. Returns the log file in use, if any.
pub fn init(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    if !config.enabled {
        return Ok(None);
    }

    let log_dir = expand_home(&config.log_dir);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let path = log_file_path(&log_dir, chrono::Local::now().date_naive());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(parse_level(&config.level))
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("A tracing subscriber is already installed")?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("Error"), Level::ERROR);
        assert_eq!(parse_level(""), Level::INFO);
        assert_eq!(parse_level("chatty"), Level::INFO);
    }

    #[test]
    fn test_daily_file_name() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            log_file_path(Path::new("/var/log/storefront"), date),
            PathBuf::from("/var/log/storefront/storefront_2024-03-09.log")
        );
    }

    #[test]
    fn test_disabled_installs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            enabled: false,
            log_dir: dir.path().display().to_string(),
            level: "debug".to_string(),
        };
        assert_eq!(init(&config).unwrap(), None);
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
