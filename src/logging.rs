//! Tracing subscriber setup
//!
//! Logs go to stderr, or to a file when one is given; stdout is left for the
//! run summary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr as _;

use anyhow::Context as _;
use clap::ValueEnum;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer as _, filter::Directive, prelude::*};

/// Environment variable holding the log filter directives
pub const LOG_FILTER_ENV: &str = "OS_FLOOR_SYNC_LOG";

const DEFAULT_DIRECTIVE: &str = "os_floor_sync=info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global subscriber.
///
/// The returned guard flushes buffered log lines on drop and must be held
/// until the program exits.
pub fn init(format: LogFormat, log_file: Option<&Path>) -> anyhow::Result<WorkerGuard> {
    let (writer, guard) = match log_file {
        Some(path) => {
            let (dir, file_name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {:?}", dir))?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let formatter = match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(log_file.is_none())
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(formatter)
        .with(
            EnvFilter::builder()
                .with_default_directive(Directive::from_str(DEFAULT_DIRECTIVE)?)
                .with_env_var(LOG_FILTER_ENV)
                .from_env_lossy(),
        )
        .try_init()?;

    Ok(guard)
}

fn split_log_path(path: &Path) -> anyhow::Result<(PathBuf, OsString)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path {:?} has no file name", path))?;
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    Ok((dir.to_path_buf(), file_name.to_os_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_log_path_separates_directory_and_file() {
        let (dir, file) = split_log_path(Path::new("/var/log/os-floor-sync/run.log")).unwrap();

        assert_eq!(dir, PathBuf::from("/var/log/os-floor-sync"));
        assert_eq!(file, OsString::from("run.log"));
    }

    #[test]
    fn split_log_path_defaults_to_current_dir() {
        let (dir, file) = split_log_path(Path::new("run.log")).unwrap();

        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, OsString::from("run.log"));
    }

    #[test]
    fn split_log_path_rejects_paths_without_file_name() {
        assert!(split_log_path(Path::new("/")).is_err());
    }

    #[test]
    fn default_directive_parses() {
        assert!(Directive::from_str(DEFAULT_DIRECTIVE).is_ok());
    }
}
