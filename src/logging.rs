//! # Logging
//! src/logging.rs
//!
//! Inicializa el backend de `log` (flexi_logger) una sola vez por proceso.
//!
//! - Sin `--log-dir`: escribe a stderr.
//! - Con `--log-dir`: archivos rotativos de 10 MiB, se conservan 5.
//!
//! Los eventos siguen el formato `event=... module=... status=...`.

use crate::config::Config;
use flexi_logger::{
    detailed_format, Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::info;
use once_cell::sync::OnceCell;
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "books_server";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: Option<PathBuf>,
    _logger: LoggerHandle,
}

/// Inicializa el logging según la configuración
///
/// Llamarla de nuevo con el mismo nivel y directorio no hace nada; con otro
/// nivel u otro directorio retorna error.
pub fn init_logging(config: &Config) -> Result<(), String> {
    let level = normalize_level(&config.log_level)?;
    let log_dir = normalize_log_dir(config.log_dir.as_deref())?;

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(level, log_dir.clone()))?;

    if state.level != level || state.log_dir != log_dir {
        return Err(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            state.level, level
        ));
    }

    Ok(())
}

/// Nivel y directorio activos, si el logging ya fue inicializado
pub fn logging_status() -> Option<(&'static str, Option<PathBuf>)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

fn start_logger(level: &'static str, log_dir: Option<PathBuf>) -> Result<LoggingState, String> {
    let logger = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?;

    let logger = match &log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("failed to create log directory `{}`: {err}", dir.display())
            })?;

            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(detailed_format)
        }
        None => logger.log_to_stderr().format_for_stderr(detailed_format),
    };

    let handle = logger
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    info!(
        "event=app_start module=logging status=ok platform={} version={} level={} output={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|| "stderr".to_string())
    );

    Ok(LoggingState {
        level,
        log_dir,
        _logger: handle,
    })
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(log_dir: Option<&str>) -> Result<Option<PathBuf>, String> {
    match log_dir.map(str::trim) {
        None => Ok(None),
        Some("") => Err("log dir cannot be empty".to_string()),
        Some(dir) => Ok(Some(PathBuf::from(dir))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(normalize_level("loud").unwrap_err().contains("unsupported"));
    }

    #[test]
    fn test_normalize_log_dir() {
        assert_eq!(normalize_log_dir(None).unwrap(), None);
        assert!(normalize_log_dir(Some("  ")).is_err());
        assert_eq!(
            normalize_log_dir(Some(" /tmp/logs ")).unwrap(),
            Some(PathBuf::from("/tmp/logs"))
        );
    }

    // Único test que instala el logger global del binario de tests
    #[test]
    fn test_init_logging_is_idempotent_and_rejects_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.log_dir = Some(dir.path().to_string_lossy().into_owned());

        init_logging(&config).unwrap();
        init_logging(&config).unwrap();

        let (level, log_dir) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(log_dir, Some(dir.path().to_path_buf()));

        config.log_level = "debug".to_string();
        assert!(init_logging(&config).unwrap_err().contains("refusing to switch"));

        config.log_level = "info".to_string();
        config.log_dir = None;
        assert!(init_logging(&config).is_err());
    }
}
