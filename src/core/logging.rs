//! Logging initialization
//!
//! Wires the `log` facade to flexi_logger with a single text format. Called
//! once from startup; the handle is parked in a process-wide OnceLock so the
//! logger is not dropped.

use std::path::Path;

static LOGGER_HANDLE: std::sync::OnceLock<std::sync::Mutex<flexi_logger::LoggerHandle>> =
    std::sync::OnceLock::new();

/// Initialize the global logger.
///
/// `level` accepts anything flexi_logger's spec parser does ("info",
/// "debug", "warn,plugdepot=debug", ...); `file` switches output from stderr
/// to the given log file.
pub fn init_logging(
    level: Option<&str>,
    file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    use flexi_logger::{FileSpec, Logger};

    let mut logger = Logger::try_with_str(level.unwrap_or("info"))?.format(line_format);

    if let Some(path) = file {
        logger = logger.log_to_file(FileSpec::try_from(path)?);
    }

    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(std::sync::Mutex::new(handle));

    Ok(())
}

// "YYYY-MM-DD HH:mm:ss.fff INF message"
fn line_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    let level_abbr = match record.level() {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    };

    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr,
        record.args()
    )
}
