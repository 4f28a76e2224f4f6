//! Logging setup built on flexi_logger
//!
//! Text (default) and JSON formats, with optional color and file output.
//! Only the log level can be changed after initialization; format, file and
//! color choices are fixed for the process lifetime.

static LOGGER_HANDLE: std::sync::OnceLock<std::sync::Mutex<flexi_logger::LoggerHandle>> =
    std::sync::OnceLock::new();

pub fn init_logging(
    log_level: Option<&str>,
    log_format: Option<&str>,
    log_file: Option<&str>,
    color_enabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use flexi_logger::{FileSpec, Logger};

    let level_str = log_level.unwrap_or("info");
    let mut logger = Logger::try_with_str(level_str)?;

    logger = match (log_format, color_enabled) {
        (Some("json"), _) => logger.format(json_format),
        (_, true) => logger.format(text_color_format),
        (_, false) => logger.format(text_format),
    };

    if let Some(file_path) = log_file {
        let file_spec = FileSpec::try_from(std::path::Path::new(file_path))?;
        logger = logger.log_to_file(file_spec);
    }

    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(std::sync::Mutex::new(handle));

    Ok(())
}

/// Change the log level at runtime; other settings are fixed at init time.
pub fn set_log_level(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(handle_mutex) = LOGGER_HANDLE.get() {
        let mut handle = handle_mutex
            .lock()
            .map_err(|_| "Could not acquire logger handle lock")?;
        let _ = handle.parse_and_push_temp_spec(log_level);
        Ok(())
    } else {
        Err("Logger handle not initialised. Call init_logging first.".into())
    }
}

fn level_abbr(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

// Format: "YYYY-MM-DD HH:mm:ss.fff INF message (app/startup.rs:42)"
fn text_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line())
    )
}

fn text_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::*;

    let level_colored = match record.level() {
        log::Level::Error => "ERR".red().bold(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".green(),
        log::Level::Debug => "DBG".blue(),
        log::Level::Trace => "TRC".magenta(),
    };

    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored,
        record.args(),
        format_target_as_path(record.target(), record.line()).dimmed()
    )
}

fn json_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    let json_obj = serde_json::json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_abbr(record.level()),
        "message": record.args().to_string(),
        "target": format_target_as_path(record.target(), record.line()),
    });

    match serde_json::to_string(&json_obj) {
        Ok(json_string) => w.write_all(json_string.as_bytes()),
        Err(_) => w.write_all(b"{\"error\":\"Failed to serialize log message\"}"),
    }
}

// Convert repotags::app::startup -> app/startup.rs:42
fn format_target_as_path(target: &str, line: Option<u32>) -> String {
    let path_like = if let Some(without_prefix) = target.strip_prefix("repotags::") {
        without_prefix.replace("::", "/") + ".rs"
    } else {
        target.replace("::", "/")
    };

    if let Some(line_num) = line {
        format!("{}:{}", path_like, line_num)
    } else {
        path_like
    }
}
