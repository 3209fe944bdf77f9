use std::env;

use dotenvy::dotenv;
use fern::Dispatch;

pub const LOG_FILE: &str = "award_results.log";

pub fn level_from_str(verbosity: &str) -> log::LevelFilter {
    match verbosity.trim().to_uppercase().as_str() {
        "OFF" => log::LevelFilter::Off,
        "ERROR" => log::LevelFilter::Error,
        "WARN" => log::LevelFilter::Warn,
        "DEBUG" => log::LevelFilter::Debug,
        "TRACE" => log::LevelFilter::Trace,
        // default to info
        _ => log::LevelFilter::Info,
    }
}

fn format_line(out: fern::FormatCallback, message: &std::fmt::Arguments, record: &log::Record) {
    out.finish(format_args!(
        "{} [{}][{}] {}",
        chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
        record.target(),
        record.level(),
        message
    ))
}

pub fn setup_logging() -> Result<(), fern::InitError> {
    dotenv().ok();
    let verbosity = env::var("LOGGING_LEVEL").unwrap_or_else(|_| "INFO".to_string());

    let file_logger_config = Dispatch::new()
        .format(format_line)
        .chain(fern::log_file(LOG_FILE)?);

    let stdout_logger_config = Dispatch::new()
        .format(format_line)
        .chain(std::io::stdout());

    Dispatch::new()
        .level(level_from_str(&verbosity))
        .chain(file_logger_config)
        .chain(stdout_logger_config)
        .apply()?;

    Ok(())
}
