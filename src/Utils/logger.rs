//! Terminal logger, optionally combined with a log file.
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("cannot create log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("logger already initialised: {0}")]
    AlreadySet(#[from] log::SetLoggerError),
}

/// Installs the global logger: terminal output at `level`, plus `log_file` when given.
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> Result<(), LoggerError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(path)?));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}
