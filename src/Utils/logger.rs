//! Logger set-up for programs using the crate.
//!
//! The library itself only emits records through the `log` facade:
//! `info!` when a ring with a dependent variable is built, `warn!` for bounds given in the wrong
//! order, `debug!` for O-term inflation, Taylor remainder constants and rounding, `trace!` for
//! every merge of two summands. Call `init_logger` once at the start of a program to see them.
use std::fs::File;
use std::io;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

/// Installs a terminal logger and, if `log_file` is given, a logger writing into that file.
/// A logger installed earlier stays in place; `Ok(false)` reports that case.
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> io::Result<bool> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(path)?));
    }
    Ok(CombinedLogger::init(loggers).is_ok())
}

/// "trace", "debug", "info", "warn", "error" or "off"
pub fn level_from_str(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asymptotic::ring::{RingOptions, asymptotic_ring_with_dependent_variable};
    use num::{BigInt, BigRational};

    #[test]
    fn test_level_from_str() {
        assert_eq!(level_from_str("Debug"), Some(LevelFilter::Debug));
        assert_eq!(level_from_str(" off "), Some(LevelFilter::Off));
        assert_eq!(level_from_str("verbose"), None);
    }

    #[test]
    fn test_init_logger_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("asymptotics.log");
        // no other test installs a logger
        assert!(init_logger(LevelFilter::Info, Some(&path)).unwrap());
        let half = BigRational::new(BigInt::from(1), BigInt::from(2));
        let built = asymptotic_ring_with_dependent_variable(
            "n^QQ",
            "k",
            BigRational::from_integer(BigInt::from(0)),
            half,
            RingOptions::default(),
        );
        assert!(built.is_ok());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("asymptotic ring <n^QQ> with"), "{}", written);
        assert!(written.contains("INFO"), "{}", written);
    }
}
