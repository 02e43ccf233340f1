//! Output and tracing setup for the CLI

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{registry, Layer};

/// Log level for CLI output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Suppress all output
    Quiet,
    /// Normal output level
    Normal,
    /// Verbose output with additional details
    Verbose,
}

impl LogLevel {
    /// Level from the `--quiet` / `--verbose` flags; quiet wins
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            LogLevel::Quiet
        } else if verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }

    /// Most detailed tracing level shown at this output level
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Quiet => LevelFilter::ERROR,
            LogLevel::Normal => LevelFilter::INFO,
            LogLevel::Verbose => LevelFilter::DEBUG,
        }
    }
}

/// Install a stderr fmt subscriber filtered by `level`
///
/// A second call in the same process leaves the first subscriber in place.
pub fn init_tracing(level: LogLevel) {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(level.filter());
    let _ = registry().with(layer).try_init();
}

/// Print a message if the current level permits it
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level != LogLevel::Quiet && (level == required || required == LogLevel::Normal) {
        println!("{msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(LogLevel::from_flags(false, false), LogLevel::Normal);
        assert_eq!(LogLevel::from_flags(false, true), LogLevel::Verbose);
        assert_eq!(LogLevel::from_flags(true, true), LogLevel::Quiet);
    }

    #[test]
    fn test_filter() {
        assert_eq!(LogLevel::Quiet.filter(), LevelFilter::ERROR);
        assert_eq!(LogLevel::Normal.filter(), LevelFilter::INFO);
        assert_eq!(LogLevel::Verbose.filter(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing(LogLevel::Quiet);
        init_tracing(LogLevel::Verbose);
    }
}
