use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger, LoggerBuilder};

use crate::config::{Config, LogLevel};

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

/// Configured level, raised to `Debug` when `verbose` is set. `Warn` without a `[log]` section.
pub fn effective_level(config: &Config, verbose: bool) -> Level {
    let configured = config.log.as_ref().map_or(LogLevel::Warn, |log| log.level);
    if verbose && (configured as u8) < (LogLevel::Debug as u8) {
        Level::Debug
    } else {
        configured.into()
    }
}

// Reports go to stdout, so every log line goes to stderr
fn add_console_sink(builder: &mut LoggerBuilder) -> spdlog::Result<()> {
    let stderr = Arc::new(StdStreamSink::builder()
        .std_stream(StdStream::Stderr)
        .level_filter(LevelFilter::All)
        .build()?);

    builder.sink(stderr);

    Ok(())
}

pub fn configure_logger(config: &Config, verbose: bool) -> spdlog::Result<()> {
    let level = effective_level(config, verbose);

    let mut builder = Logger::builder();

    match config.log {
        Some(ref log) => {
            if let Some(ref location) = log.location {
                let daily_sink = Arc::new(RotatingFileSink::builder()
                    .base_path(location)
                    .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
                    .max_files(60)
                    .rotate_on_open(false)
                    .build()?);
                builder.sink(daily_sink);
            }

            if log.log_to_console || log.location.is_none() {
                add_console_sink(&mut builder)?;
            }
        }
        None => add_console_sink(&mut builder)?,
    }

    let logger = Arc::new(builder.build()?);
    logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Info));
    logger.set_flush_period(Some(Duration::from_secs(2)));
    logger.set_level_filter(LevelFilter::MoreSevereEqual(level));

    spdlog::set_default_logger(logger);

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::Log;

    use super::*;

    #[test]
    fn test_effective_level() {
        let mut config = Config::default();
        assert_eq!(effective_level(&config, false), Level::Warn);
        assert_eq!(effective_level(&config, true), Level::Debug);

        config.log = Some(Log { level: LogLevel::Trace, log_to_console: true, location: None });
        assert_eq!(effective_level(&config, true), Level::Trace);

        config.log = Some(Log { level: LogLevel::Error, log_to_console: true, location: None });
        assert_eq!(effective_level(&config, false), Level::Error);
        assert_eq!(effective_level(&config, true), Level::Debug);
    }
}
