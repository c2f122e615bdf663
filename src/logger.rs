//! A minimal `log` backend that writes to stderr. The level is read from the environment.

use std::env;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Environment variable holding the log level: `off`, `error`, `warn`, `info`, `debug`, or
/// `trace`.
pub static LOG_LEVEL_VAR: &str = "INTCODE_LOG";

static DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

struct StderrLogger;

impl Log for StderrLogger {
  fn enabled(&self, metadata: &Metadata<'_>) -> bool {
    metadata.level() <= log::max_level()
  }

  fn log(&self, record: &Record<'_>) {
    if self.enabled(record.metadata()) {
      eprintln!("[{:5}] {}: {}", record.level(), record.target(), record.args());
    }
  }

  fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Unparseable values fall back to the default level.
fn level_from(value: Option<&str>) -> LevelFilter {
  value
    .and_then(|value| value.trim().parse::<LevelFilter>().ok())
    .unwrap_or(DEFAULT_LEVEL)
}

/// Installs the logger. May only be called once per process.
pub fn init() -> Result<(), SetLoggerError> {
  let level = level_from(env::var(LOG_LEVEL_VAR).ok().as_deref());
  log::set_logger(&LOGGER)?;
  log::set_max_level(level);
  Ok(())
}
