// A tiny logger for the `log` crate that writes to stderr. Levels are
// filtered globally via `log::set_max_level`, so there's nothing to
// configure here beyond the time zone used for timestamps.

use std::{
    path::{Path, PathBuf},
    sync::{LazyLock, Mutex},
};

use {jiff::tz::TimeZone, log::Log};

use crate::style::Theme;

#[derive(Debug)]
pub struct Logger {
    tz: Mutex<Option<TimeZone>>,
}

impl Logger {
    /// Create a new stderr logger and install it as the global logger.
    ///
    /// Timestamps are in UTC until `Logger::set_time_zone` is called.
    pub fn init() -> Result<&'static Logger, log::SetLoggerError> {
        let logger = Box::leak(Box::new(Logger { tz: Mutex::new(None) }));
        log::set_logger(logger)?;
        Ok(logger)
    }

    pub fn set_time_zone(&self, tz: TimeZone) {
        *self.tz.lock().unwrap() = Some(tz);
    }

    /// The current time, rendered in the configured time zone.
    ///
    /// This must not log anything itself. So it avoids `Zoned::now()`,
    /// which may go looking for the system time zone.
    fn now(&self) -> String {
        let ts = jiff::Timestamp::now();
        match *self.tz.lock().unwrap() {
            Some(ref tz) => ts.to_zoned(tz.clone()).to_string(),
            None => ts.to_string(),
        }
    }
}

impl Log for Logger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let now = Theme::stderr().highlight(self.now());
        let level = record.level();
        let location = match (record.file(), record.line()) {
            (Some(file), Some(line)) => {
                format!("|{}:{line}", relative(file))
            }
            (Some(file), None) => format!("|{}", relative(file)),
            _ => String::new(),
        };
        eprintln!("{now}|{level}{location}: {}", record.args());
    }

    fn flush(&self) {}
}

fn relative(path: &str) -> &str {
    static CWD: LazyLock<Option<PathBuf>> =
        LazyLock::new(|| std::env::current_dir().ok());

    let Some(cwd) = CWD.as_deref() else { return path };
    Path::new(path)
        .strip_prefix(cwd)
        .ok()
        .and_then(|relative| relative.to_str())
        .unwrap_or(path)
}
