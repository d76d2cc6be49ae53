//! Console logger.
//!
//! Routes `log` records from the engine to the browser console, picking the
//! console method that matches the record level.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;
use web_sys::console;

const PREFIX: &str = "quarterturn";

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = JsValue::from_str(&format_record(record.level(), record.args()));
        match record.level() {
            Level::Error => console::error_1(&message),
            Level::Warn => console::warn_1(&message),
            Level::Info => console::info_1(&message),
            Level::Debug | Level::Trace => console::debug_1(&message),
        }
    }

    fn flush(&self) {}
}

fn format_record(level: Level, args: &std::fmt::Arguments) -> String {
    match level {
        Level::Info => format!("{PREFIX}: {args}"),
        _ => format!("{PREFIX} [{level}]: {args}"),
    }
}

/// Install the console logger and set the maximum level.
///
/// Installing twice is harmless: the logger stays, only the level changes.
pub(crate) fn install(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_info_has_no_level_tag() {
        let text = format_record(Level::Info, &format_args!("selected {}", "a.jpg"));
        assert_eq!(text, "quarterturn: selected a.jpg");
    }

    #[test]
    fn test_format_error_has_level_tag() {
        let text = format_record(Level::Error, &format_args!("failed"));
        assert_eq!(text, "quarterturn [ERROR]: failed");
    }
}
