//! Logging facilities.
//!
//! Messages are stamped with the simulated time and the name of the component that emits them, the log target is
//! the component name so that `RUST_LOG=scheduler=debug` filters work as expected.

use atty::Stream;
use colored::{Color, ColoredString, Colorize};

/// Applies the color to the string if stderr (log) goes to console.
pub fn get_colored(s: &str, color: Color) -> ColoredString {
    if atty::is(Stream::Stderr) {
        s.color(color)
    } else {
        s.normal()
    }
}

/// Logs a message at the info level.
///
/// # Examples
///
/// ```rust
/// use std::io::Write;
/// use env_logger::Builder;
/// use dslab_lambda::log_info;
///
/// Builder::from_default_env()
///     .format(|buf, record| writeln!(buf, "{}", record.args()))
///     .init();
///
/// log_info!(12.5, "scheduler", "placed {} invocations", 3);
/// ```
#[macro_export]
macro_rules! log_info {
    ($time:expr, $name:expr, $msg:expr) => (
        log::info!(
            target: $name,
            "[{:.3} {}  {}] {}",
            $time, $crate::log::get_colored("INFO", $crate::colored::Color::Green), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::info!(
            target: $name,
            concat!("[{:.3} {}  {}] ", $format),
            $time, $crate::log::get_colored("INFO", $crate::colored::Color::Green), $name, $($arg)+
        )
    );
}

/// Logs a message at the debug level.
///
/// # Examples
///
/// See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_debug {
    ($time:expr, $name:expr, $msg:expr) => (
        log::debug!(
            target: $name,
            "[{:.3} {} {}] {}",
            $time, $crate::log::get_colored("DEBUG", $crate::colored::Color::Blue), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::debug!(
            target: $name,
            concat!("[{:.3} {} {}] ", $format),
            $time, $crate::log::get_colored("DEBUG", $crate::colored::Color::Blue), $name, $($arg)+
        )
    );
}

/// Logs a message at the trace level.
///
/// # Examples
///
/// See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_trace {
    ($time:expr, $name:expr, $msg:expr) => (
        log::trace!(
            target: $name,
            "[{:.3} {} {}] {}",
            $time, $crate::log::get_colored("TRACE", $crate::colored::Color::Cyan), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::trace!(
            target: $name,
            concat!("[{:.3} {} {}] ", $format),
            $time, $crate::log::get_colored("TRACE", $crate::colored::Color::Cyan), $name, $($arg)+
        )
    );
}
