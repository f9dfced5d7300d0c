/// Token styling helpers.
///
/// The `t` module stands for "tokens". Use these helpers to style
/// specific values inside info messages consistently across the CLI.
pub mod t {
  use std::fmt::Display;

  use owo_colors::OwoColorize as _;

  pub fn package(name: impl Display) -> String {
    format!("{}", name.to_string().magenta())
  }

  pub fn version(v: impl Display) -> String {
    format!("{}", v.to_string().blue())
  }

  pub fn ok(s: impl Display) -> String {
    format!("{}", s.to_string().green())
  }

  pub fn warn(s: impl Display) -> String {
    format!("{}", s.to_string().yellow())
  }

  pub fn err(s: impl Display) -> String {
    format!("{}", s.to_string().red())
  }
}

// Routed console output: when a sink is set, macros emit events to it; otherwise print.
// info = neutral, success/warn/error = full-line tint.

use crossbeam_channel::Sender;
use parking_lot::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
  Info,
  Success,
  Warn,
  Error,
}

/// A single console line preserving ANSI styling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEvent {
  pub level: LogLevel,
  pub ansi: String,
}

static SINK: Mutex<Option<Sender<LogEvent>>> = Mutex::new(None);

pub fn set_log_sink(sender: Sender<LogEvent>) {
  *SINK.lock() = Some(sender);
}

pub fn clear_log_sink() {
  *SINK.lock() = None;
}

pub(crate) fn emit(level: LogLevel, text: String) {
  if let Some(tx) = SINK.lock().clone() {
    let _ = tx.send(LogEvent { level, ansi: text });
  } else {
    match level {
      LogLevel::Info | LogLevel::Success | LogLevel::Warn => anstream::println!("{}", text),
      LogLevel::Error => anstream::eprintln!("{}", text),
    }
  }
}

#[macro_export]
macro_rules! log_info {
  ($fmt:literal $(, $args:expr )* $(,)?) => {{
    $crate::utils::log::emit(
      $crate::utils::log::LogLevel::Info,
      format!($fmt $(, $args )*)
    );
  }};
}

#[macro_export]
macro_rules! log_success {
  ($fmt:literal $(, $args:expr )* $(,)?) => {{
    $crate::utils::log::emit(
      $crate::utils::log::LogLevel::Success,
      $crate::utils::log::t::ok(format!($fmt $(, $args )*))
    );
  }};
}

#[macro_export]
macro_rules! log_warn {
  ($fmt:literal $(, $args:expr )* $(,)?) => {{
    $crate::utils::log::emit(
      $crate::utils::log::LogLevel::Warn,
      $crate::utils::log::t::warn(format!($fmt $(, $args )*))
    );
  }};
}

#[macro_export]
macro_rules! log_error {
  ($fmt:literal $(, $args:expr )* $(,)?) => {{
    $crate::utils::log::emit(
      $crate::utils::log::LogLevel::Error,
      $crate::utils::log::t::err(format!($fmt $(, $args )*))
    );
  }};
}
