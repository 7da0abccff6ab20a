//! Leveled console output for the workspace binaries.
//!
//! Everything here writes to stderr so that stdout stays reserved for a
//! command's actual result. Each line of a multi-line message gets its own
//! colored level prefix.
//!
//! ## Usage
//!
//! Functions: `info()`, `warn()`, `error()`, `banner()`
//!
//! Macros taking `format!` arguments: `info!`, `warn!`, `error!`
//!
//! Diagnostics from library code go through `tracing`; call
//! [`init_tracing`] once at startup to route them to stderr.

use colored::*;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Severity of a console message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Info,
  Warn,
  Error,
}

impl Level {
  fn tag(self) -> &'static str {
    match self {
      Level::Info => "info",
      Level::Warn => "warn",
      Level::Error => "error",
    }
  }

  fn color(self) -> Color {
    match self {
      Level::Info => Color::Blue,
      Level::Warn => Color::Yellow,
      Level::Error => Color::Red,
    }
  }
}

/// Write raw lines to stderr
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

/// Colored `[tag]` prefix padded so message bodies line up
pub fn prefix(level: Level) -> String {
  let tag = level.tag();
  format!("[{}]{:<width$}", tag.color(level.color()).bold(), "", width = 7 - tag.len() - 2)
}

/// Prefix every line of `message` with `level` and write it to stderr
pub fn emit(level: Level, message: &str) {
  let prefix = prefix(level);
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

/// General information
pub fn info(message: &str) {
  emit(Level::Info, message);
}

/// Something needs attention but the command can continue
pub fn warn(message: &str) {
  emit(Level::Warn, message);
}

/// Something went wrong
pub fn error(message: &str) {
  emit(Level::Error, message);
}

/// Frame `body` between two rules of `width` characters, with `title` on the top rule
pub fn framed(title: &str, body: &str, width: usize) -> String {
  let title = format!(" {title} ");
  let fill = width.saturating_sub(title.len());
  let left = fill / 2;
  let top = format!("{}{}{}", "=".repeat(left), title, "=".repeat(fill - left));
  let bottom = "=".repeat(width.max(title.len()));
  format!("{top}\n{body}\n{bottom}")
}

/// Write a framed block to stderr, rules in bold blue
pub fn banner(title: &str, body: &str) {
  let framed = framed(title, body, 60);
  let mut lines: Vec<&str> = framed.lines().collect();
  let bottom = lines.pop().unwrap_or_default();
  let top = if lines.is_empty() { "" } else { lines.remove(0) };

  log(&top.blue().bold().to_string());
  for line in lines {
    eprintln!("{line}");
  }
  log(&bottom.blue().bold().to_string());
}

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `verbose_filter` is used when
/// `verbose` is on and `quiet_filter` when it is off. Calling this more
/// than once is a no-op.
pub fn init_tracing(verbose: bool, verbose_filter: &str, quiet_filter: &str) {
  let fallback = if verbose { verbose_filter } else { quiet_filter };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

  let _ = tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .with(filter)
    .try_init();
}

/// Macros for coverage-excluded logging - these expand with LCOV_EXCL_LINE at call sites
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => {
    $crate::info(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($($arg:tt)*) => {
    $crate::warn(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => {
    $crate::error(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_prefix_contains_tag() {
    colored::control::set_override(false);
    assert_eq!(prefix(Level::Info), "[info] ");
    assert_eq!(prefix(Level::Warn), "[warn] ");
    assert_eq!(prefix(Level::Error), "[error]");
  }

  #[test]
  fn test_framed_centers_title() {
    let framed = framed("prompt", "line one\nline two", 20);
    let lines: Vec<&str> = framed.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "====== prompt ======");
    assert_eq!(lines[1], "line one");
    assert_eq!(lines[3], "=".repeat(20));
  }

  #[test]
  fn test_framed_title_wider_than_width() {
    let framed = framed("a very long title", "", 4);
    let top = framed.lines().next().unwrap();
    assert_eq!(top, " a very long title ");
  }
}
