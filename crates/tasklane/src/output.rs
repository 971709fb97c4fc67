//! Output helpers for CLI commands.
//!
//! Commands print either human-readable text or pretty JSON. Terminal
//! styling comes from the environment, following the `NO_COLOR` convention.

use crate::render::RenderOptions;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

/// Output mode for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Terminal styling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only glyphs instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading environment variables.
    ///
    /// Reads:
    /// - `TASKLANE_ASCII`: "1" or "true" for ASCII-only glyphs (default: false)
    /// - `NO_COLOR`: any value disables colors
    /// - `TASKLANE_COLOR`: "0" or "false" disables colors (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        let use_ascii = match env::var("TASKLANE_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "TASKLANE_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TASKLANE_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Copy the styling settings into render options.
    pub fn apply(&self, options: &mut RenderOptions) {
        options.use_ascii = self.use_ascii;
        options.use_colors = self.use_colors;
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Print a value as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an I/O error if serialization or writing fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

pub(crate) fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(w, "{json}")
}
