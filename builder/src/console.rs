//! Progress messages for verbose runs.

use std::io::Write;

use crate::options::RunOptions;

/// Longest dashed separator line.
pub const MAX_SEPARATOR_WIDTH: usize = 80;

/// Format `message` according to the formatting options.
///
/// With `separator`, a line break and a dashed line as wide as the message
/// (at most [`MAX_SEPARATOR_WIDTH`] bytes) follow it. With `newline`, a
/// trailing line break is added.
///
/// # Examples
///
/// ```
/// use app_builder::console::format_message;
/// use app_builder::options::RunOptions;
///
/// let options = RunOptions { separator: true, ..RunOptions::default() };
/// assert_eq!(format_message("done", &options), "done\n----\n");
/// ```
#[must_use]
pub fn format_message(message: &str, options: &RunOptions) -> String {
    let mut text = message.to_owned();

    if options.separator {
        text.push('\n');
        text.push_str(&"-".repeat(message.len().min(MAX_SEPARATOR_WIDTH)));
    }

    if options.newline {
        text.push('\n');
    }

    text
}

/// Write `message` to `out` when `verbose` is enabled.
pub fn emit(out: &mut dyn Write, message: &str, options: &RunOptions) {
    if !options.verbose {
        return;
    }

    if out
        .write_all(format_message(message, options).as_bytes())
        .and_then(|()| out.flush())
        .is_err()
    {
        // Best-effort output; ignore write failures.
    }
}
