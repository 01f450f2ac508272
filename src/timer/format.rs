use std::time::Duration;

use super::pattern::LinePattern;

/// `[elapsed delta] ` prefix written before the first byte of each line.
pub fn format_line_prefix(elapsed: Duration, delta: f64) -> String {
    format!("[{:4.6} {:2.6}] ", elapsed.as_secs_f64(), delta)
}

/// Final line naming the instant pattern and when it first matched.
pub fn format_instant_report(pattern: &LinePattern, offset: Duration) -> String {
    format!(
        "The instantpat: \"{}\", was matched at {:.6}\n",
        pattern.as_str(),
        offset.as_secs_f64()
    )
}
