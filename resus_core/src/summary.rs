//! Plain-text summary export of a session.
//!
//! Produces the clipboard text: a header with the total arrest time
//! and one `[MM:SS] message` line per event in chronological order.

use crate::EventLog;

/// Format a number of seconds as `MM:SS`, clamped at zero.
pub fn format_clock(seconds: f64) -> String {
    let time = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", time / 60, time % 60)
}

/// Render the full event summary for clipboard export.
pub fn render(total_time: f64, events: &EventLog) -> String {
    let mut out = String::new();
    out.push_str("eResus Event Summary\n");
    out.push_str(&format!("Total Arrest Time: {}\n", format_clock(total_time)));
    out.push_str("\n--- Event Log ---\n");
    for event in events.chronological() {
        out.push_str(&format!(
            "[{}] {}\n",
            format_clock(event.timestamp),
            event.message
        ));
    }
    out.trim_end().to_string()
}
