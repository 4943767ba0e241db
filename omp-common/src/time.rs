//! Clock-style time formatting for transport display
//!
//! Provides the `m:ss` / `h:mm:ss` formatting used by progress and duration
//! readouts, and the placeholder rendering for not-yet-known durations.

/// Format seconds as a clock-style time string
///
/// Values under one hour render as `m:ss`, values from one hour up render as
/// `h:mm:ss`. Negative or non-finite input renders as `0:00`.
///
/// # Examples
///
/// ```
/// use omp_common::time::format_clock;
///
/// assert_eq!(format_clock(0.0), "0:00");
/// assert_eq!(format_clock(65.0), "1:05");
/// assert_eq!(format_clock(3661.0), "1:01:01");
/// ```
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Format an optional duration, rendering a placeholder while unknown
///
/// The transport shows `--:--` rather than an ambiguous `0:00` until the
/// media element reports real metadata.
pub fn format_clock_or_placeholder(seconds: Option<f64>) -> String {
    match seconds {
        Some(secs) => format_clock(secs),
        None => "--:--".to_string(),
    }
}

/// Convert seconds to whole milliseconds, saturating at zero
pub fn secs_to_ms(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}
