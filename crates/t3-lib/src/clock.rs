//! Wall-clock arithmetic for timetable strings.
//!
//! Providers report times as `HH:MM` (Darwin, Huxley2) or `HHMM` (RTT). All
//! arithmetic here works in minutes since midnight and wraps around midnight
//! the same way the departure boards do.

/// Minutes in a day.
pub const MINUTES_PER_DAY: i32 = 1440;

/// Status words providers use in place of an expected time.
pub const STATUS_ON_TIME: &str = "On time";
pub const STATUS_DELAYED: &str = "Delayed";
pub const STATUS_CANCELLED: &str = "Cancelled";

/// Parse `HH:MM` or `HHMM` into minutes since midnight.
///
/// Returns `None` for status words such as `On time`, empty strings and
/// out-of-range values.
pub fn parse_clock(value: &str) -> Option<i32> {
    let value = value.trim();
    if !value.is_ascii() {
        return None;
    }
    let (hours, minutes) = match value.len() {
        5 if value.as_bytes()[2] == b':' => (&value[0..2], &value[3..5]),
        4 => (&value[0..2], &value[2..4]),
        _ => return None,
    };

    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Strip the colon from a clock string (`10:32` becomes `1032`).
pub fn compact(value: &str) -> String {
    value.replace(':', "")
}

/// Insert a colon into a compact `HHMM` string. Anything else is returned as-is.
pub fn with_colon(value: &str) -> String {
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}:{}", &value[0..2], &value[2..4])
    } else {
        value.to_string()
    }
}

/// Minutes between departure and arrival, crossing midnight when needed.
pub fn journey_minutes(departure: i32, arrival: i32) -> i32 {
    let minutes = arrival - departure;
    if minutes < 0 {
        minutes + MINUTES_PER_DAY
    } else {
        minutes
    }
}

/// Minutes an expected time lags the scheduled one.
///
/// An expected time more than twelve hours "early" is taken to be just after
/// midnight of the following day.
pub fn delay_minutes(scheduled: i32, expected: i32) -> i32 {
    let delay = expected - scheduled;
    if delay < -(MINUTES_PER_DAY / 2) {
        delay + MINUTES_PER_DAY
    } else {
        delay
    }
}

/// Render minutes since midnight as `HHMM`, wrapping negative and next-day values.
pub fn format_hhmm(total_minutes: i32) -> String {
    let hours = total_minutes.div_euclid(60).rem_euclid(24);
    let minutes = total_minutes.rem_euclid(60);
    format!("{:02}{:02}", hours, minutes)
}

/// Expected arrival: the scheduled arrival pushed back by the departure delay.
pub fn eta(arrival: i32, delay: i32) -> String {
    format_hhmm(arrival + delay)
}

/// True for the non-numeric status words that stand in for an expected time.
pub fn is_status_word(value: &str) -> bool {
    matches!(
        value,
        "" | STATUS_ON_TIME | STATUS_DELAYED | STATUS_CANCELLED
    )
}
