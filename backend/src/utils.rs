use chrono::{DateTime, Utc};

/// "Just now", "5 min ago", "1 hour ago", "3 days ago".
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };

    match secs {
        s if s < 60 => "Just now".to_string(),
        s if s < 3_600 => format!("{} min ago", s / 60),
        s if s < 86_400 => plural(s / 3_600, "hour"),
        s => plural(s / 86_400, "day"),
    }
}

/// Splits fractional hours into whole hours and rounded minutes (4.5 -> (4, 30)).
pub fn split_hours(hours: f64) -> (i64, i64) {
    let whole = hours.floor();
    let mut minutes = ((hours - whole) * 60.0).round() as i64;
    let mut whole = whole as i64;
    if minutes == 60 {
        whole += 1;
        minutes = 0;
    }
    (whole, minutes)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
