use chrono::{DateTime, NaiveDate, Utc};

/// Sidebar timestamp: `now`, `5m`, `3h`, `2d`, then `Mar 4`.
pub fn relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let minutes = elapsed.num_minutes();

    if minutes < 1 {
        "now".to_owned()
    } else if minutes < 60 {
        format!("{minutes}m")
    } else if elapsed.num_hours() < 24 {
        format!("{}h", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d", elapsed.num_days())
    } else {
        at.format("%b %-d").to_string()
    }
}

pub fn clock(at: DateTime<Utc>) -> String {
    at.format("%H:%M").to_string()
}

pub fn date_label(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}
