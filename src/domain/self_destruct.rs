use thiserror::Error;

/// Timer choices offered by the composer. `None` turns the timer off.
pub const SELF_DESTRUCT_OPTIONS: [(Option<u32>, &str); 7] = [
    (None, "Off"),
    (Some(5), "5 seconds"),
    (Some(30), "30 seconds"),
    (Some(60), "1 minute"),
    (Some(300), "5 minutes"),
    (Some(3600), "1 hour"),
    (Some(86400), "24 hours"),
];

/// Short badge for a message carrying a self-destruct hint, e.g. `30s`, `5m`.
pub fn badge(seconds: u32) -> String {
    match seconds {
        s if s >= 86400 && s % 86400 == 0 => format!("{}d", s / 86400),
        s if s >= 3600 && s % 3600 == 0 => format!("{}h", s / 3600),
        s if s >= 60 && s % 60 == 0 => format!("{}m", s / 60),
        s => format!("{s}s"),
    }
}

/// Label of the matching option, if `seconds` is one of the offered choices.
pub fn option_label(seconds: Option<u32>) -> Option<&'static str> {
    SELF_DESTRUCT_OPTIONS
        .iter()
        .find(|(value, _)| *value == seconds)
        .map(|(_, label)| *label)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported self-destruct timer `{0}`; choose off or one of {offered}", offered = offered_seconds())]
pub struct UnsupportedTimer(pub String);

/// Accepts only the offered timer lengths.
pub fn check(seconds: u32) -> Result<u32, UnsupportedTimer> {
    match option_label(Some(seconds)) {
        Some(_) => Ok(seconds),
        None => Err(UnsupportedTimer(seconds.to_string())),
    }
}

/// Parses `off` or a second count from the offered choices.
pub fn parse_choice(raw: &str) -> Result<Option<u32>, UnsupportedTimer> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    let seconds = raw
        .parse::<u32>()
        .map_err(|_| UnsupportedTimer(raw.to_owned()))?;
    check(seconds).map(Some)
}

fn offered_seconds() -> String {
    SELF_DESTRUCT_OPTIONS
        .iter()
        .filter_map(|(seconds, _)| *seconds)
        .map(|seconds| seconds.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_uses_largest_whole_unit() {
        assert_eq!(badge(5), "5s");
        assert_eq!(badge(90), "90s");
        assert_eq!(badge(300), "5m");
        assert_eq!(badge(3600), "1h");
        assert_eq!(badge(86400), "1d");
    }

    #[test]
    fn option_labels_cover_off_and_offered_values() {
        assert_eq!(option_label(None), Some("Off"));
        assert_eq!(option_label(Some(60)), Some("1 minute"));
        assert_eq!(option_label(Some(42)), None);
    }

    #[test]
    fn check_rejects_lengths_that_are_not_offered() {
        assert_eq!(check(30), Ok(30));

        let error = check(42).expect_err("42 seconds is not offered");

        assert_eq!(
            error.to_string(),
            "unsupported self-destruct timer `42`; choose off or one of 5, 30, 60, 300, 3600, 86400"
        );
    }

    #[test]
    fn parse_choice_accepts_off_and_offered_seconds() {
        assert_eq!(parse_choice("off"), Ok(None));
        assert_eq!(parse_choice(" 3600 "), Ok(Some(3600)));
        assert!(parse_choice("soon").is_err());
        assert!(parse_choice("7").is_err());
    }
}
