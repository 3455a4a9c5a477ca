pub fn format_duration(seconds: i64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if mins > 0 {
        parts.push(format!("{}m", mins));
    }
    if secs > 0 || (days == 0 && hours == 0 && mins == 0) {
        parts.push(format!("{}s", secs));
    }

    parts.join(" ")
}

/// Countdown display, `MM:SS`. Minutes are not wrapped into hours.
pub fn format_clock(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Reads a duration typed by the user.
///
/// Leading digits are taken the way a lenient number field would
/// (`"12min"` is 12). Anything without a positive leading integer falls
/// back to `default`.
pub fn parse_minutes(input: &str, default: u32) -> u32 {
    let digits: String = input
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<u32>() {
        Ok(value) if value > 0 => value,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(60), "1m");
        assert_eq!(format_duration(3661), "1h 1m 1s");
        assert_eq!(format_duration(86400 + 3600 + 60 + 1), "1d 1h 1m 1s");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(25 * 60), "25:00");
        assert_eq!(format_clock(90 * 60 + 5), "90:05");
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("30", 25), 30);
        assert_eq!(parse_minutes("  45", 25), 45);
        assert_eq!(parse_minutes("12min", 25), 12);
        assert_eq!(parse_minutes("", 25), 25);
        assert_eq!(parse_minutes("abc", 5), 5);
        assert_eq!(parse_minutes("0", 5), 5);
        assert_eq!(parse_minutes("-10", 5), 5);
        assert_eq!(parse_minutes("99999999999", 25), 25);
    }
}
