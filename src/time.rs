//! Wall-clock reminder times as `HH:MM` strings
//!
//! Hours may drop the leading zero (`7:05`), minutes may not (`7:5` is rejected).

use once_cell::sync::Lazy;
use regex::Regex;

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01]?[0-9]|2[0-3]):([0-5][0-9])$").expect("valid time regex")
});

/// Parse a 24-hour `H:MM` / `HH:MM` string into `(hour, minute)`
pub fn parse_time(text: &str) -> Option<(u32, u32)> {
    let caps = TIME_RE.captures(text.trim())?;
    let hour = caps.get(1)?.as_str().parse().ok()?;
    let minute = caps.get(2)?.as_str().parse().ok()?;
    Some((hour, minute))
}

/// Render as zero-padded `HH:MM`
pub fn format_time(hour: u32, minute: u32) -> String {
    format!("{:02}:{:02}", hour, minute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_minute_of_the_day() {
        for h in 0..24 {
            for m in 0..60 {
                assert_eq!(parse_time(&format_time(h, m)), Some((h, m)));
            }
        }
    }

    #[test]
    fn accepts_single_digit_hour() {
        assert_eq!(parse_time("7:05"), Some((7, 5)));
        assert_eq!(parse_time(" 18:30 "), Some((18, 30)));
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["24:00", "12:60", "1830", "", "9:5", "12.30", "12:30pm", "-1:00", "123:00", "ab:cd"] {
            assert_eq!(parse_time(bad), None, "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn formats_with_padding() {
        assert_eq!(format_time(0, 0), "00:00");
        assert_eq!(format_time(9, 5), "09:05");
        assert_eq!(format_time(23, 59), "23:59");
    }
}
