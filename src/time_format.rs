//! Conversions between canonical seconds and user-facing duration text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static UNIT_DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+(?:\.\d+)?|\.\d+)\s*h)?\s*(?:(\d+(?:\.\d+)?|\.\d+)\s*m)?$")
        .expect("invalid unit regex")
});
static BARE_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?|\.\d+)$").expect("invalid number regex"));

/// Bare whole numbers at or above this value are read as minutes.
const BARE_MINUTES_THRESHOLD: f64 = 8.0;

/// How durations are rendered to the user.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// `1h 30m`
    #[default]
    Hm,
    /// `1.5`
    Decimal,
}

/// Renders `seconds` in the given mode.
///
/// `Hm` drops zero components and truncates to whole minutes (`"0h"` when
/// nothing is left). `Decimal` rounds hours to two places and trims trailing
/// zeros; whole values of eight hours or more carry an `h` suffix so they are
/// not read back as minutes by [`parse_formatted_time`].
pub fn format_time(seconds: u64, mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Hm => {
            let hours = seconds / 3600;
            let minutes = (seconds % 3600) / 60;
            match (hours, minutes) {
                (0, 0) => "0h".to_string(),
                (0, m) => format!("{}m", m),
                (h, 0) => format!("{}h", h),
                (h, m) => format!("{}h {}m", h, m),
            }
        }
        DisplayMode::Decimal => {
            let hundredths = (seconds as f64 / 36.0).round() as u64;
            if hundredths == 0 {
                return "0".to_string();
            }
            let whole = hundredths / 100;
            let fraction = hundredths % 100;
            if fraction == 0 {
                if whole as f64 >= BARE_MINUTES_THRESHOLD {
                    format!("{}h", whole)
                } else {
                    whole.to_string()
                }
            } else {
                let digits = format!("{:02}", fraction);
                format!("{}.{}", whole, digits.trim_end_matches('0'))
            }
        }
    }
}

/// Parses user-entered duration text into seconds.
///
/// Accepts `h`/`m` units in any case, `.` or `,` decimals and combinations
/// such as `1h 30m` or `1,5h`; hours come before minutes and the whole text
/// must match. A bare number is hours when it has a decimal part or is below
/// 8, minutes otherwise (`"2"` is two hours, `"45"` is 45 minutes). Anything
/// unparseable yields 0.
pub fn parse_formatted_time(text: &str) -> u64 {
    let normalized = text.trim().to_lowercase().replace(',', ".");
    if normalized.is_empty() {
        return 0;
    }

    if let Some(capture) = UNIT_DURATION_REGEX.captures(&normalized) {
        let hours = capture.get(1).and_then(|value| value.as_str().parse::<f64>().ok());
        let minutes = capture.get(2).and_then(|value| value.as_str().parse::<f64>().ok());
        if hours.is_some() || minutes.is_some() {
            let total = hours.unwrap_or(0.0) * 3600.0 + minutes.unwrap_or(0.0) * 60.0;
            return total.round() as u64;
        }
    }

    if !BARE_NUMBER_REGEX.is_match(&normalized) {
        return 0;
    }
    let Ok(value) = normalized.parse::<f64>() else {
        return 0;
    };
    if normalized.contains('.') || value < BARE_MINUTES_THRESHOLD {
        (value * 3600.0).round() as u64
    } else {
        (value * 60.0).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hm_mode_omits_zero_components() {
        assert_eq!(format_time(0, DisplayMode::Hm), "0h");
        assert_eq!(format_time(59, DisplayMode::Hm), "0h");
        assert_eq!(format_time(1800, DisplayMode::Hm), "30m");
        assert_eq!(format_time(7200, DisplayMode::Hm), "2h");
        assert_eq!(format_time(5400, DisplayMode::Hm), "1h 30m");
        assert_eq!(format_time(5459, DisplayMode::Hm), "1h 30m");
    }

    #[test]
    fn decimal_mode_trims_trailing_zeros() {
        assert_eq!(format_time(0, DisplayMode::Decimal), "0");
        assert_eq!(format_time(5400, DisplayMode::Decimal), "1.5");
        assert_eq!(format_time(900, DisplayMode::Decimal), "0.25");
        assert_eq!(format_time(100, DisplayMode::Decimal), "0.03");
        assert_eq!(format_time(7200, DisplayMode::Decimal), "2");
        assert_eq!(format_time(28800, DisplayMode::Decimal), "8h");
        assert_eq!(format_time(30600, DisplayMode::Decimal), "8.5");
    }

    #[test]
    fn units_are_case_insensitive_and_accept_commas() {
        assert_eq!(parse_formatted_time("1.5h"), 5400);
        assert_eq!(parse_formatted_time("1,5H"), 5400);
        assert_eq!(parse_formatted_time("1h 30m"), 5400);
        assert_eq!(parse_formatted_time("2H15M"), 8100);
        assert_eq!(parse_formatted_time("0.5m"), 30);
        assert_eq!(parse_formatted_time("90m"), 5400);
    }

    #[test]
    fn bare_numbers_follow_hours_or_minutes_heuristic() {
        assert_eq!(parse_formatted_time("2"), 7200);
        assert_eq!(parse_formatted_time("7"), 25200);
        assert_eq!(parse_formatted_time("8"), 480);
        assert_eq!(parse_formatted_time("45"), 2700);
        assert_eq!(parse_formatted_time("12.0"), 43200);
        assert_eq!(parse_formatted_time("0,25"), 900);
        assert_eq!(parse_formatted_time(".5"), 1800);
    }

    #[test]
    fn garbage_resolves_to_zero() {
        assert_eq!(parse_formatted_time(""), 0);
        assert_eq!(parse_formatted_time("   "), 0);
        assert_eq!(parse_formatted_time("soon"), 0);
        assert_eq!(parse_formatted_time("-3"), 0);
        assert_eq!(parse_formatted_time("1.2.3"), 0);
        assert_eq!(parse_formatted_time("-3h"), 0);
        assert_eq!(parse_formatted_time("-1,5h"), 0);
        assert_eq!(parse_formatted_time("1h30"), 0);
        assert_eq!(parse_formatted_time("abc2hxyz"), 0);
        assert_eq!(parse_formatted_time("1.2.3h"), 0);
        assert_eq!(parse_formatted_time("30m 1h"), 0);
        assert_eq!(parse_formatted_time("h"), 0);
    }

    #[test]
    fn hm_round_trip_loses_less_than_a_minute() {
        for seconds in (0..20_000u64).step_by(7) {
            let parsed = parse_formatted_time(&format_time(seconds, DisplayMode::Hm));
            assert!(seconds - parsed < 60, "{seconds} -> {parsed}");
            if seconds % 60 == 0 {
                assert_eq!(parsed, seconds);
            }
        }
    }

    #[test]
    fn decimal_round_trip_matches_rounded_hours() {
        for seconds in (0..40_000u64).step_by(13) {
            let parsed = parse_formatted_time(&format_time(seconds, DisplayMode::Decimal));
            let rounded = (seconds as f64 / 36.0).round() * 36.0;
            assert!((parsed as f64 - rounded).abs() < 1.0, "{seconds} -> {parsed}");
        }
    }

    #[test]
    fn one_round_trip_is_stable() {
        for mode in [DisplayMode::Hm, DisplayMode::Decimal] {
            for seconds in (0..40_000u64).step_by(11) {
                let first = format_time(seconds, mode);
                let again = format_time(parse_formatted_time(&first), mode);
                assert_eq!(first, again, "{seconds} in {mode:?}");
            }
        }
    }

    #[test]
    fn display_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&DisplayMode::Hm).unwrap(), "\"hm\"");
        assert_eq!(
            serde_json::from_str::<DisplayMode>("\"decimal\"").unwrap(),
            DisplayMode::Decimal
        );
    }
}
