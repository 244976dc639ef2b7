use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static DATE_GROUPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,4})[/-](\d{1,2})[/-](\d{2,4})").expect("valid regex"));

/// Parses dates as they arrive from exported spreadsheets.
///
/// Tries strict ISO `YYYY-MM-DD` first, then a three-group heuristic:
/// a 4-digit first group means `Y-M-D`; a middle group above 12 means
/// `D/M/Y`; a first group above 12 means `D/M/Y`; anything else defaults to
/// `M/D/Y`. That default is lossy for dates where day and month are both
/// <= 12 (`"03/04/2024"`); the ambiguity is inherited from the upstream
/// export and deliberately kept.
///
/// Two-digit years below 70 map to 2000+YY, the rest to 1900+YY.
pub fn parse_flexible(value: &str) -> Option<NaiveDate> {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '"' | '\u{201c}' | '\u{201d}'))
        .collect();
    let s = cleaned.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    let caps = DATE_GROUPS.captures(s)?;
    let a: i32 = caps[1].parse().ok()?;
    let b: i32 = caps[2].parse().ok()?;
    let mut c: i32 = caps[3].parse().ok()?;

    if c < 100 {
        c += if c < 70 { 2000 } else { 1900 };
    }

    let (year, month, day) = if caps[1].len() == 4 {
        (a, b, c)
    } else if b > 12 || a > 12 {
        // day-first
        (c, b, a)
    } else {
        // month-first default; known-ambiguous
        (c, a, b)
    };

    if let Some(date) =
        NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
    {
        return Some(date);
    }

    // Last resort for strings the heuristic mis-assembled.
    for fmt in ["%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%m-%d-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    None
}
