//! Text helpers for query parameter handling

/// Case-insensitive substring test
///
/// `needle_lower` must already be lower-cased; callers lower-case the
/// search term once per request rather than once per section.
pub fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Parse the leading integer of a string, the way browsers parse query numbers
///
/// Leading whitespace and one sign are accepted, then as many ASCII digits as
/// follow. Returns `None` when no digit is found ("abc", "", "-").
/// "10abc" → 10, " -3" → -3.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Saturate on overflow instead of failing
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}
