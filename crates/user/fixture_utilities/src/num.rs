//! Lenient integer parsing for command-line operands.

/// Parses the leading integer of `s`, the way C `atoi` does.
///
/// Leading ASCII whitespace is skipped, then an optional `+` or `-`, then as
/// many decimal digits as follow. Anything after the digits is ignored. Input
/// without digits yields `0`, and values outside `i32` saturate.
#[must_use]
pub fn parse_int_lossy(s: &str) -> i32 {
    let s = s.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b');
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for d in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value * 10 + i64::from(d - b'0');
        if value > i64::from(i32::MAX) + 1 {
            break;
        }
    }
    if negative {
        value = -value;
    }

    i32::try_from(value).unwrap_or(if negative { i32::MIN } else { i32::MAX })
}
