//! Parsers for bcache sysfs values.
//!
//! These are pure functions over the text the kernel prints into sysfs
//! attributes. They are designed to be easily testable with string inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Binary unit suffixes printed by the kernel's `bch_hprint`, with their shift.
const BYTE_SUFFIXES: [(char, i32); 8] = [
    ('k', 10),
    ('M', 20),
    ('G', 30),
    ('T', 40),
    ('P', 50),
    ('E', 60),
    ('Z', 70),
    ('Y', 80),
];

/// Parses a human-readable byte size such as `512k`, `2.5G` or `1024`.
///
/// One trailing suffix from `k M G T P E Z Y` selects a power of 1024.
/// The numeric part may be fractional; the product is truncated.
/// Results that do not fit into `u64` saturate.
pub fn parse_byte_size(token: &str) -> Result<u64, ParseError> {
    let token = token.trim();
    let Some(last) = token.chars().last() else {
        return Err(ParseError::new("empty byte size"));
    };

    let (number, shift) = match BYTE_SUFFIXES.iter().find(|(suffix, _)| *suffix == last) {
        Some((_, shift)) => (&token[..token.len() - last.len_utf8()], *shift),
        None => (token, 0),
    };

    let value = parse_float(number)
        .map_err(|_| ParseError::new(format!("invalid byte size '{}'", token)))?;

    Ok((value * 2f64.powi(shift)) as u64)
}

/// Parses a plain unsigned counter such as the content of `cache_hits`.
pub fn parse_counter(token: &str) -> Result<u64, ParseError> {
    let token = token.trim();
    token
        .parse()
        .map_err(|_| ParseError::new(format!("invalid counter '{}'", token)))
}

/// Parses a non-negative finite number.
pub fn parse_float(token: &str) -> Result<f64, ParseError> {
    let token = token.trim();
    let value: f64 = token
        .parse()
        .map_err(|_| ParseError::new(format!("invalid number '{}'", token)))?;

    if !value.is_finite() || value < 0.0 {
        return Err(ParseError::new(format!("out of range number '{}'", token)));
    }
    Ok(value)
}

/// Returns the first line of `content` without trailing whitespace.
///
/// Empty content yields an empty string.
pub fn parse_first_line(content: &str) -> &str {
    content.lines().next().unwrap_or("").trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_byte_size_suffixes() {
        assert_eq!(parse_byte_size("1k").unwrap(), 1024);
        assert_eq!(parse_byte_size("1M").unwrap(), 1_048_576);
        assert_eq!(parse_byte_size("2.5G").unwrap(), 2_684_354_560);
        assert_eq!(parse_byte_size("1T").unwrap(), 1u64 << 40);
        assert_eq!(parse_byte_size("3E").unwrap(), 3u64 << 60);
    }

    #[test]
    fn test_parse_byte_size_plain() {
        assert_eq!(parse_byte_size("0").unwrap(), 0);
        assert_eq!(parse_byte_size("4096").unwrap(), 4096);
        assert_eq!(parse_byte_size("0.0k").unwrap(), 0);
        assert_eq!(parse_byte_size("512.0k\n").unwrap(), 524_288);
    }

    #[test]
    fn test_parse_byte_size_truncates() {
        // 1.3k = 1331.2 bytes
        assert_eq!(parse_byte_size("1.3k").unwrap(), 1331);
    }

    #[test]
    fn test_parse_byte_size_saturates() {
        assert_eq!(parse_byte_size("1Z").unwrap(), u64::MAX);
        assert_eq!(parse_byte_size("2Y").unwrap(), u64::MAX);
    }

    #[test]
    fn test_parse_byte_size_invalid() {
        assert!(parse_byte_size("").is_err());
        assert!(parse_byte_size("k").is_err());
        assert!(parse_byte_size("abc").is_err());
        assert!(parse_byte_size("1K").is_err());
        assert!(parse_byte_size("-1k").is_err());
        assert!(parse_byte_size("NaN").is_err());
    }

    #[test]
    fn test_parse_counter() {
        assert_eq!(parse_counter("42\n").unwrap(), 42);
        assert!(parse_counter("").is_err());
        assert!(parse_counter("4.2").is_err());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("3").unwrap(), 3.0);
        assert_eq!(parse_float(" 0.5 ").unwrap(), 0.5);
        assert!(parse_float("inf").is_err());
    }

    #[test]
    fn test_parse_first_line() {
        assert_eq!(parse_first_line("512k\n"), "512k");
        assert_eq!(parse_first_line("first  \nsecond\n"), "first");
        assert_eq!(parse_first_line(""), "");
        assert_eq!(parse_first_line("\n"), "");
    }
}
