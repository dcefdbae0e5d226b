use crate::error::Error;

/// Fix case and collapse redundant whitespace.
pub fn clean(line: &str) -> String {
    line.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `clean`, then strip operand values: bare numeric literals vanish and
/// `#`/`@` operands collapse to their marker. Lines differing only in
/// operand values or label names end up with the same signature.
pub fn sanitize(line: &str) -> String {
    clean(line)
        .split_whitespace()
        .filter_map(|tok| match tok.chars().next() {
            Some('#') => Some("#"),
            Some('@') => Some("@"),
            _ if is_number(tok) => None,
            _ => Some(tok),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Recognize a numeric literal: decimal, `0`-prefixed octal, or `0x` hex.
pub fn is_number(s: &str) -> bool {
    let (radix, digits) = split_radix(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix))
}

/// Parse a numeric literal, enforcing the single-byte range.
pub fn parse_number(s: &str) -> Result<u8, Error> {
    let (radix, digits) = split_radix(s);
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(Error::SyntaxError(s.to_string()));
    }
    match u64::from_str_radix(digits, radix) {
        Ok(v) if v <= 0xFF => Ok(v as u8),
        _ => Err(Error::ValueOutOfRange(s.to_string())),
    }
}

fn split_radix(s: &str) -> (u32, &str) {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (16, hex)
    } else if s.len() > 1 && s.starts_with('0') {
        (8, &s[1..])
    } else {
        (10, s)
    }
}
