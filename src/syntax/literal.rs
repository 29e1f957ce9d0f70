//! Literal decoding: Python string prefixes and escapes, numeric normalisation,
//! and the `str()`-style display of constants.

use std::fmt;

use super::Constant;

/// Decodes a single string literal token (prefix, quotes and body).
///
/// Returns `None` for f-strings, which are not constants.
pub fn decode_string(token: &str) -> Option<Constant> {
    let prefix_len = token
        .find(|c: char| c == '"' || c == '\'')
        .unwrap_or(token.len());
    let (prefix, quoted) = token.split_at(prefix_len);
    let prefix = prefix.to_ascii_lowercase();

    if prefix.contains('f') || prefix.contains('t') {
        return None;
    }

    let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    let body = if quoted.len() >= quote_len * 2 {
        &quoted[quote_len..quoted.len() - quote_len]
    } else {
        ""
    };

    if prefix.contains('b') {
        return Some(Constant::Bytes(body.to_string()));
    }

    if prefix.contains('r') {
        Some(Constant::Str(body.to_string()))
    } else {
        Some(Constant::Str(unescape(body)))
    }
}

/// Processes backslash escapes in a non-raw string body
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };

        match escape {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut digits = String::from(escape);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' | 'u' | 'U' => {
                let width = match escape {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let mut digits = String::new();
                while digits.len() < width {
                    match chars.peek() {
                        Some(d) if d.is_ascii_hexdigit() => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('\\');
                        out.push(escape);
                        out.push_str(&digits);
                    }
                }
            }
            other => {
                // Unknown escapes (including \N{...}) are kept verbatim
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

/// Normalises an integer literal to its decimal form
pub fn int_literal(text: &str, negative: bool) -> String {
    let cleaned = text.replace('_', "").to_ascii_lowercase();

    let parsed = if let Some(hex) = cleaned.strip_prefix("0x") {
        u128::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = cleaned.strip_prefix("0o") {
        u128::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = cleaned.strip_prefix("0b") {
        u128::from_str_radix(bin, 2).ok()
    } else {
        cleaned.parse::<u128>().ok()
    };

    let digits = match parsed {
        Some(value) => value.to_string(),
        None => cleaned,
    };

    if negative && digits != "0" {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// Normalises a float literal the way Python prints floats
pub fn float_literal(text: &str, negative: bool) -> String {
    let cleaned = text.replace('_', "");
    match cleaned.parse::<f64>() {
        Ok(value) => python_float(if negative { -value } else { value }),
        Err(_) if negative => format!("-{}", cleaned),
        Err(_) => cleaned,
    }
}

/// Normalises an imaginary literal (`2J`, `1_0j`)
pub fn complex_literal(text: &str, negative: bool) -> String {
    let cleaned = text.replace('_', "").to_ascii_lowercase();
    if negative {
        format!("-{}", cleaned)
    } else {
        cleaned
    }
}

fn python_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e16 || (magnitude != 0.0 && magnitude < 1e-4) {
        let scientific = format!("{:e}", value);
        return match scientific.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().unwrap_or(0);
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exponent.abs())
            }
            None => scientific,
        };
    }

    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Str(text) => f.write_str(text),
            Constant::Bytes(body) => write!(f, "b'{}'", body),
            Constant::Int(text) | Constant::Float(text) | Constant::Complex(text) => {
                f.write_str(text)
            }
            Constant::Bool(true) => f.write_str("True"),
            Constant::Bool(false) => f.write_str("False"),
            Constant::None => f.write_str("None"),
            Constant::Ellipsis => f.write_str("Ellipsis"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_and_triple_quoted() {
        assert_eq!(decode_string("\"hello\""), Some(Constant::Str("hello".into())));
        assert_eq!(decode_string("'hi'"), Some(Constant::Str("hi".into())));
        assert_eq!(
            decode_string("\"\"\"Line one\n    Line two\"\"\""),
            Some(Constant::Str("Line one\n    Line two".into()))
        );
        assert_eq!(decode_string("''"), Some(Constant::Str(String::new())));
    }

    #[test]
    fn test_decode_prefixes() {
        assert_eq!(decode_string(r#"r"a\nb""#), Some(Constant::Str(r"a\nb".into())));
        assert_eq!(decode_string(r#"u"x""#), Some(Constant::Str("x".into())));
        assert_eq!(decode_string("b'raw'"), Some(Constant::Bytes("raw".into())));
        assert_eq!(decode_string(r#"f"{x}""#), None);
        assert_eq!(decode_string(r#"Rb"x""#), Some(Constant::Bytes("x".into())));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\tb\nc"), "a\tb\nc");
        assert_eq!(unescape(r#"say \"hi\""#), "say \"hi\"");
        assert_eq!(unescape(r"\x41é\101"), "AéA");
        assert_eq!(unescape(r"keep \d and \N{DASH}"), r"keep \d and \N{DASH}");
        assert_eq!(unescape("line \\\ncontinued"), "line continued");
        assert_eq!(unescape(r"bad \xZZ"), r"bad \xZZ");
    }

    #[test]
    fn test_int_literal() {
        assert_eq!(int_literal("42", false), "42");
        assert_eq!(int_literal("1_000", false), "1000");
        assert_eq!(int_literal("0xFF", false), "255");
        assert_eq!(int_literal("0o17", false), "15");
        assert_eq!(int_literal("0b101", true), "-5");
        assert_eq!(int_literal("0", true), "0");
    }

    #[test]
    fn test_float_literal() {
        assert_eq!(float_literal("1.5", false), "1.5");
        assert_eq!(float_literal("1.0", false), "1.0");
        assert_eq!(float_literal("5.", false), "5.0");
        assert_eq!(float_literal(".25", true), "-0.25");
        assert_eq!(float_literal("1e3", false), "1000.0");
        assert_eq!(float_literal("1e-7", false), "1e-07");
        assert_eq!(float_literal("2.5e20", false), "2.5e+20");
    }

    #[test]
    fn test_constant_display() {
        assert_eq!(Constant::Str("text".into()).to_string(), "text");
        assert_eq!(Constant::Bool(true).to_string(), "True");
        assert_eq!(Constant::None.to_string(), "None");
        assert_eq!(Constant::Ellipsis.to_string(), "Ellipsis");
        assert_eq!(Constant::Bytes("ab".into()).to_string(), "b'ab'");
        assert_eq!(Constant::Int("7".into()).to_string(), "7");
    }
}
