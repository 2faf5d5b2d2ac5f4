//! Literal validation and identifier shape rules.
//!
//! The lexer hands raw token text to these functions before anything is
//! interned: numbers are checked and converted here, string bodies are
//! unescaped, and declared names are checked against the rules that keep
//! identifiers, namespaces and keywords from colliding.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("malformed integer literal")]
    InvalidInteger,
    #[error("integer literal too big")]
    IntegerOutOfRange,
    #[error("malformed real literal")]
    InvalidReal,
    #[error("real literal too big")]
    RealOutOfRange,
    #[error("illegal escape in string at byte {offset}")]
    InvalidEscape { offset: usize },
}

/// Non-fatal problems found while unescaping a string body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeWarning {
    /// `\u{}` with no digits; decodes to U+0000.
    EmptyUnicodeEscape { offset: usize },
    /// A code point above U+10FFFF or a surrogate; decodes to U+FFFD.
    UnicodeEscapeOutOfRange { offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Unescaped {
    pub text: String,
    pub warnings: Vec<EscapeWarning>,
}

fn split_radix(token: &str) -> Option<(u32, &str)> {
    match token.as_bytes() {
        [b'0', b'x' | b'X', ..] => Some((16, &token[2..])),
        [b'0', b'b' | b'B', ..] => Some((2, &token[2..])),
        [b'0'] => Some((10, token)),
        [b'0', ..] => None,
        _ => Some((10, token)),
    }
}

fn integer_digits(token: &str) -> Option<(u32, &str)> {
    split_radix(token)
        .filter(|(radix, digits)| !digits.is_empty() && digits.chars().all(|c| c.is_digit(*radix)))
}

/// True for `0`, `[1-9][0-9]*`, `0x[0-9A-Fa-f]+` and `0b[01]+`.
pub fn is_integer_literal(token: &str) -> bool {
    integer_digits(token).is_some()
}

/// Integer literals are unsigned and must fit in 32 bits.
pub fn parse_integer_literal(token: &str) -> Result<u32, LiteralError> {
    let (radix, digits) = integer_digits(token).ok_or(LiteralError::InvalidInteger)?;
    u32::from_str_radix(digits, radix).map_err(|_| LiteralError::IntegerOutOfRange)
}

// Matches `0 | [1-9][0-9]*`. `None` means a malformed leading zero.
fn match_int(bytes: &[u8], at: &mut usize) -> Option<bool> {
    match bytes.get(*at) {
        Some(b) if b.is_ascii_digit() => {}
        _ => return Some(false),
    }
    if bytes[*at] == b'0' && bytes.get(*at + 1).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    while bytes.get(*at).is_some_and(u8::is_ascii_digit) {
        *at += 1;
    }
    Some(true)
}

fn match_digits(bytes: &[u8], at: &mut usize) -> bool {
    let start = *at;
    while bytes.get(*at).is_some_and(u8::is_ascii_digit) {
        *at += 1;
    }
    *at > start
}

/// True for decimal reals with a point, an exponent, or both.
///
/// A bare integer is not a real literal; `.5`, `1.`, `1e3` and `1.5e-3` are.
pub fn is_real_literal(token: &str) -> bool {
    let bytes = token.as_bytes();
    let mut at = 0;

    let Some(int) = match_int(bytes, &mut at) else {
        return false;
    };
    let point = bytes.get(at) == Some(&b'.');
    if point {
        at += 1;
    }
    let frac = match_digits(bytes, &mut at);
    let mut exp = false;
    if matches!(bytes.get(at), Some(b'e' | b'E')) {
        at += 1;
        if matches!(bytes.get(at), Some(b'+' | b'-')) {
            at += 1;
        }
        match match_int(bytes, &mut at) {
            Some(found) => exp = found,
            None => return false,
        }
    }
    if at != bytes.len() {
        return false;
    }

    let shape_ok = matches!(
        (int, point, frac, exp),
        (true, true, _, _) | (true, false, false, true) | (false, true, true, _)
    );
    shape_ok && token.parse::<f64>().is_ok()
}

pub fn parse_real_literal(token: &str) -> Result<f64, LiteralError> {
    if !is_real_literal(token) {
        return Err(LiteralError::InvalidReal);
    }
    let value: f64 = token.parse().map_err(|_| LiteralError::InvalidReal)?;
    if value.is_infinite() {
        return Err(LiteralError::RealOutOfRange);
    }
    Ok(value)
}

/// Strips the surrounding quotes from a string token.
pub fn string_literal_body(token: &str) -> &str {
    let mut chars = token.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Decodes the escapes of a string body (without its quotes).
///
/// Supported escapes are `\q` (double quote), `\n`, `\r`, `\t`, `\\` and
/// `\u{X...}` with one or more hex digits. Offsets in errors and warnings
/// are byte offsets of the backslash within `body`.
pub fn unescape_string_literal(body: &str) -> Result<Unescaped, LiteralError> {
    let mut out = Unescaped {
        text: String::with_capacity(body.len()),
        warnings: Vec::new(),
    };
    let mut chars = body.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        if ch != '\\' {
            out.text.push(ch);
            continue;
        }
        let invalid = LiteralError::InvalidEscape { offset };
        let (_, escape) = chars.next().ok_or(invalid.clone())?;
        match escape {
            'q' => out.text.push('"'),
            'n' => out.text.push('\n'),
            'r' => out.text.push('\r'),
            't' => out.text.push('\t'),
            '\\' => out.text.push('\\'),
            'u' => {
                if chars.next().map(|(_, c)| c) != Some('{') {
                    return Err(invalid);
                }
                let mut value: u32 = 0;
                let mut digits = 0usize;
                let mut overflow = false;
                loop {
                    let (_, c) = chars.next().ok_or(invalid.clone())?;
                    if c == '}' {
                        break;
                    }
                    let nibble = c.to_digit(16).ok_or(invalid.clone())?;
                    digits += 1;
                    if !overflow {
                        value = (value << 4) | nibble;
                        overflow = value > 0x10FFFF;
                    }
                }
                if digits == 0 {
                    out.warnings.push(EscapeWarning::EmptyUnicodeEscape { offset });
                }
                match char::from_u32(value).filter(|_| !overflow) {
                    Some(decoded) => out.text.push(decoded),
                    None => {
                        out.warnings
                            .push(EscapeWarning::UnicodeEscapeOutOfRange { offset });
                        out.text.push('\u{FFFD}');
                    }
                }
            }
            _ => return Err(invalid),
        }
    }

    Ok(out)
}

/// Module names must be qualified, e.g. `com.example.widget`.
pub fn is_suitable_module_name(id: &str) -> bool {
    id.contains('.')
}

/// A namespace component written by users: `[a-z0-9_]`, not starting with
/// a digit.
pub fn is_suitable_namespace_component(id: &str) -> bool {
    if id.starts_with(|c: char| c.is_ascii_digit()) {
        return false;
    }
    id.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// The weaker rule applied to namespaces read from existing modules: any
/// text not starting with a digit. The empty namespace is allowed.
pub fn is_valid_namespace_component(id: &str) -> bool {
    !id.starts_with(|c: char| c.is_ascii_digit())
}

/// Names made only of lowercase ASCII letters (after any leading
/// underscores) are reserved for syntax keywords.
pub fn is_suitable_definition_name(id: &str) -> bool {
    if id.is_empty() {
        return true;
    }
    id.trim_start_matches('_')
        .chars()
        .any(|c| !c.is_ascii_lowercase())
}

/// Keywords must not contain `[A-Z0-9_.]`, so no identifier can shadow one.
pub fn is_suitable_keyword(keyword: &str) -> bool {
    !keyword
        .chars()
        .any(|c| c == '.' || c == '_' || c.is_ascii_uppercase() || c.is_ascii_digit())
}
