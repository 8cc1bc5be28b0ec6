//! Literal spelling: numbers, characters and string literals.
//!
//! Also hosts the source language's own number-to-string rules, used when
//! a concatenation of constants is folded at translation time.

use std::fmt::Write as _;

use xlat_ir::Constant;

/// Objective-C expression for a constant.
pub fn constant(value: &Constant) -> String {
    match value {
        Constant::Bool(b) => if *b { "true" } else { "false" }.to_owned(),
        Constant::Char(c) => char_literal(*c),
        Constant::Byte(v) => v.to_string(),
        Constant::Short(v) => v.to_string(),
        Constant::Int(v) => int_literal(*v),
        Constant::Long(v) => long_literal(*v),
        Constant::Float(bits) => float_literal(f32::from_bits(*bits)),
        Constant::Double(bits) => double_literal(f64::from_bits(*bits)),
        Constant::String(s) => string_literal(s),
    }
}

/// `INT_MIN` cannot be written as a negated decimal literal in C.
pub fn int_literal(v: i32) -> String {
    if v == i32::MIN {
        "((jint) 0x80000000)".to_owned()
    } else {
        v.to_string()
    }
}

pub fn long_literal(v: i64) -> String {
    if v == i64::MIN {
        "((jlong) 0x8000000000000000LL)".to_owned()
    } else {
        format!("{v}LL")
    }
}

pub fn float_literal(v: f32) -> String {
    if v.is_nan() {
        "NAN".to_owned()
    } else if v.is_infinite() {
        if v > 0.0 { "INFINITY" } else { "-INFINITY" }.to_owned()
    } else {
        format!("{v:?}f")
    }
}

pub fn double_literal(v: f64) -> String {
    if v.is_nan() {
        "NAN".to_owned()
    } else if v.is_infinite() {
        if v > 0.0 { "INFINITY" } else { "-INFINITY" }.to_owned()
    } else {
        format!("{v:?}")
    }
}

/// Printable ASCII as a quoted character, everything else as hex.
pub fn char_literal(c: u16) -> String {
    match c {
        0x27 => "'\\''".to_owned(),
        0x5c => "'\\\\'".to_owned(),
        0x20..=0x7e => format!("'{}'", char::from(u8::try_from(c).unwrap_or(b'?'))),
        _ => format!("0x{c:04x}"),
    }
}

/// `@"..."` literal.
///
/// Characters the Objective-C compiler accepts as universal character
/// names are written `\uXXXX` / `\UXXXXXXXX`. Control characters and
/// U+007F..U+009F cannot be, so their UTF-8 bytes are written as `\x`
/// escapes; a literal is split after a hex escape when the next character
/// is a hex digit, because C hex escapes are greedy.
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 3);
    out.push_str("@\"");
    let mut after_hex = false;
    for c in s.chars() {
        if after_hex && c.is_ascii_hexdigit() {
            out.push_str("\" @\"");
        }
        after_hex = false;
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            c if (c as u32) < 0x20 || (0x7f..0xa0).contains(&(c as u32)) => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(out, "\\x{byte:02x}");
                }
                after_hex = true;
            }
            c if (c as u32) <= 0xffff => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => {
                let _ = write!(out, "\\U{:08x}", c as u32);
            }
        }
    }
    out.push('"');
    out
}

/// Plain C string literal for metadata tables (ASCII only expected).
pub fn c_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            ' '..='~' => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(out, "\\x{byte:02x}");
                }
            }
        }
    }
    out.push('"');
    out
}

/// The source language's string conversion of a constant, for folding
/// constant concatenations.
pub fn java_string(value: &Constant) -> String {
    match value {
        Constant::Bool(b) => b.to_string(),
        Constant::Char(c) => char::from_u32(u32::from(*c))
            .unwrap_or(char::REPLACEMENT_CHARACTER)
            .to_string(),
        Constant::Byte(v) => v.to_string(),
        Constant::Short(v) => v.to_string(),
        Constant::Int(v) => v.to_string(),
        Constant::Long(v) => v.to_string(),
        Constant::Float(bits) => java_float_string(f32::from_bits(*bits)),
        Constant::Double(bits) => java_double_string(f64::from_bits(*bits)),
        Constant::String(s) => s.clone(),
    }
}

/// `Double.toString` rules: plain notation in `[1e-3, 1e7)`, otherwise
/// computerized scientific notation with at least one fractional digit.
pub fn java_double_string(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_owned();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    let magnitude = v.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        plain_decimal(&v.to_string())
    } else {
        scientific(&format!("{v:e}"))
    }
}

pub fn java_float_string(v: f32) -> String {
    if v.is_nan() {
        return "NaN".to_owned();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    let magnitude = v.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        plain_decimal(&v.to_string())
    } else {
        scientific(&format!("{v:e}"))
    }
}

fn plain_decimal(digits: &str) -> String {
    if digits.contains('.') {
        digits.to_owned()
    } else {
        format!("{digits}.0")
    }
}

fn scientific(rust: &str) -> String {
    let (mantissa, exponent) = rust.split_once('e').unwrap_or((rust, "0"));
    format!("{}E{exponent}", plain_decimal(mantissa))
}
