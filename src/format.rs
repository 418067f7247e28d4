//! Numeric picture formats for content blocks
//!
//! A format like `000.00` pads the integer part with zeros and rounds the
//! fraction to the placeholder count; `#` marks an optional digit. Values
//! that aren't numbers, and formats without placeholders, fall back to the
//! plain string conversion.

use rhai::Dynamic;

pub(crate) fn format_value(value: &Dynamic, format: &str) -> String {
    let format = format.trim();
    if !format.chars().any(|c| c == '0' || c == '#') {
        return value.to_string();
    }

    let (int_format, frac_format) = match format.split_once('.') {
        Some((i, f)) => (i, f),
        None => (format, ""),
    };
    let int_min = int_format.chars().filter(|&c| c == '0').count();
    let frac_max = frac_format.chars().filter(|&c| c == '0' || c == '#').count();
    let frac_min = frac_format.chars().filter(|&c| c == '0').count();

    // Integers keep their exact decimal digits; only floats go through
    // rounding, which cannot represent every 64-bit integer.
    let (negative, int_part, mut frac) = if let Ok(i) = value.as_int() {
        (i < 0, i.unsigned_abs().to_string(), "0".repeat(frac_max))
    } else if let Ok(f) = value.as_float() {
        let rendered = format!("{:.*}", frac_max, f.abs());
        let (int_part, frac_part) = match rendered.split_once('.') {
            Some((i, fr)) => (i.to_string(), fr.to_string()),
            None => (rendered, String::new()),
        };
        (f.is_sign_negative(), int_part, frac_part)
    } else {
        return value.to_string();
    };

    // The sign is dropped when the rounded digits are all zero.
    let rounded_nonzero = int_part.bytes().any(|b| b != b'0') || frac.bytes().any(|b| b != b'0');
    let mut out = String::new();
    if negative && rounded_nonzero {
        out.push('-');
    }
    for _ in int_part.len()..int_min {
        out.push('0');
    }
    out.push_str(&int_part);

    while frac.len() > frac_min && frac.ends_with('0') {
        frac.pop();
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(&frac);
    }
    out
}
