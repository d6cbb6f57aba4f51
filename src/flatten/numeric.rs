//! Numeric formatting helpers

use serde_json::Number;

use super::policy::MAX_PRECISION;

/// Format a JSON number for output.
///
/// Integers are printed exactly. Floating point values without a fractional
/// part are printed with zero decimals, everything else goes through
/// [`format_general`] with `precision` significant digits.
pub fn format_number(n: &Number, precision: usize) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) => format_float(f, precision),
        None => n.to_string(),
    }
}

/// Format a float, dropping the decimals of integral values.
pub fn format_float(f: f64, precision: usize) -> String {
    if !f.is_finite() {
        return f.to_string();
    }
    if f.fract() == 0.0 {
        format!("{:.0}", f)
    } else {
        format_general(f, precision)
    }
}

/// General floating point format (`%g` style).
///
/// `precision` is the number of significant digits, clamped to
/// `1..=MAX_PRECISION`.
/// Uses exponent notation when the decimal exponent is below -4 or not
/// smaller than the precision, and removes trailing zeros in both forms.
pub fn format_general(f: f64, precision: usize) -> String {
    let digits = precision.clamp(1, MAX_PRECISION);
    let sci = format!("{:.*e}", digits - 1, f);

    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };

    if exp < -4 || exp >= digits as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (digits as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, f)).to_string()
    }
}

/// Strip trailing zeros (and a dangling decimal point) from a fixed-point string.
fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
