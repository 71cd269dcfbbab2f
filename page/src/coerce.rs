use tracing::warn;

/// A form value after coercion.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

/// Empty or missing input becomes `None`; otherwise the raw text, converted
/// with [`js_number`] when `as_number` is set.
///
/// Malformed numeric text is not rejected here: it yields `NaN`, which the
/// JSON encoding later sends as `null`.
pub fn parse_or_null(raw: Option<&str>, as_number: bool) -> Option<FieldValue> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }
    if !as_number {
        return Some(FieldValue::Text(raw.to_string()));
    }
    let n = js_number(raw);
    if n.is_nan() {
        warn!("[anemia-page] Non-numeric input {:?} coerced to NaN", raw);
    }
    Some(FieldValue::Number(n))
}

/// Numeric conversion with the same rules as ECMAScript `Number(string)`.
pub fn js_number(raw: &str) -> f64 {
    let s = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&s[2..], radix);
    }

    if is_decimal_literal(s) {
        s.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut value = 0.0f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => value = value * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    value
}

/// `[+-] (digits [. digits] | . digits) [(e|E) [+-] digits]`
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }

    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

/// Number-to-text conversion with the same output as the page's string
/// conversion: exponent form below `1e-6` and from `1e21` up, `-0` as `0`.
pub fn js_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return n.to_string();
    }
    let exp = format!("{:e}", n);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_missing_become_none() {
        assert_eq!(parse_or_null(Some(""), true), None);
        assert_eq!(parse_or_null(Some(""), false), None);
        assert_eq!(parse_or_null(None, true), None);
        assert_eq!(parse_or_null(None, false), None);
    }

    #[test]
    fn numeric_text_keeps_exact_value() {
        assert_eq!(parse_or_null(Some("24"), true), Some(FieldValue::Number(24.0)));
        assert_eq!(parse_or_null(Some("12.5"), true), Some(FieldValue::Number(12.5)));
        assert_eq!(parse_or_null(Some("-3"), true), Some(FieldValue::Number(-3.0)));
    }

    #[test]
    fn text_is_passed_through_without_numeric_flag() {
        assert_eq!(
            parse_or_null(Some("24"), false),
            Some(FieldValue::Text("24".to_string()))
        );
        assert_eq!(FieldValue::Text("24".into()).as_number(), None);
    }

    #[test]
    fn malformed_numbers_become_nan() {
        let value = parse_or_null(Some("abc"), true).and_then(|v| v.as_number());
        assert!(value.is_some_and(f64::is_nan));
        assert!(js_number("12abc").is_nan());
        assert!(js_number("1e").is_nan());
        assert!(js_number(".").is_nan());
        assert!(js_number("inf").is_nan());
        assert!(js_number("nan").is_nan());
        assert!(js_number("0x").is_nan());
        assert!(js_number("1,5").is_nan());
    }

    #[test]
    fn follows_number_conversion_rules() {
        assert_eq!(js_number("  42  "), 42.0);
        assert_eq!(js_number("   "), 0.0);
        assert_eq!(js_number("0x1A"), 26.0);
        assert_eq!(js_number("0b101"), 5.0);
        assert_eq!(js_number("0o17"), 15.0);
        assert_eq!(js_number("1e3"), 1000.0);
        assert_eq!(js_number(".5"), 0.5);
        assert_eq!(js_number("5."), 5.0);
        assert_eq!(js_number("+7"), 7.0);
        assert_eq!(js_number("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(js_number("Infinity"), f64::INFINITY);
    }

    #[test]
    fn number_text_switches_to_exponent_form_at_the_edges() {
        assert_eq!(js_string(7.0), "7");
        assert_eq!(js_string(0.82), "0.82");
        assert_eq!(js_string(0.000001), "0.000001");
        assert_eq!(js_string(1e-7), "1e-7");
        assert_eq!(js_string(-2.5e-8), "-2.5e-8");
        assert_eq!(js_string(1e20), "100000000000000000000");
        assert_eq!(js_string(1e21), "1e+21");
        assert_eq!(js_string(1.5e22), "1.5e+22");
        assert_eq!(js_string(-0.0), "0");
        assert_eq!(js_string(f64::INFINITY), "Infinity");
    }
}
