//! Typed field values, the filter coercion policy, and the comparison rules
//! shared by the in-memory and SQL execution paths.

use serde_json::Value;
use std::cmp::Ordering;

/// Value of one record field as seen by the query builder.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null),
            },
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => FieldValue::Text(v.to_string()),
        }
    }

    /// Equality predicate of one filter condition. NULL never matches.
    pub fn matches(&self, filter: &FilterValue) -> bool {
        match (self, filter) {
            (FieldValue::Null, _) => false,
            (FieldValue::Int(a), FilterValue::Int(b)) => a == b,
            (FieldValue::Int(a), FilterValue::Float(b)) => (*a as f64) == *b,
            (FieldValue::Float(a), FilterValue::Int(b)) => *a == (*b as f64),
            (FieldValue::Float(a), FilterValue::Float(b)) => a == b,
            (FieldValue::Bool(a), FilterValue::Int(b)) => i64::from(*a) == *b,
            (FieldValue::Bool(a), FilterValue::Float(b)) => f64::from(u8::from(*a)) == *b,
            (FieldValue::Text(a), FilterValue::Text(b)) => a == b,
            // Text columns compare against the number's text form, as SQLite affinity does.
            (FieldValue::Text(a), FilterValue::Int(b)) => *a == b.to_string(),
            (FieldValue::Text(a), FilterValue::Float(b)) => float_text(*b).map_or(false, |t| *a == t),
            (FieldValue::Int(_) | FieldValue::Float(_) | FieldValue::Bool(_), FilterValue::Text(_)) => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) | FieldValue::Int(_) | FieldValue::Float(_) => 1,
            FieldValue::Text(_) => 2,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Bool(b) => Some(f64::from(u8::from(*b))),
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Null | FieldValue::Text(_) => None,
        }
    }
}

/// Sort order: NULL < numbers < text.
pub fn compare(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Int(x), FieldValue::Int(y)) => x.cmp(y),
        (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => a.rank().cmp(&b.rank()),
        },
    }
}

/// Raw filter value after coercion.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FilterValue {
    /// Integer if the string is all ASCII digits, else float if it parses, else text.
    /// Underscores between digits are accepted in the float form (`1_000`).
    pub fn coerce(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<i64>() {
                return FilterValue::Int(n);
            }
        }
        let parsed = match strip_digit_separators(raw.trim()) {
            Some(cleaned) => cleaned.parse::<f64>().ok(),
            None => None,
        };
        match parsed {
            Some(f) => FilterValue::Float(f),
            None => FilterValue::Text(raw.to_string()),
        }
    }
}

/// Drop `_` separators that sit between two digits. `None` if any other `_` appears.
fn strip_digit_separators(s: &str) -> Option<String> {
    if !s.contains('_') {
        return Some(s.to_string());
    }
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        if c == '_' {
            let before = i > 0 && bytes[i - 1].is_ascii_digit();
            let after = bytes.get(i + 1).map_or(false, u8::is_ascii_digit);
            if !(before && after) {
                return None;
            }
            continue;
        }
        out.push(c);
    }
    Some(out)
}

/// Text form SQLite gives a REAL (`%!.15g`): 15 significant digits, a `.0`
/// kept on integral mantissas, exponent form outside `1e-4..1e15`.
/// `None` for NaN, which SQLite stores as NULL.
fn float_text(f: f64) -> Option<String> {
    if f.is_nan() {
        return None;
    }
    if f.is_infinite() {
        return Some(if f > 0.0 { "Inf" } else { "-Inf" }.to_string());
    }
    if f == 0.0 {
        return Some("0.0".to_string());
    }
    let sci = format!("{:.14e}", f);
    let (mantissa, exp) = sci.split_once('e')?;
    let exp: i32 = exp.parse().ok()?;
    if !(-4..15).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return Some(format!("{}e{}{:02}", keep_point(mantissa), sign, exp.abs()));
    }
    let digits = usize::try_from(14 - exp).unwrap_or(0);
    Some(keep_point(&format!("{:.*}", digits, f)))
}

/// Trim trailing fractional zeros but leave at least one digit after the point.
fn keep_point(s: &str) -> String {
    let mut out = if s.contains('.') {
        s.trim_end_matches('0').to_string()
    } else {
        format!("{}.", s)
    };
    if out.ends_with('.') {
        out.push('0');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_follows_int_float_text_order() {
        assert_eq!(FilterValue::coerce("42"), FilterValue::Int(42));
        assert_eq!(FilterValue::coerce("007"), FilterValue::Int(7));
        assert_eq!(FilterValue::coerce("-3"), FilterValue::Float(-3.0));
        assert_eq!(FilterValue::coerce("2.5"), FilterValue::Float(2.5));
        assert_eq!(FilterValue::coerce("1e3"), FilterValue::Float(1000.0));
        assert_eq!(FilterValue::coerce("x"), FilterValue::Text("x".into()));
        assert_eq!(FilterValue::coerce(""), FilterValue::Text(String::new()));
        assert_eq!(FilterValue::coerce("true"), FilterValue::Text("true".into()));
    }

    #[test]
    fn coerce_accepts_underscores_between_digits() {
        assert_eq!(FilterValue::coerce("1_000"), FilterValue::Float(1000.0));
        assert_eq!(FilterValue::coerce("1_000.5"), FilterValue::Float(1000.5));
        assert_eq!(FilterValue::coerce("_1"), FilterValue::Text("_1".into()));
        assert_eq!(FilterValue::coerce("1__0"), FilterValue::Text("1__0".into()));
        assert_eq!(FilterValue::coerce("1_"), FilterValue::Text("1_".into()));
    }

    #[test]
    fn float_text_matches_sqlite_rendering() {
        assert_eq!(float_text(2.0).as_deref(), Some("2.0"));
        assert_eq!(float_text(1.5).as_deref(), Some("1.5"));
        assert_eq!(float_text(0.1).as_deref(), Some("0.1"));
        assert_eq!(float_text(-3.0).as_deref(), Some("-3.0"));
        assert_eq!(float_text(123456.789).as_deref(), Some("123456.789"));
        assert_eq!(float_text(999999999999999.0).as_deref(), Some("999999999999999.0"));
        assert_eq!(float_text(1e15).as_deref(), Some("1.0e+15"));
        assert_eq!(float_text(1e20).as_deref(), Some("1.0e+20"));
        assert_eq!(float_text(2.5e-5).as_deref(), Some("2.5e-05"));
        assert_eq!(float_text(f64::INFINITY).as_deref(), Some("Inf"));
        assert_eq!(float_text(f64::NEG_INFINITY).as_deref(), Some("-Inf"));
        assert_eq!(float_text(f64::NAN), None);
    }

    #[test]
    fn text_field_against_non_finite_and_large_floats() {
        assert!(!FieldValue::Text("inf".into()).matches(&FilterValue::coerce("inf")));
        assert!(FieldValue::Text("Inf".into()).matches(&FilterValue::coerce("inf")));
        assert!(!FieldValue::Text("NaN".into()).matches(&FilterValue::coerce("nan")));
        assert!(!FieldValue::Text("100000000000000000000".into()).matches(&FilterValue::Float(1e20)));
        assert!(FieldValue::Text("1.0e+20".into()).matches(&FilterValue::Float(1e20)));
    }

    #[test]
    fn coerce_overflowing_digits_falls_back_to_float() {
        assert_eq!(
            FilterValue::coerce("99999999999999999999"),
            FilterValue::Float(99999999999999999999.0)
        );
    }

    #[test]
    fn numeric_equality_crosses_int_and_float() {
        assert!(FieldValue::Int(3).matches(&FilterValue::Float(3.0)));
        assert!(FieldValue::Float(2.0).matches(&FilterValue::Int(2)));
        assert!(!FieldValue::Int(3).matches(&FilterValue::Int(4)));
        assert!(!FieldValue::Int(3).matches(&FilterValue::Text("3x".into())));
    }

    #[test]
    fn text_field_against_numeric_filter() {
        assert!(FieldValue::Text("12".into()).matches(&FilterValue::Int(12)));
        assert!(!FieldValue::Text("012".into()).matches(&FilterValue::Int(12)));
        assert!(FieldValue::Text("1.5".into()).matches(&FilterValue::Float(1.5)));
        assert!(FieldValue::Text("2.0".into()).matches(&FilterValue::Float(2.0)));
    }

    #[test]
    fn bool_and_null() {
        assert!(FieldValue::Bool(true).matches(&FilterValue::Int(1)));
        assert!(FieldValue::Bool(false).matches(&FilterValue::Int(0)));
        assert!(!FieldValue::Bool(true).matches(&FilterValue::Text("true".into())));
        assert!(!FieldValue::Null.matches(&FilterValue::Int(0)));
        assert!(!FieldValue::Null.matches(&FilterValue::Text(String::new())));
    }

    #[test]
    fn ordering_puts_null_first_and_text_last() {
        let mut values = vec![
            FieldValue::Text("a".into()),
            FieldValue::Int(5),
            FieldValue::Null,
            FieldValue::Float(1.5),
        ];
        values.sort_by(compare);
        assert_eq!(
            values,
            vec![
                FieldValue::Null,
                FieldValue::Float(1.5),
                FieldValue::Int(5),
                FieldValue::Text("a".into()),
            ]
        );
    }
}
