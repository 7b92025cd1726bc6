use super::Dynamic;

/// Largest magnitude written as an integer (2^53).
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Format a Dynamic value for display.
pub fn format_dynamic(value: &Dynamic) -> String {
    if value.is_unit() {
        String::new()
    } else if let Ok(n) = value.as_float() {
        format_number(n)
    } else if let Ok(n) = value.as_int() {
        n.to_string()
    } else if let Ok(b) = value.as_bool() {
        b.to_string()
    } else if let Ok(c) = value.as_char() {
        c.to_string()
    } else if let Ok(s) = value.clone().into_string() {
        s
    } else {
        value.to_string()
    }
}

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < MAX_EXACT_INT {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// Parse cell text as a finite number. Surrounding whitespace is ignored.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Canonical text of a numeric cell (`" 07.50 "` → `"7.5"`).
pub fn canonical_number(text: &str) -> Option<String> {
    parse_number(text).map(format_number)
}

/// Rhai literal for numeric cell text: whole numbers become integers,
/// everything else a float literal.
pub fn number_literal(text: &str) -> Option<String> {
    let n = parse_number(text)?;
    if n.fract() == 0.0 && n.abs() < MAX_EXACT_INT {
        return Some(format!("{:.0}", n));
    }
    let mut literal = n.to_string();
    if !literal.contains('.') {
        literal.push_str(".0");
    }
    Some(literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_dynamic_scalars() {
        assert_eq!(format_dynamic(&Dynamic::UNIT), "");
        assert_eq!(format_dynamic(&Dynamic::from(42_i64)), "42");
        assert_eq!(format_dynamic(&Dynamic::from(3.0_f64)), "3");
        assert_eq!(format_dynamic(&Dynamic::from(2.5_f64)), "2.5");
        assert_eq!(format_dynamic(&Dynamic::from(true)), "true");
        assert_eq!(format_dynamic(&Dynamic::from("hi")), "hi");
    }

    #[test]
    fn test_format_number_special_values() {
        assert_eq!(format_number(f64::NAN), "#NAN!");
        assert_eq!(format_number(f64::INFINITY), "#INF!");
        assert_eq!(format_number(-0.125), "-0.125");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 12 "), Some(12.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_canonical_number() {
        assert_eq!(canonical_number(" 07.50 ").as_deref(), Some("7.5"));
        assert_eq!(canonical_number("3.0").as_deref(), Some("3"));
        assert_eq!(canonical_number("x"), None);
    }

    #[test]
    fn test_number_literal() {
        assert_eq!(number_literal("7").as_deref(), Some("7"));
        assert_eq!(number_literal("-2.5").as_deref(), Some("-2.5"));
        assert_eq!(number_literal("1e20").as_deref(), Some("100000000000000000000.0"));
        assert_eq!(number_literal(""), None);
    }
}
