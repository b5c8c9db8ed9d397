//! Display formatting. All rounding happens here, after ranking.

/// Group the integer part with commas: `1234567.891, 2` → `1,234,567.89`.
pub fn grouped(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + text.len() / 3 + 1);
    if value < 0.0 && text.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `1234` → `1,234`.
pub fn count(n: usize) -> String {
    grouped(n as f64, 0)
}

/// Whole minutes print without decimals, anything else with two.
pub fn minutes(value: f64) -> String {
    if value.fract() == 0.0 {
        grouped(value, 0)
    } else {
        grouped(value, 2)
    }
}

/// Sterling with two decimals: `£1,234.50`.
pub fn pounds(value: f64) -> String {
    format!("£{}", grouped(value, 2))
}

/// Sterling with one decimal, used in the income table.
pub fn pounds_short(value: f64) -> String {
    format!("£{}", grouped(value, 1))
}

/// Two-decimal rounding for mean durations.
pub fn mean(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(grouped(0.0, 0), "0");
        assert_eq!(grouped(999.0, 0), "999");
        assert_eq!(grouped(1000.0, 0), "1,000");
        assert_eq!(grouped(1234567.891, 2), "1,234,567.89");
        assert_eq!(grouped(-4321.5, 1), "-4,321.5");
        assert_eq!(grouped(-0.001, 2), "0.00");
    }

    #[test]
    fn currency_and_counts() {
        assert_eq!(pounds(150.0), "£150.00");
        assert_eq!(pounds(12345.678), "£12,345.68");
        assert_eq!(pounds_short(999.95), "£1,000.0");
        assert_eq!(count(48213), "48,213");
    }

    #[test]
    fn minutes_drop_trailing_zero_decimals() {
        assert_eq!(minutes(120000.0), "120,000");
        assert_eq!(minutes(15.25), "15.25");
        assert_eq!(mean(14.999), "15.00");
    }
}
