/// Arithmetic mean of `value(item)` over `items`. Returns `None` for empty
/// input instead of dividing by zero.
pub fn mean_by<T>(items: &[T], value: impl Fn(&T) -> f64) -> Option<f64> {
    if items.is_empty() {
        return None;
    }
    Some(items.iter().map(value).sum::<f64>() / items.len() as f64)
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats an integer with `,` thousands separators.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_by_empty() {
        let values: [f64; 0] = [];
        assert_eq!(mean_by(&values, |v| *v), None);
    }

    #[test]
    fn test_mean_by_values() {
        assert_eq!(mean_by(&[10.0, 20.0, 30.0, 40.0], |v| *v), Some(25.0));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(3.0), 3.0);
        assert_eq!(round2(0.004), 0.0);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_458_644), "1,458,644");
    }
}
