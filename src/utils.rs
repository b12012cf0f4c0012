/// Mean and standard error of the mean (population standard deviation
/// over sqrt(n)). Returns (0.0, 0.0) for an empty slice.
pub fn mean_and_standard_error(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt() / n.sqrt())
}

/// Parses a seed given as a decimal number or as `0x` prefixed hex.
pub fn parse_seed(value: &str) -> crate::error::Result<u64> {
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };
    parsed.map_err(|_| crate::error::BriscolaError::InvalidSeed(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BriscolaError;

    #[test]
    fn test_mean_and_standard_error() {
        let (mean, se) = mean_and_standard_error(&[0.0, 1.0, 0.0, 1.0]);
        assert_eq!(mean, 0.5);
        assert!((se - 0.25).abs() < 1e-12);
        assert_eq!(mean_and_standard_error(&[]), (0.0, 0.0));
        assert_eq!(mean_and_standard_error(&[1.0, 1.0]), (1.0, 0.0));
    }

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed("42").unwrap(), 42);
        assert_eq!(parse_seed("0xff").unwrap(), 255);
        assert_eq!(parse_seed(" 7 ").unwrap(), 7);
        assert!(matches!(
            parse_seed("seven"),
            Err(BriscolaError::InvalidSeed(s)) if s == "seven"
        ));
        assert!(parse_seed("-1").is_err());
        assert!(parse_seed("0x").is_err());
    }
}
