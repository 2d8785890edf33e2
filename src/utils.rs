/// Round `value` to `decimals` decimal places.
///
/// Matches the quoting granularity of the source data (2 decimals for
/// price-scale values, 4 for MACD).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_requested_precision() {
        assert_eq!(round_to(1.2349, 2), 1.23);
        assert_eq!(round_to(1.006, 2), 1.01);
        assert_eq!(round_to(-1.006, 2), -1.01);
        assert_eq!(round_to(0.12344, 4), 0.1234);
    }
}
