//! Edge statistics. Undefined statistics are `None`, never NaN.

/// `round(amount / distinct_cases * 100)`, or `None` with no cases.
pub fn percentage(amount: usize, distinct_cases: usize) -> Option<u32> {
    if distinct_cases == 0 {
        return None;
    }
    let pct = amount as f64 / distinct_cases as f64 * 100.0;
    Some(pct.round() as u32)
}

/// Arithmetic mean, or `None` for no samples.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}
