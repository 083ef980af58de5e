/// 1) Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// 2) Parse a finite float from a cleaned cell. Empty, `NaN` and infinities
/// count as missing.
pub fn parse_f64(raw: &str) -> Option<f64> {
    let c = clean_str(raw);
    if c.is_empty() {
        return None;
    }
    c.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 3) Parse a tree count: a finite, non-negative, integral number.
/// `"12"` and `"12.0"` are accepted; `"12.5"`, `"-3"` and `"N/A"` are not.
pub fn parse_count(raw: &str) -> Option<u64> {
    let c = clean_str(raw);
    if let Ok(n) = c.parse::<u64>() {
        return Some(n);
    }
    let v = parse_f64(&c)?;
    if v < 0.0 || v.fract() != 0.0 || v > u64::MAX as f64 {
        return None;
    }
    Some(v as u64)
}
