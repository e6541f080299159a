#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Value(f64),
    Invalid,
}

pub fn normalize_cell(raw: &str) -> MetricValue {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| *ch != '%')
        .collect::<String>()
        .trim()
        .to_string();

    if cleaned.is_empty() {
        return MetricValue::Invalid;
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => MetricValue::Value(value),
        _ => MetricValue::Invalid,
    }
}
