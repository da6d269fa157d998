use super::LedgerError;

/// Parse user-entered amount text into a number.
/// Surrounding whitespace is ignored and the value must be finite.
/// Example: "500000" -> 500000.0, " -12.5 " -> -12.5, "1e3" -> 1000.0
pub fn parse_amount(input: &str) -> Result<f64, LedgerError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(LedgerError::InvalidAmount(input.to_string())),
    }
}

/// Format an amount in its default numeric text form.
/// Whole numbers keep one decimal so files stay readable by other tools that
/// write "500000.0"; everything else uses the shortest round-trip form.
/// Example: 500000.0 -> "500000.0", 12.25 -> "12.25", -3.0 -> "-3.0"
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e16 {
        format!("{:.1}", amount)
    } else {
        format!("{}", amount)
    }
}
