//! Formatting helpers shared by table renderers and detail views

/// Format a number the way it should appear in free text
///
/// Whole numbers drop the fractional part (`5`, not `5.0`).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Format an amount as dollars with two decimals (`$49.99`)
#[must_use]
pub fn format_money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${amount:.2}")
    }
}

/// Shorten text to at most `max_chars` characters, appending `...` when cut
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}...", kept.trim_end())
}

/// Render a rating as `n/5`
#[must_use]
pub fn format_rating(rating: f64) -> String {
    format!("{}/5", format_number(rating))
}
