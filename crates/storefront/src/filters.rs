//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a volume in millilitres, switching to litres from 1000 ml.
///
/// Usage in templates: `{{ product.volume_ml|volume }}`
#[askama::filter_fn]
pub fn volume(ml: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_volume(&ml.to_string()))
}

fn format_volume(raw: &str) -> String {
    match raw.parse::<u32>() {
        Ok(0) | Err(_) => String::new(),
        Ok(ml) if ml >= 1000 && ml % 10 == 0 => {
            let litres = f64::from(ml) / 1000.0;
            format!("{litres} L")
        }
        Ok(ml) => format!("{ml} ml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume("330"), "330 ml");
        assert_eq!(format_volume("750"), "750 ml");
        assert_eq!(format_volume("1000"), "1 L");
        assert_eq!(format_volume("1500"), "1.5 L");
        assert_eq!(format_volume("1750"), "1.75 L");
        assert_eq!(format_volume("1001"), "1001 ml");
        assert_eq!(format_volume("0"), "");
    }
}
