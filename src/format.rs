// src/format.rs

use crate::types::DbType;

/// Token rendered for missing or unusable cell values.
pub const NO_VALUE: &str = "-";

/// Normalize a raw cell value of unknown shape into a display string.
///
/// - missing / empty -> `-`
/// - numeric-looking -> stringified number
/// - anything else -> `;`-separated parts, trimmed, empties dropped,
///   sorted ascending, rejoined with `"; "`
///
/// Idempotent: formatting an already-formatted string returns it unchanged.
/// This must never panic, whatever the backend sent us.
pub fn format_value(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(s) => s.trim(),
        None => return NO_VALUE.to_string(),
    };
    if raw.is_empty() {
        return NO_VALUE.to_string();
    }

    if let Ok(num) = raw.parse::<f64>() {
        if num.is_finite() {
            return format_float(num);
        }
        return NO_VALUE.to_string();
    }

    let mut parts: Vec<&str> = raw
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return NO_VALUE.to_string();
    }
    parts.sort_unstable();
    parts.join("; ")
}

/// Render a number with fixed decimal places and thousands separators,
/// e.g. `1234567.8` at 1 decimal place -> `"1,234,567.8"`.
pub fn format_number(value: f64, decimal_places: usize) -> String {
    if !value.is_finite() {
        return NO_VALUE.to_string();
    }
    let fixed = format!("{value:.decimal_places$}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

// Plain stringification for format_value: trailing zeros dropped so a
// second pass parses back to the same text.
fn format_float(num: f64) -> String {
    if num == num.trunc() && num.abs() < 1e15 {
        format!("{}", num as i64)
    } else {
        format!("{num}")
    }
}

/// A cell's NT/NR rendering, resolved from the paired value array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderableStack {
    /// No values at all: render the placeholder token.
    Placeholder,
    /// A single merged NT/NR value: rendered inline, no stacking.
    Merged(String),
    /// Two values stacked, NT above NR. Each row is independently
    /// clickable; the active `DbType` is owned by the caller.
    Stacked { nt: String, nr: String },
}

impl RenderableStack {
    /// The display string for one database row of the stack.
    pub fn row(&self, db: DbType) -> &str {
        match self {
            RenderableStack::Placeholder => NO_VALUE,
            RenderableStack::Merged(v) => v,
            RenderableStack::Stacked { nt, nr } => match db {
                DbType::Nt => nt,
                DbType::Nr => nr,
            },
        }
    }

    pub fn is_stacked(&self) -> bool {
        matches!(self, RenderableStack::Stacked { .. })
    }
}

/// Resolve a 0/1/2-element NT/NR value array into its rendering.
/// Index 0 is NT, index 1 is NR; extra values are ignored.
pub fn resolve_dual_metric(values: &[f64], decimal_places: usize) -> RenderableStack {
    match values {
        [] => RenderableStack::Placeholder,
        [merged] => RenderableStack::Merged(format_number(*merged, decimal_places)),
        [nt, nr, ..] => RenderableStack::Stacked {
            nt: format_number(*nt, decimal_places),
            nr: format_number(*nr, decimal_places),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_render_placeholder() {
        assert_eq!(format_value(None), "-");
        assert_eq!(format_value(Some("")), "-");
        assert_eq!(format_value(Some("   ")), "-");
        assert_eq!(format_value(Some(";;")), "-");
        assert_eq!(format_value(Some("NaN")), "-");
    }

    #[test]
    fn numeric_strings_are_stringified() {
        assert_eq!(format_value(Some("5")), "5");
        assert_eq!(format_value(Some("5.0")), "5");
        assert_eq!(format_value(Some("5.25")), "5.25");
        assert_eq!(format_value(Some("-3")), "-3");
    }

    #[test]
    fn compound_strings_sort_and_rejoin() {
        assert_eq!(format_value(Some("b;a;;c")), "a; b; c");
        assert_eq!(format_value(Some(" beta ; alpha ")), "alpha; beta");
    }

    #[test]
    fn format_value_is_idempotent() {
        for input in ["b;a;;c", "5.0", "", "alpha; beta", "-", "12.5", "x"] {
            let once = format_value(Some(input));
            let twice = format_value(Some(&once));
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn numbers_group_thousands() {
        assert_eq!(format_number(1234567.0, 0), "1,234,567");
        assert_eq!(format_number(1234567.85, 1), "1,234,567.9");
        assert_eq!(format_number(-1234.0, 0), "-1,234");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(f64::NAN, 0), "-");
    }

    #[test]
    fn dual_metric_resolution() {
        assert_eq!(resolve_dual_metric(&[], 0), RenderableStack::Placeholder);
        assert_eq!(
            resolve_dual_metric(&[5.0], 0),
            RenderableStack::Merged("5".to_string())
        );
        let stack = resolve_dual_metric(&[5.0, 7.0], 0);
        assert_eq!(
            stack,
            RenderableStack::Stacked {
                nt: "5".to_string(),
                nr: "7".to_string()
            }
        );
        assert_eq!(stack.row(DbType::Nt), "5");
        assert_eq!(stack.row(DbType::Nr), "7");
        assert!(stack.is_stacked());
    }
}
