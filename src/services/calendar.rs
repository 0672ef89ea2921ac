use chrono::{Datelike, Month, NaiveDate};

use crate::models::ThemeCatalog;

/// List size when the caller picks a theme instead of a month
pub const THEMED_LIST_SIZE: usize = 31;

/// What to ask the discovery engine for, and how to label it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPlan {
    pub theme: String,
    pub target: usize,
    pub label: String,
}

/// Plans a list from an explicit theme, or else from a month name.
///
/// A blank or unrecognised month falls back to the month of `today`. The target
/// for a month is its number of days in `today`'s year.
pub fn plan(
    catalog: &ThemeCatalog,
    month: Option<&str>,
    theme: Option<&str>,
    today: NaiveDate,
) -> ListPlan {
    if let Some(theme) = theme.map(str::trim).filter(|t| !t.is_empty()) {
        return ListPlan {
            theme: theme.to_string(),
            target: THEMED_LIST_SIZE,
            label: format!("Theme: {}", theme),
        };
    }

    let month_name = month.map(str::trim).filter(|m| !m.is_empty());
    let month_number = match month_name.map(parse_month) {
        Some(Some(number)) => number,
        Some(None) => {
            tracing::warn!(month = ?month_name, "Unrecognised month, using current month");
            today.month()
        }
        None => today.month(),
    };

    ListPlan {
        theme: catalog.month_theme(month_number).to_string(),
        target: days_in_month(today.year(), month_number),
        label: month_name.unwrap_or("Current Month").to_string(),
    }
}

/// 1-based month number for an English month name, full or abbreviated
pub fn parse_month(name: &str) -> Option<u32> {
    name.trim()
        .parse::<Month>()
        .ok()
        .map(|month| month.number_from_month())
}

pub fn days_in_month(year: i32, month: u32) -> usize {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as usize,
        _ => THEMED_LIST_SIZE,
    }
}

/// Caller-facing notice when discovery came back short
pub fn shortfall_message(found: usize, target: usize) -> Option<String> {
    (found < target).then(|| {
        format!(
            "There are only {} movies matching your criteria. Please adjust the filters \
             (e.g., year range or genre) to find more results.",
            found
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_theme_takes_precedence_over_month() {
        let catalog = ThemeCatalog::default();
        let plan = plan(&catalog, Some("March"), Some("Christmas"), date(2024, 6, 1));

        assert_eq!(
            plan,
            ListPlan {
                theme: "Christmas".to_string(),
                target: 31,
                label: "Theme: Christmas".to_string(),
            }
        );
    }

    #[test]
    fn test_month_maps_to_seasonal_theme_and_length() {
        let catalog = ThemeCatalog::default();

        let october = plan(&catalog, Some("October"), None, date(2024, 6, 1));
        assert_eq!(october.theme, "Halloween");
        assert_eq!(october.target, 31);
        assert_eq!(october.label, "October");

        let june = plan(&catalog, Some("june"), Some("  "), date(2024, 1, 1));
        assert_eq!(june.theme, "Summer");
        assert_eq!(june.target, 30);
    }

    #[test]
    fn test_february_length_follows_current_year() {
        let catalog = ThemeCatalog::default();

        assert_eq!(plan(&catalog, Some("February"), None, date(2024, 5, 1)).target, 29);
        assert_eq!(plan(&catalog, Some("February"), None, date(2025, 5, 1)).target, 28);
    }

    #[test]
    fn test_missing_or_invalid_month_uses_today() {
        let catalog = ThemeCatalog::default();

        let current = plan(&catalog, None, None, date(2024, 12, 3));
        assert_eq!(current.theme, "Christmas");
        assert_eq!(current.target, 31);
        assert_eq!(current.label, "Current Month");

        let invalid = plan(&catalog, Some("Smarch"), None, date(2024, 11, 3));
        assert_eq!(invalid.theme, "Autumn");
        assert_eq!(invalid.target, 30);
        assert_eq!(invalid.label, "Smarch");
    }

    #[test]
    fn test_parse_month_variants() {
        assert_eq!(parse_month("January"), Some(1));
        assert_eq!(parse_month("dec"), Some(12));
        assert_eq!(parse_month(""), None);
    }

    #[test]
    fn test_shortfall_message() {
        assert_eq!(shortfall_message(31, 31), None);
        assert_eq!(shortfall_message(40, 31), None);

        let message = shortfall_message(12, 31).unwrap();
        assert!(message.starts_with("There are only 12 movies matching your criteria."));
    }
}
