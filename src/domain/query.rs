use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::model::Order;
use crate::utils::error::{AnalyticsError, Result};
use crate::utils::validation::{parse_iso_date, validate_date_order, validate_non_empty_string};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Inclusive calendar-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        validate_date_order("query.date_range", start, end)?;
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_iso_date("query.start_date", start)?;
        let end = parse_iso_date("query.end_date", end)?;
        Self::new(start, end)
    }

    /// The `days`-day window ending on `today`, both ends included.
    pub fn last_days(today: NaiveDate, days: u32) -> Result<Self> {
        let span = Days::new(u64::from(days.max(1)) - 1);
        let start =
            today
                .checked_sub_days(span)
                .ok_or_else(|| AnalyticsError::InvalidConfigValueError {
                    field: "query.last_days".to_string(),
                    value: days.to_string(),
                    reason: format!("Window reaches before the earliest date ending {}", today),
                })?;
        Ok(Self { start, end: today })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// First day after the window, used as the exclusive upper bound of API filters.
    pub fn end_exclusive(&self) -> NaiveDate {
        self.end.succ_opt().unwrap_or(self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesQuery {
    pub seller_id: String,
    pub range: DateRange,
}

impl SalesQuery {
    pub fn new(seller_id: impl Into<String>, range: DateRange) -> Result<Self> {
        let seller_id = seller_id.into();
        validate_non_empty_string("query.seller_id", &seller_id)?;
        Ok(Self {
            seller_id: seller_id.trim().to_string(),
            range,
        })
    }

    /// Orders without a seller column are assumed to be pre-scoped by the source.
    pub fn matches(&self, order: &Order) -> bool {
        let seller_ok = order
            .seller_id
            .as_deref()
            .map_or(true, |id| id == self.seller_id);
        let date_ok = order
            .sale_date()
            .is_some_and(|date| self.range.contains(date));
        seller_ok && date_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn order(seller: Option<&str>, created_at: &str) -> Order {
        serde_json::from_value(json!({
            "id": "o",
            "seller_id": seller,
            "created_at": created_at,
            "amount": 1
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_range() {
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end_exclusive(), date(2024, 2, 1));
        assert!(DateRange::parse("2024-02-01", "2024-01-01").is_err());
        assert!(DateRange::parse("yesterday", "2024-01-01").is_err());
    }

    #[test]
    fn test_last_days_is_inclusive() {
        let range = DateRange::last_days(date(2024, 3, 30), 30).unwrap();
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2024, 3, 30));

        let single = DateRange::last_days(date(2024, 3, 30), 0).unwrap();
        assert_eq!(single.start, single.end);
    }

    #[test]
    fn test_last_days_out_of_calendar_is_error() {
        let err = DateRange::last_days(date(2024, 6, 30), u32::MAX).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_query_matches_seller_and_range() {
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        let query = SalesQuery::new("seller-1", range).unwrap();

        assert!(query.matches(&order(Some("seller-1"), "2024-01-31T23:59:59Z")));
        assert!(query.matches(&order(None, "2024-01-01T00:00:00Z")));
        assert!(!query.matches(&order(Some("seller-2"), "2024-01-15T12:00:00Z")));
        assert!(!query.matches(&order(Some("seller-1"), "2024-02-01T00:00:00Z")));
        assert!(!query.matches(&order(Some("seller-1"), "not-a-date")));
    }

    #[test]
    fn test_query_rejects_blank_seller() {
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert!(SalesQuery::new("  ", range).is_err());
    }
}
