//! Turns raw query-string filters into a normalized [`SubmissionQuery`].
//!
//! Malformed identifiers and dates never fail a report: the offending field is
//! dropped and the report runs as if it had not been supplied.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::store::operations::submissions::SubmissionQuery;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub worker: Option<String>,
    pub store: Option<String>,
    pub today_only: Option<String>,
}

impl FilterParams {
    /// `today` is the current calendar day in the reporting offset; it only
    /// matters when `todayOnly=true` pins the range to a single day.
    pub fn normalize(&self, today: NaiveDate) -> SubmissionQuery {
        let (date_from, date_to) = if self.today_only.as_deref() == Some("true") {
            let day = today.format(DATE_FORMAT).to_string();
            (Some(day.clone()), Some(day))
        } else {
            (
                normalize_date("startDate", self.start_date.as_deref()),
                normalize_date("endDate", self.end_date.as_deref()),
            )
        };

        SubmissionQuery {
            date_from,
            date_to,
            worker_id: normalize_id("worker", self.worker.as_deref()),
            store_id: normalize_id("store", self.store.as_deref()),
        }
    }
}

/// Canonical (lowercase, hyphenated) form of an entity id, or `None` when the
/// value is absent, blank or not a valid id.
pub fn normalize_id(field: &str, raw: Option<&str>) -> Option<String> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty())?;
    match uuid::Uuid::parse_str(value) {
        Ok(id) => Some(id.to_string()),
        Err(_) => {
            tracing::debug!(field, value, "Ignoring malformed id filter");
            None
        }
    }
}

pub fn normalize_date(field: &str, raw: Option<&str>) -> Option<String> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty())?;
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date.format(DATE_FORMAT).to_string()),
        Err(_) => {
            tracing::debug!(field, value, "Ignoring malformed date filter");
            None
        }
    }
}

pub fn is_valid_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn absent_fields_mean_unbounded() {
        let query = FilterParams::default().normalize(today());
        assert_eq!(query, SubmissionQuery::default());
    }

    #[test]
    fn malformed_ids_are_dropped_not_rejected() {
        let params = FilterParams {
            worker: Some("not-an-id".to_string()),
            store: Some("   ".to_string()),
            ..Default::default()
        };
        let query = params.normalize(today());
        assert!(query.worker_id.is_none());
        assert!(query.store_id.is_none());
    }

    #[test]
    fn ids_are_canonicalized() {
        let params = FilterParams {
            worker: Some(" 67E55044-10B1-426F-9247-BB680E5FE0C8 ".to_string()),
            ..Default::default()
        };
        let query = params.normalize(today());
        assert_eq!(
            query.worker_id.as_deref(),
            Some("67e55044-10b1-426f-9247-bb680e5fe0c8")
        );
    }

    #[test]
    fn date_bounds_pass_through_and_garbage_is_ignored() {
        let params = FilterParams {
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("January".to_string()),
            ..Default::default()
        };
        let query = params.normalize(today());
        assert_eq!(query.date_from.as_deref(), Some("2024-01-01"));
        assert!(query.date_to.is_none());
    }

    #[test]
    fn today_only_overrides_the_range() {
        let params = FilterParams {
            start_date: Some("2020-01-01".to_string()),
            today_only: Some("true".to_string()),
            ..Default::default()
        };
        let query = params.normalize(today());
        assert_eq!(query.date_from.as_deref(), Some("2024-03-09"));
        assert_eq!(query.date_to.as_deref(), Some("2024-03-09"));
    }

    #[test]
    fn date_validation_requires_zero_padding() {
        assert!(is_valid_date("2024-01-05"));
        assert!(!is_valid_date("2024-1-5"));
        assert!(!is_valid_date("2024-02-30"));
    }
}
