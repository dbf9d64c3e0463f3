use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            meta: PageMeta::default(),
        }
    }

    pub fn total_items(&self) -> u64 {
        self.meta.total_items
    }
}

/// Parameters sent to a list endpoint: `skip`/`take` plus filter fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListParams {
    pub skip: u64,
    pub take: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    pub fn new(skip: u64, take: u64) -> Self {
        Self {
            skip,
            take,
            filters: BTreeMap::new(),
        }
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn is_unfiltered(&self) -> bool {
        self.filters.is_empty()
    }

    /// Query string pairs: `skip`, `take`, then filters in field order.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("skip".to_string(), self.skip.to_string()),
            ("take".to_string(), self.take.to_string()),
        ];
        query.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        query
    }

    /// Parameters of the next page with the same filters.
    pub fn next(&self) -> Self {
        Self {
            skip: self.skip.saturating_add(self.take),
            ..self.clone()
        }
    }
}

/// Date range used by period filters and period searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Period {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Both ends present.
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn to_query(&self) -> Option<Vec<(String, String)>> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(vec![
                ("startDate".to_string(), start.format(DATE_FORMAT).to_string()),
                ("endDate".to_string(), end.format(DATE_FORMAT).to_string()),
            ]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_starts_with_skip_and_take() {
        let params = ListParams::new(10, 5).with_filter("status", "approved");
        assert_eq!(
            params.to_query(),
            vec![
                ("skip".to_string(), "10".to_string()),
                ("take".to_string(), "5".to_string()),
                ("status".to_string(), "approved".to_string()),
            ]
        );
    }

    #[test]
    fn next_keeps_filters() {
        let params = ListParams::new(0, 5).with_filter("supplier", "3");
        let next = params.next();
        assert_eq!(next.skip, 5);
        assert_eq!(next.take, 5);
        assert_eq!(next.filters.get("supplier").map(String::as_str), Some("3"));
    }

    #[test]
    fn next_saturates_at_the_end_of_the_range() {
        let params = ListParams::new(u64::MAX - 2, 5);
        assert_eq!(params.next().skip, u64::MAX);
    }

    #[test]
    fn period_requires_both_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        assert!(Period::new(start, end).is_complete());
        assert!(!Period { start: Some(start), end: None }.is_complete());
        assert_eq!(Period { start: None, end: Some(end) }.to_query(), None);
        assert_eq!(
            Period::new(start, end).to_query().unwrap(),
            vec![
                ("startDate".to_string(), "2024-01-01".to_string()),
                ("endDate".to_string(), "2024-01-31".to_string()),
            ]
        );
    }

    #[test]
    fn page_deserializes_backend_shape() {
        let page: Page<serde_json::Value> =
            serde_json::from_str(r#"{"data":[{"id":1}],"meta":{"totalItems":12}}"#).unwrap();
        assert_eq!(page.total_items(), 12);
        assert_eq!(page.data.len(), 1);
    }
}
