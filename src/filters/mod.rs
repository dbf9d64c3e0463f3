//! Filter bar and pagination state of a table, and the list parameters
//! derived from them.

mod page;
mod rules;

pub use page::PageState;
pub use rules::{EntityType, FilterOption, FilterRules, END_DATE, START_DATE};

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::errors::ClientError;
use crate::models::page::DATE_FORMAT;
use crate::models::{ListParams, Period};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("filter '{option}' is not offered for {entity}")]
    Unavailable {
        option: FilterOption,
        entity: EntityType,
    },
    #[error("unknown filter field '{0}'")]
    UnknownField(String),
    #[error("filter '{0}' is not active")]
    Inactive(FilterOption),
    #[error("{0} listings have no filters")]
    NoFilters(&'static str),
}

impl From<FilterError> for ClientError {
    fn from(err: FilterError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

/// Active filters and their values for one table.
///
/// Enabling an option forces every option it excludes off, so two
/// mutually-exclusive options are never active at once.
#[derive(Debug, Clone)]
pub struct FilterBar {
    entity: EntityType,
    rules: &'static FilterRules,
    active: BTreeSet<FilterOption>,
    values: BTreeMap<&'static str, String>,
}

impl FilterBar {
    pub fn new(entity: EntityType) -> Self {
        Self {
            entity,
            rules: FilterRules::for_entity(entity),
            active: BTreeSet::new(),
            values: BTreeMap::new(),
        }
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    pub fn rules(&self) -> &'static FilterRules {
        self.rules
    }

    pub fn is_active(&self, option: FilterOption) -> bool {
        self.active.contains(&option)
    }

    pub fn active(&self) -> impl Iterator<Item = FilterOption> + '_ {
        self.active.iter().copied()
    }

    /// Greyed out: not offered, or excluded by an active option.
    pub fn is_disabled(&self, option: FilterOption) -> bool {
        !self.rules.is_available(option)
            || self.active.iter().any(|&a| self.rules.excludes(a, option))
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Flip an option. Returns whether it is active afterwards.
    pub fn toggle(&mut self, option: FilterOption) -> Result<bool, FilterError> {
        if self.is_active(option) {
            self.deactivate(option);
            Ok(false)
        } else {
            self.activate(option)?;
            Ok(true)
        }
    }

    pub fn activate(&mut self, option: FilterOption) -> Result<(), FilterError> {
        if !self.rules.is_available(option) {
            return Err(FilterError::Unavailable {
                option,
                entity: self.entity,
            });
        }
        let excluded: Vec<FilterOption> = self.rules.excluded_by(option).collect();
        for other in excluded {
            if self.is_active(other) {
                debug!(%option, %other, "forcing excluded filter off");
                self.deactivate(other);
            }
        }
        self.active.insert(option);
        Ok(())
    }

    /// Turn an option off and drop its values.
    pub fn deactivate(&mut self, option: FilterOption) {
        self.active.remove(&option);
        for field in option.fields() {
            self.values.remove(field);
        }
    }

    /// Set a field of an active option. An empty value unsets it.
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) -> Result<(), FilterError> {
        let option =
            FilterOption::for_field(field).ok_or_else(|| FilterError::UnknownField(field.into()))?;
        if !self.is_active(option) {
            return Err(FilterError::Inactive(option));
        }
        let key = option
            .fields()
            .iter()
            .copied()
            .find(|f| *f == field)
            .ok_or_else(|| FilterError::UnknownField(field.into()))?;

        let value: String = value.into();
        let value = value.trim();
        if value.is_empty() {
            self.values.remove(key);
        } else {
            self.values.insert(key, value.to_string());
        }
        Ok(())
    }

    pub fn set_period(&mut self, period: Period) -> Result<(), FilterError> {
        let format = |date: Option<NaiveDate>| {
            date.map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        self.set_value(START_DATE, format(period.start))?;
        self.set_value(END_DATE, format(period.end))
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.values.clear();
    }

    /// Parameters for the list endpoint. Inactive options and empty values
    /// never appear, and the period only when both ends are set.
    pub fn query(&self, page: &PageState) -> ListParams {
        let mut params = ListParams::new(page.skip(), page.take());
        for option in &self.active {
            match option {
                FilterOption::Period => {
                    if let (Some(start), Some(end)) =
                        (self.values.get(START_DATE), self.values.get(END_DATE))
                    {
                        params.filters.insert(START_DATE.to_string(), start.clone());
                        params.filters.insert(END_DATE.to_string(), end.clone());
                    }
                }
                other => {
                    for field in other.fields() {
                        if let Some(value) = self.values.get(field) {
                            params.filters.insert(field.to_string(), value.clone());
                        }
                    }
                }
            }
        }
        params
    }
}
