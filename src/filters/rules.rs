//! Which filters each table offers, and which of them exclude each other.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Tables that carry a filter bar.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityType {
    Purchase,
    Sale,
    Payable,
    Receivable,
    Entry,
    Expense,
}

/// The closed set of filter checkboxes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FilterOption {
    Period,
    Supplier,
    Customer,
    Nfe,
    Code,
    Status,
    Order,
}

pub const START_DATE: &str = "startDate";
pub const END_DATE: &str = "endDate";

impl FilterOption {
    /// Query fields carried by the option.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            FilterOption::Period => &[START_DATE, END_DATE],
            FilterOption::Supplier => &["supplier"],
            FilterOption::Customer => &["customer"],
            FilterOption::Nfe => &["nfe"],
            FilterOption::Code => &["code"],
            FilterOption::Status => &["status"],
            FilterOption::Order => &["order"],
        }
    }

    /// Option owning a query field.
    pub fn for_field(field: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        FilterOption::iter().find(|option| option.fields().contains(&field))
    }
}

/// Filter table for one entity type: the options offered and the pairs
/// that cannot be active together. Pairs are symmetric.
#[derive(Debug, PartialEq, Eq)]
pub struct FilterRules {
    pub available: &'static [FilterOption],
    pub exclusions: &'static [(FilterOption, FilterOption)],
}

use FilterOption::*;

static PURCHASE: FilterRules = FilterRules {
    available: &[Period, Supplier, Nfe, Code, Status, Order],
    exclusions: &[
        (Nfe, Period),
        (Nfe, Supplier),
        (Nfe, Customer),
        (Nfe, Code),
        (Code, Period),
        (Code, Supplier),
        (Code, Customer),
    ],
};

static SALE: FilterRules = FilterRules {
    available: &[Period, Customer, Nfe, Code, Status, Order],
    exclusions: &[
        (Nfe, Period),
        (Nfe, Supplier),
        (Nfe, Customer),
        (Nfe, Code),
        (Code, Period),
        (Code, Supplier),
        (Code, Customer),
    ],
};

static PAYABLE: FilterRules = FilterRules {
    available: &[Supplier, Period, Status, Order],
    exclusions: &[],
};

static RECEIVABLE: FilterRules = FilterRules {
    available: &[Customer, Period, Status, Order],
    exclusions: &[],
};

static LEDGER: FilterRules = FilterRules {
    available: &[Period, Order],
    exclusions: &[],
};

impl FilterRules {
    pub fn for_entity(entity: EntityType) -> &'static FilterRules {
        match entity {
            EntityType::Purchase => &PURCHASE,
            EntityType::Sale => &SALE,
            EntityType::Payable => &PAYABLE,
            EntityType::Receivable => &RECEIVABLE,
            EntityType::Entry | EntityType::Expense => &LEDGER,
        }
    }

    pub fn is_available(&self, option: FilterOption) -> bool {
        self.available.contains(&option)
    }

    pub fn excludes(&self, a: FilterOption, b: FilterOption) -> bool {
        self.exclusions
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Options that `option` forces off when enabled.
    pub fn excluded_by(&self, option: FilterOption) -> impl Iterator<Item = FilterOption> + '_ {
        self.available
            .iter()
            .copied()
            .filter(move |&other| self.excludes(option, other))
    }
}
