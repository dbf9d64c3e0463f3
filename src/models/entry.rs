//! Ledger entries (cash in and out) and standalone expenses.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

use super::validation::{not_blank, positive_amount};
use super::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    #[serde(alias = "input", alias = "in")]
    Income,
    #[serde(alias = "output", alias = "out")]
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntityId,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub value: Decimal,
    pub entry_date: NaiveDate,
    #[serde(default)]
    pub category: Option<String>,
}

impl Entry {
    /// Value with sign: income positive, expense negative.
    pub fn signed_value(&self) -> Decimal {
        match self.kind {
            EntryKind::Income => self.value,
            EntryKind::Expense => -self.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    #[validate(custom = "not_blank", length(max = 255))]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[validate(custom = "positive_amount")]
    pub value: Decimal,
    pub entry_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: EntityId,
    pub description: String,
    pub value: Decimal,
    pub expense_date: NaiveDate,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    #[validate(custom = "not_blank", length(max = 255))]
    pub description: String,
    #[validate(custom = "positive_amount")]
    pub value: Decimal,
    pub expense_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn entry_kind_reads_backend_aliases() {
        let entry: Entry = serde_json::from_str(
            r#"{"id":1,"description":"Venda balcão","type":"input","value":"150.00","entryDate":"2024-05-02"}"#,
        )
        .unwrap();
        assert_eq!(entry.kind, EntryKind::Income);
        assert_eq!(entry.signed_value(), dec!(150.00));
    }

    #[test]
    fn expense_entries_are_negative() {
        let entry = Entry {
            id: 2,
            description: "Frete".into(),
            kind: EntryKind::Expense,
            value: dec!(40),
            entry_date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            category: None,
        };
        assert_eq!(entry.signed_value(), dec!(-40));
    }
}
