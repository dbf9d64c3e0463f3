use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Workflow status of purchases and sales.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Approved,
    #[serde(alias = "cancelled")]
    #[strum(to_string = "canceled", serialize = "cancelled")]
    Canceled,
}

impl OrderStatus {
    /// Canceled orders do not count towards totals.
    pub fn counts_towards_totals(&self) -> bool {
        !matches!(self, OrderStatus::Canceled)
    }
}

/// Status of payables and receivables.
///
/// The backend is loose with these strings, so anything unrecognised is
/// kept verbatim in [`BillStatus::Other`] and sent back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillStatus {
    Open,
    Partial,
    Paid,
    Overdue,
    Other(String),
}

impl BillStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BillStatus::Open => "open",
            BillStatus::Partial => "partial",
            BillStatus::Paid => "paid",
            BillStatus::Overdue => "overdue",
            BillStatus::Other(raw) => raw,
        }
    }

    /// Anything not yet settled.
    pub fn is_outstanding(&self) -> bool {
        !matches!(self, BillStatus::Paid)
    }
}

impl From<String> for BillStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" | "pending" | "opened" => BillStatus::Open,
            "partial" | "partially_paid" | "partially-paid" => BillStatus::Partial,
            "paid" | "payed" => BillStatus::Paid,
            "overdue" | "late" => BillStatus::Overdue,
            _ => BillStatus::Other(raw),
        }
    }
}

impl From<&str> for BillStatus {
    fn from(raw: &str) -> Self {
        BillStatus::from(raw.to_string())
    }
}

impl From<BillStatus> for String {
    fn from(status: BillStatus) -> Self {
        match status {
            BillStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
