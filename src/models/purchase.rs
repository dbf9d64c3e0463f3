use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::product::Product;
use super::status::OrderStatus;
use super::supplier::Supplier;
use super::validation::{positive_amount, CODE, NFE_KEY};
use super::EntityId;

/// A purchase order as returned by the backend, with its supplier and
/// product embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: EntityId,
    #[serde(default)]
    pub code: Option<String>,
    /// NF-e access key of the invoice, when one was issued.
    #[serde(default)]
    pub nfe: Option<String>,
    pub supplier: Supplier,
    pub product: Product,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    pub total_value: Decimal,
    pub status: OrderStatus,
    pub purchase_date: NaiveDate,
    /// File name of the attached invoice, if any.
    #[serde(default)]
    pub attachment: Option<String>,
}

impl Purchase {
    /// Total value when the order counts towards totals, zero otherwise.
    pub fn effective_total(&self) -> Decimal {
        if self.status.counts_towards_totals() {
            self.total_value
        } else {
            Decimal::ZERO
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
    #[validate(range(min = 1, message = "Select a supplier"))]
    pub supplier_id: i64,
    #[validate(range(min = 1, message = "Select a product"))]
    pub product_id: i64,
    #[validate(regex(path = "CODE", message = "Code may only contain letters, digits and dashes"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[validate(regex(path = "NFE_KEY", message = "NF-e key must have 44 digits"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfe: Option<String>,
    #[validate(custom = "positive_amount")]
    pub quantity: Decimal,
    #[validate(custom = "positive_amount")]
    pub unit_value: Decimal,
    pub purchase_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl NewPurchase {
    pub fn total_value(&self) -> Decimal {
        self.quantity * self.unit_value
    }
}

/// Partial update: only the fields set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<EntityId>,
    #[validate(regex(path = "CODE", message = "Code may only contain letters, digits and dashes"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[validate(regex(path = "NFE_KEY", message = "NF-e key must have 44 digits"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfe: Option<String>,
    #[validate(custom = "positive_amount")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[validate(custom = "positive_amount")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl PurchaseUpdate {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}
