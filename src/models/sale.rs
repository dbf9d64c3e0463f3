use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::customer::Customer;
use super::product::Product;
use super::status::OrderStatus;
use super::validation::{positive_amount, CODE, NFE_KEY};
use super::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: EntityId,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub nfe: Option<String>,
    pub customer: Customer,
    pub product: Product,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    pub total_value: Decimal,
    pub status: OrderStatus,
    pub sale_date: NaiveDate,
}

impl Sale {
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
pub struct NewSale {
    #[validate(range(min = 1, message = "Select a customer"))]
    pub customer_id: i64,
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
    pub sale_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<EntityId>,
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
    pub sale_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl SaleUpdate {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn form() -> NewSale {
        NewSale {
            customer_id: 7,
            product_id: 2,
            code: None,
            nfe: None,
            quantity: dec!(2),
            unit_value: dec!(49.90),
            sale_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            status: None,
        }
    }

    #[test]
    fn customer_must_be_selected() {
        assert!(form().validate().is_ok());

        let mut form = form();
        form.customer_id = 0;
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        let customer = fields.get("customer_id").expect("customer_id rejected");
        assert_eq!(
            customer[0].message.as_deref(),
            Some("Select a customer")
        );
        assert!(!fields.contains_key("product_id"));
    }

    #[test]
    fn product_must_be_selected() {
        let mut form = form();
        form.product_id = -1;
        assert!(form.validate().unwrap_err().field_errors().contains_key("product_id"));
    }

    #[test]
    fn status_update_sends_only_status() {
        let json = serde_json::to_value(SaleUpdate::status(OrderStatus::Canceled)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "canceled" }));
    }
}
