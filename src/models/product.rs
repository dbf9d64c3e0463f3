use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::supplier::Supplier;
use super::validation::{non_negative_amount, not_blank, positive_amount, CODE};
use super::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub unit_price: Decimal,
    #[serde(default)]
    pub stock: Decimal,
    #[serde(default)]
    pub supplier: Option<Supplier>,
}

impl Product {
    /// Stock valued at unit price.
    pub fn stock_value(&self) -> Decimal {
        self.stock * self.unit_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(regex(path = "CODE", message = "Code may only contain letters, digits and dashes"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(custom = "positive_amount")]
    pub unit_price: Decimal,
    #[validate(custom = "non_negative_amount")]
    pub stock: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<EntityId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn stock_value() {
        let product = Product {
            id: 1,
            name: "Adubo orgânico 5kg".into(),
            code: Some("ADB-5".into()),
            description: None,
            unit_price: dec!(32.90),
            stock: dec!(10),
            supplier: None,
        };
        assert_eq!(product.stock_value(), dec!(329.00));
    }

    #[test]
    fn price_must_be_positive() {
        let form = NewProduct {
            name: "Semente".into(),
            code: Some("SEM 01".into()),
            description: None,
            unit_price: dec!(0),
            stock: dec!(-1),
            supplier_id: None,
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("unit_price"));
        assert!(fields.contains_key("stock"));
        assert!(fields.contains_key("code"));
    }
}
