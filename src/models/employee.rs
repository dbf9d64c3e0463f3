use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{non_negative_amount, not_blank, TAX_DOCUMENT};
use super::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub salary: Decimal,
    #[serde(default)]
    pub hired_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(regex(path = "TAX_DOCUMENT", message = "Enter a valid CPF"))]
    pub document: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[validate(custom = "non_negative_amount")]
    pub salary: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hired_at: Option<NaiveDate>,
}
