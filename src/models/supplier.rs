use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{not_blank, CNPJ, PHONE};
use super::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub cnpj: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    #[validate(custom = "not_blank", length(max = 120, message = "Name is too long"))]
    pub name: String,
    #[validate(regex(path = "CNPJ", message = "Enter a valid CNPJ"))]
    pub cnpj: String,
    #[validate(email(message = "Enter a valid e-mail"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[validate(regex(path = "PHONE", message = "Enter a valid phone number"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}
