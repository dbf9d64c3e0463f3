use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{not_blank, PHONE, TAX_DOCUMENT};
use super::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: EntityId,
    pub name: String,
    /// CPF or CNPJ.
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Customer form. Also used for full updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    #[validate(custom = "not_blank", length(max = 120, message = "Name is too long"))]
    pub name: String,
    #[validate(regex(path = "TAX_DOCUMENT", message = "Enter a valid CPF or CNPJ"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[validate(email(message = "Enter a valid e-mail"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[validate(regex(path = "PHONE", message = "Enter a valid phone number"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl NewCustomer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            document: None,
            email: None,
            phone: None,
            address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_rules() {
        let mut form = NewCustomer::named("Mercado Verde");
        form.document = Some("123.456.789-09".into());
        form.email = Some("contato@mercadoverde.com.br".into());
        assert!(form.validate().is_ok());

        form.document = Some("123".into());
        form.email = Some("not-an-email".into());
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("document"));
        assert!(fields.contains_key("email"));

        assert!(NewCustomer::named("   ").validate().is_err());
    }

    #[test]
    fn optional_fields_are_omitted_on_the_wire() {
        let json = serde_json::to_value(NewCustomer::named("Ana")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Ana" }));
    }
}
