//! Payables and receivables, and the partial payment form shared by both.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::customer::Customer;
use super::status::BillStatus;
use super::supplier::Supplier;
use super::validation::{not_blank, positive_amount};
use super::EntityId;

/// Common view over payables and receivables.
pub trait BillPayment {
    fn total_value(&self) -> Decimal;
    fn payed_value(&self) -> Decimal;
    fn bill_status(&self) -> &BillStatus;
    fn due_date(&self) -> NaiveDate;

    /// Amount still owed, never negative.
    fn remaining(&self) -> Decimal {
        (self.total_value() - self.payed_value()).max(Decimal::ZERO)
    }

    fn is_overdue_on(&self, today: NaiveDate) -> bool {
        match self.bill_status() {
            BillStatus::Overdue => true,
            BillStatus::Paid => false,
            _ => self.due_date() < today && !self.remaining().is_zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payable {
    pub id: EntityId,
    pub description: String,
    #[serde(default)]
    pub supplier: Option<Supplier>,
    pub total_value: Decimal,
    #[serde(default)]
    pub payed_value: Decimal,
    pub due_date: NaiveDate,
    pub status: BillStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receivable {
    pub id: EntityId,
    pub description: String,
    #[serde(default)]
    pub customer: Option<Customer>,
    pub total_value: Decimal,
    #[serde(default)]
    pub payed_value: Decimal,
    pub due_date: NaiveDate,
    pub status: BillStatus,
}

macro_rules! impl_bill_payment {
    ($($ty:ty),*) => {$(
        impl BillPayment for $ty {
            fn total_value(&self) -> Decimal {
                self.total_value
            }
            fn payed_value(&self) -> Decimal {
                self.payed_value
            }
            fn bill_status(&self) -> &BillStatus {
                &self.status
            }
            fn due_date(&self) -> NaiveDate {
                self.due_date
            }
        }
    )*};
}

impl_bill_payment!(Payable, Receivable);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPayable {
    #[validate(custom = "not_blank")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<EntityId>,
    #[validate(custom = "positive_amount")]
    pub total_value: Decimal,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BillStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewReceivable {
    #[validate(custom = "not_blank")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<EntityId>,
    #[validate(custom = "positive_amount")]
    pub total_value: Decimal,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BillStatus>,
}

/// A partial payment against a bill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PartialPayment {
    #[validate(custom = "positive_amount")]
    pub payed_value: Decimal,
}

impl PartialPayment {
    pub fn new(payed_value: Decimal) -> Self {
        Self { payed_value }
    }

    /// Field rules plus the check against the bill: a partial payment must
    /// stay below the bill total. Settling in full goes through `settle`.
    pub fn validate_against<B: BillPayment + ?Sized>(&self, bill: &B) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if self.payed_value >= bill.total_value() {
            let mut err = ValidationError::new("payed_value_exceeds_total");
            err.message = Some("Paid value must be lower than the total value".into());
            err.add_param("total".into(), &bill.total_value().to_string());
            errors.add("payed_value", err);
        }
        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payable(total: Decimal, payed: Decimal, status: &str) -> Payable {
        Payable {
            id: 1,
            description: "Energia".into(),
            supplier: None,
            total_value: total,
            payed_value: payed,
            due_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            status: BillStatus::from(status),
        }
    }

    #[test]
    fn payment_must_stay_below_total() {
        let bill = payable(dec!(100), dec!(0), "open");
        assert!(PartialPayment::new(dec!(99.99)).validate_against(&bill).is_ok());

        let errors = PartialPayment::new(dec!(100)).validate_against(&bill).unwrap_err();
        assert!(errors.field_errors().contains_key("payed_value"));
        assert!(PartialPayment::new(dec!(150)).validate_against(&bill).is_err());
        assert!(PartialPayment::new(dec!(0)).validate_against(&bill).is_err());
    }

    #[test]
    fn remaining_and_overdue() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
        let bill = payable(dec!(100), dec!(30), "partial");
        assert_eq!(bill.remaining(), dec!(70));
        assert!(bill.is_overdue_on(today));

        let paid = payable(dec!(100), dec!(100), "paid");
        assert!(paid.remaining().is_zero());
        assert!(!paid.is_overdue_on(today));
    }

    #[test]
    fn missing_payed_value_defaults_to_zero() {
        let bill: Receivable = serde_json::from_str(
            r#"{"id":3,"description":"Venda 12","totalValue":"80","dueDate":"2024-07-01","status":"pending"}"#,
        )
        .unwrap();
        assert_eq!(bill.payed_value, Decimal::ZERO);
        assert_eq!(bill.status, BillStatus::Open);
    }
}
