//! Payments against payables and receivables.

use serde_json::json;
use tracing::{info, instrument};

use super::{echoed, id_query, Resource, ResourceApi};
use crate::errors::Result;
use crate::models::{BillPayment, BillStatus, PartialPayment};

impl<R> ResourceApi<R>
where
    R: Resource + BillPayment,
{
    /// Register a partial payment: `PUT {PATH}/payment?id=`.
    ///
    /// A payment that is not positive or that reaches the bill total is
    /// rejected before any request is made.
    #[instrument(skip(self, bill), fields(resource = R::NAME, id = bill.id()))]
    pub async fn register_payment(&self, bill: &R, payment: &PartialPayment) -> Result<Option<R>> {
        payment.validate_against(bill)?;
        let path = format!("{}/payment", R::PATH);
        let body = self.http.put_ack(&path, &id_query(bill.id()), payment).await?;
        self.invalidate_record(bill.id());
        info!(payed_value = %payment.payed_value, "payment registered");
        Ok(echoed(&body))
    }

    /// Mark the bill as fully paid.
    #[instrument(skip(self, bill), fields(resource = R::NAME, id = bill.id()))]
    pub async fn settle(&self, bill: &R) -> Result<Option<R>> {
        let body = json!({
            "status": BillStatus::Paid,
            "payedValue": bill.total_value(),
        });
        let answer = self.http.put_ack(R::PATH, &id_query(bill.id()), &body).await?;
        self.invalidate_record(bill.id());
        info!("settled");
        Ok(echoed(&answer))
    }
}
