use bytes::Bytes;
use tracing::instrument;
use validator::Validate;

use super::{id_query, Resource, ResourceApi};
use crate::errors::Result;
use crate::models::{EntityId, Entry};
use crate::reports::{ensure_pdf, CustomReceipt};

impl ResourceApi<Entry> {
    /// Render a free-form receipt: `POST /entry/receipt/custom`.
    #[instrument(skip(self, receipt))]
    pub async fn custom_receipt(&self, receipt: &CustomReceipt) -> Result<Bytes> {
        receipt.validate()?;
        let path = format!("{}/receipt/custom", Entry::PATH);
        let pdf = self.http.post_for_bytes(&path, receipt).await?;
        ensure_pdf(&pdf)?;
        Ok(pdf)
    }

    /// Receipt of a recorded entry: `GET /entry/receipt?id=`.
    #[instrument(skip(self))]
    pub async fn receipt(&self, id: EntityId) -> Result<Bytes> {
        let path = format!("{}/receipt", Entry::PATH);
        let pdf = self.http.get_bytes(&path, &id_query(id)).await?;
        ensure_pdf(&pdf)?;
        Ok(pdf)
    }
}
