//! Purchase and sale extras: invoice attachments and status changes.

use std::path::Path;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::{info, instrument};
use validator::Validate;

use super::{echoed, Resource, ResourceApi};
use crate::errors::Result;
use crate::models::{EntityId, NewPurchase, OrderStatus, Purchase, PurchaseUpdate, Sale, SaleUpdate};

/// A file sent along with a purchase (usually the NF-e XML or PDF).
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file, guessing the content type from its extension.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let content_type = content_type_for(path);
        Ok(Self::new(file_name, content_type, Bytes::from(bytes)))
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("xml") => "application/xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

impl ResourceApi<Purchase> {
    /// `POST /purchases` as `multipart/form-data`: the payload as JSON in
    /// the `data` part and the attachment in the `file` part.
    #[instrument(skip(self, payload, attachment), fields(file = %attachment.file_name))]
    pub async fn create_with_attachment(
        &self,
        payload: &NewPurchase,
        attachment: Attachment,
    ) -> Result<Option<Purchase>> {
        payload.validate()?;
        let data = Part::text(serde_json::to_string(payload)?).mime_str("application/json")?;
        let file = Part::stream(attachment.bytes)
            .file_name(attachment.file_name)
            .mime_str(&attachment.content_type)?;
        let form = Form::new().part("data", data).part("file", file);

        let body = self.http.post_multipart_ack(Purchase::PATH, form).await?;
        self.invalidate_collections();
        info!("created with attachment");
        Ok(echoed(&body))
    }

    pub async fn update_status(&self, id: EntityId, status: OrderStatus) -> Result<Option<Purchase>> {
        self.update(id, &PurchaseUpdate::status(status)).await
    }
}

impl ResourceApi<Sale> {
    pub async fn update_status(&self, id: EntityId, status: OrderStatus) -> Result<Option<Sale>> {
        self.update(id, &SaleUpdate::status(status)).await
    }
}
