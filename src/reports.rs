//! Receipt payloads and PDF handling.

use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::errors::{ClientError, Result};
use crate::models::validation::{not_blank, positive_amount};

const PDF_MAGIC: &[u8] = b"%PDF";

/// Free-form receipt rendered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomReceipt {
    #[validate(custom = "not_blank")]
    pub payer: String,
    #[validate(custom = "not_blank")]
    pub description: String,
    #[validate(custom = "positive_amount")]
    pub value: Decimal,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate]
    pub items: Vec<ReceiptItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    #[validate(custom = "not_blank")]
    pub description: String,
    #[validate(custom = "positive_amount")]
    pub quantity: Decimal,
    #[validate(custom = "positive_amount")]
    pub unit_value: Decimal,
}

impl ReceiptItem {
    pub fn total(&self) -> Decimal {
        self.quantity * self.unit_value
    }
}

impl CustomReceipt {
    /// Sum of the items, or the declared value when there are none.
    pub fn total(&self) -> Decimal {
        if self.items.is_empty() {
            self.value
        } else {
            self.items.iter().map(ReceiptItem::total).sum()
        }
    }
}

pub fn ensure_pdf(bytes: &[u8]) -> Result<()> {
    if bytes.starts_with(PDF_MAGIC) {
        Ok(())
    } else {
        Err(ClientError::Decode("expected a PDF document".into()))
    }
}

/// Write a receipt to disk, creating parent directories.
pub async fn save_receipt(bytes: &[u8], path: &Path) -> Result<()> {
    ensure_pdf(bytes)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    info!(path = %path.display(), size = bytes.len(), "receipt saved");
    Ok(())
}
