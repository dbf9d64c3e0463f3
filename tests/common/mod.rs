#![allow(dead_code)]

use std::sync::Arc;

use ecogest::auth::{MemoryTokenStore, TokenStore};
use ecogest::config::AppConfig;
use ecogest::notify::Notifications;
use ecogest::EcoGest;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

/// A mock backend plus a client pointed at it.
pub struct TestBackend {
    pub server: MockServer,
    pub client: EcoGest,
    pub notifications: Notifications,
}

impl TestBackend {
    pub async fn start() -> Self {
        Self::with_tokens(Arc::new(MemoryTokenStore::with_token(TOKEN))).await
    }

    pub async fn with_tokens(tokens: Arc<dyn TokenStore>) -> Self {
        let server = MockServer::start().await;
        let config = AppConfig::new(server.uri());
        let (client, notifications) = EcoGest::new(config, tokens).expect("client builds");
        Self {
            server,
            client,
            notifications,
        }
    }

    /// Query string of every request received so far for `path`.
    pub async fn queries(&self, path: &str) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == path)
            .map(|r| r.url.query().unwrap_or_default().to_string())
            .collect()
    }
}

pub fn page(data: Vec<Value>, total: u64) -> Value {
    json!({ "data": data, "meta": { "totalItems": total } })
}

pub fn supplier(id: i64) -> Value {
    json!({ "id": id, "name": format!("Fornecedor {}", id), "cnpj": "12345678000195" })
}

pub fn customer(id: i64) -> Value {
    json!({ "id": id, "name": format!("Cliente {}", id) })
}

pub fn product(id: i64) -> Value {
    json!({ "id": id, "name": format!("Produto {}", id), "unitPrice": "10.00", "stock": "4" })
}

pub fn purchase(id: i64, total: &str, status: &str) -> Value {
    json!({
        "id": id,
        "code": format!("PC-{}", id),
        "supplier": supplier(1),
        "product": product(1),
        "quantity": "1",
        "unitValue": total,
        "totalValue": total,
        "status": status,
        "purchaseDate": "2024-03-01"
    })
}

pub fn sale(id: i64, total: &str, status: &str) -> Value {
    json!({
        "id": id,
        "customer": customer(1),
        "product": product(1),
        "quantity": "1",
        "unitValue": total,
        "totalValue": total,
        "status": status,
        "saleDate": "2024-03-02"
    })
}

pub fn payable(id: i64, total: &str, payed: &str, status: &str) -> Value {
    json!({
        "id": id,
        "description": format!("Conta {}", id),
        "supplier": supplier(1),
        "totalValue": total,
        "payedValue": payed,
        "dueDate": "2024-03-10",
        "status": status
    })
}

pub fn receivable(id: i64, total: &str, payed: &str, status: &str) -> Value {
    json!({
        "id": id,
        "description": format!("Recebível {}", id),
        "totalValue": total,
        "payedValue": payed,
        "dueDate": "2099-03-10",
        "status": status
    })
}

pub fn entry(id: i64, kind: &str, value: &str) -> Value {
    json!({
        "id": id,
        "description": format!("Lançamento {}", id),
        "type": kind,
        "value": value,
        "entryDate": "2024-03-05"
    })
}
