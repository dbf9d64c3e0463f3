mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use bytes::Bytes;
use chrono::NaiveDate;
use ecogest::errors::{ClientError, ErrorKind};
use ecogest::models::{ListParams, NewCustomer, NewPurchase, OrderStatus, Period, PurchaseUpdate};
use ecogest::resources::Attachment;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, ResponseTemplate};

use common::{page, purchase, TestBackend, TOKEN};

#[tokio::test]
async fn list_sends_bearer_token_and_paging() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/purchases"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![purchase(1, "10.00", "approved")],
            1,
        )))
        .expect(1)
        .mount(&backend.server)
        .await;

    let params = ListParams::new(0, 5).with_filter("status", "approved");
    let result = backend.client.purchases().list(&params).await.unwrap();

    assert_eq!(result.total_items(), 1);
    assert_eq!(result.data[0].status, OrderStatus::Approved);
    assert_eq!(
        backend.queries("/purchases").await,
        vec!["skip=0&take=5&status=approved".to_string()]
    );
}

#[tokio::test]
async fn concurrent_identical_lists_issue_one_request() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/purchases"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(vec![purchase(1, "10.00", "processing")], 1))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let api = backend.client.purchases();
    let params = ListParams::new(0, 5);
    let (a, b) = tokio::join!(api.list(&params), api.list(&params));
    assert_eq!(a.unwrap(), b.unwrap());

    // third read is served from the cache
    api.list(&params).await.unwrap();
}

#[tokio::test]
async fn get_by_id_maps_not_found_to_none() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/customers/search/by-id"))
        .and(query_param("id", "99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Customer not found" })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let api = backend.client.customers();
    assert_eq!(api.get_by_id(99).await.unwrap(), None);
    assert_eq!(api.get_by_id(99).await.unwrap(), None);
}

#[tokio::test]
async fn server_errors_carry_status_and_message() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "message": ["take must be positive", "skip must be positive"] })),
        )
        .mount(&backend.server)
        .await;

    let err = backend
        .client
        .products()
        .list(&ListParams::new(0, 5))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.kind(), ErrorKind::ClientError);
    assert_matches!(err, ClientError::Api { message, .. } if message.contains("take must be positive"));
}

#[tokio::test]
async fn create_validates_before_sending_and_invalidates_lists() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 0)))
        .expect(2)
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/customers"))
        .and(body_json(json!({ "name": "Mercado Verde", "email": "oi@verde.com.br" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7, "name": "Mercado Verde" })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let api = backend.client.customers();
    let params = ListParams::new(0, 5);
    api.list(&params).await.unwrap();

    let mut invalid = NewCustomer::named("  ");
    invalid.email = Some("nope".into());
    assert_matches!(api.create(&invalid).await, Err(ClientError::InvalidForm(_)));

    let mut form = NewCustomer::named("Mercado Verde");
    form.email = Some("oi@verde.com.br".into());
    let created = api.create(&form).await.unwrap().unwrap();
    assert_eq!(created.id, 7);

    api.list(&params).await.unwrap();
}

#[tokio::test]
async fn create_acknowledged_with_text_still_invalidates_lists() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 0)))
        .expect(2)
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(201).set_body_string("Cliente criado"))
        .expect(1)
        .mount(&backend.server)
        .await;

    let api = backend.client.customers();
    let params = ListParams::new(0, 5);
    api.list(&params).await.unwrap();

    let created = api.create(&NewCustomer::named("Mercado Verde")).await.unwrap();
    assert_eq!(created, None);

    api.list(&params).await.unwrap();
    assert_eq!(backend.queries("/customers").await.len(), 3);
}

#[tokio::test]
async fn update_invalidates_detail_and_lists() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/purchases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![purchase(3, "10.00", "processing")], 1)))
        .expect(2)
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/purchases/search/by-id"))
        .and(query_param("id", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(purchase(3, "10.00", "processing")))
        .expect(2)
        .mount(&backend.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/purchases"))
        .and(query_param("id", "3"))
        .and(body_json(json!({ "status": "approved" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&backend.server)
        .await;

    let api = backend.client.purchases();
    let params = ListParams::new(0, 5);
    api.list(&params).await.unwrap();
    api.get_by_id(3).await.unwrap();

    let echoed = api.update_status(3, OrderStatus::Approved).await.unwrap();
    assert_eq!(echoed, None);

    api.list(&params).await.unwrap();
    api.get_by_id(3).await.unwrap();
}

#[tokio::test]
async fn partial_update_rejects_bad_nfe() {
    let backend = TestBackend::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend.server)
        .await;

    let update = PurchaseUpdate {
        nfe: Some("123".into()),
        ..PurchaseUpdate::default()
    };
    let err = backend.client.purchases().update(1, &update).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.notification_message().contains("44 digits"));
}

#[tokio::test]
async fn delete_many_reports_each_failure() {
    let backend = TestBackend::start().await;
    Mock::given(method("DELETE"))
        .and(path("/expenses"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/expenses"))
        .and(query_param("id", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&backend.server)
        .await;

    let report = backend.client.expenses().delete_many(&[1, 2]).await;
    assert_eq!(report.deleted, vec![1]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, 2);
    assert_eq!(report.failed[0].1.kind(), ErrorKind::ServerError);
    assert!(!report.is_complete());
}

#[tokio::test]
async fn name_search_needs_three_characters() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/suppliers/search/by-name"))
        .and(query_param("name", "Eco"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([common::supplier(2)])))
        .expect(1)
        .mount(&backend.server)
        .await;

    let api = backend.client.suppliers();
    assert_eq!(api.search_by_name("Ec").await.unwrap(), None);
    assert_eq!(api.search_by_name("  Ec  ").await.unwrap(), None);

    let found = api.search_by_name(" Eco ").await.unwrap().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(backend.queries("/suppliers/search/by-name").await.len(), 1);
}

#[tokio::test]
async fn period_search_needs_both_dates() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/sales/search/by-period"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 0)))
        .expect(1)
        .mount(&backend.server)
        .await;

    let api = backend.client.sales();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let params = ListParams::new(0, 5);

    let half = Period {
        start: Some(start),
        end: None,
    };
    assert_eq!(api.search_by_period(&half, &params).await.unwrap(), None);

    let found = api
        .search_by_period(&Period::new(start, end), &params)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.total_items(), 0);
    assert_eq!(
        backend.queries("/sales/search/by-period").await,
        vec!["startDate=2024-01-01&endDate=2024-01-31&skip=0&take=5".to_string()]
    );
}

#[tokio::test]
async fn purchase_with_attachment_is_multipart() {
    let backend = TestBackend::start().await;
    Mock::given(method("POST"))
        .and(path("/purchases"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"data\""))
        .and(body_string_contains("\"supplierId\":4"))
        .and(body_string_contains("filename=\"nfe.xml\""))
        .and(body_string_contains("<nfeProc/>"))
        .respond_with(ResponseTemplate::new(201).set_body_json(purchase(12, "37.50", "processing")))
        .expect(1)
        .mount(&backend.server)
        .await;

    let form = NewPurchase {
        supplier_id: 4,
        product_id: 1,
        code: None,
        nfe: None,
        quantity: dec!(3),
        unit_value: dec!(12.50),
        purchase_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        status: None,
    };
    let attachment = Attachment::new("nfe.xml", "application/xml", Bytes::from_static(b"<nfeProc/>"));
    let created = backend
        .client
        .purchases()
        .create_with_attachment(&form, attachment)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.id, 12);
}
