mod common;

use ecogest::models::ListParams;
use rust_decimal_macros::dec;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{page, TestBackend};

async fn serve(server: &MockServer, endpoint: &str, skip: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("skip", skip))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn dashboard_sums_across_pages() {
    let backend = TestBackend::start().await;
    let server = &backend.server;

    serve(
        server,
        "/sales",
        "0",
        page(
            vec![
                common::sale(1, "100.00", "approved"),
                common::sale(2, "40.00", "canceled"),
            ],
            3,
        ),
    )
    .await;
    serve(server, "/sales", "2", page(vec![common::sale(3, "60.00", "processing")], 3)).await;
    serve(
        server,
        "/purchases",
        "0",
        page(vec![common::purchase(1, "70.00", "approved")], 1),
    )
    .await;
    serve(
        server,
        "/payables",
        "0",
        page(
            vec![
                common::payable(1, "100.00", "25.00", "overdue"),
                common::payable(2, "50.00", "50.00", "paid"),
            ],
            2,
        ),
    )
    .await;
    serve(
        server,
        "/receivables",
        "0",
        page(vec![common::receivable(1, "80.00", "0", "open")], 1),
    )
    .await;
    serve(
        server,
        "/entry",
        "0",
        page(
            vec![common::entry(1, "income", "500.00"), common::entry(2, "expense", "120.00")],
            2,
        ),
    )
    .await;
    serve(server, "/expenses", "0", page(vec![], 0)).await;

    let mut dashboard = backend.client.dashboard();
    dashboard.filters = ListParams::new(0, 2);
    let summary = dashboard.load().await.unwrap();

    assert_eq!(summary.sales_total, dec!(160.00));
    assert_eq!(summary.purchases_total, dec!(70.00));
    assert_eq!(summary.payables_open, dec!(75.00));
    assert_eq!(summary.overdue_payables, 1);
    assert_eq!(summary.receivables_open, dec!(80.00));
    assert_eq!(summary.overdue_receivables, 0);
    assert_eq!(summary.balance, dec!(380.00));
    assert_eq!(summary.expenses_total, dec!(0));
}
