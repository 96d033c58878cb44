use std::str::FromStr;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use rust_decimal::Decimal;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::records::RawRecordsQuery;
use super::*;

fn sale_json(
    product: &str,
    seller: &str,
    location: &str,
    price: f64,
    date: &str,
) -> serde_json::Value {
    json!({
        "Produto": product,
        "Categoria do Produto": "eletronicos",
        "Preço": price,
        "Frete": 10.0,
        "Data da Compra": date,
        "Vendedor": seller,
        "Local da compra": location,
        "Avaliação da compra": 5,
        "Tipo de pagamento": "boleto",
        "Quantidade de parcelas": 1,
        "lat": -22.19,
        "lon": -48.79
    })
}

fn three_sales() -> serde_json::Value {
    json!([
        sale_json("Celular", "Ana Duarte", "SP", 100.0, "10/01/2021"),
        sale_json("Fone", "Bruno Lima", "RJ", 50.0, "20/02/2021"),
        sale_json("Celular", "Ana Duarte", "SP", 30.0, "05/03/2021"),
    ])
}

async fn mock_source(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/produtos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

fn app_for(server: &MockServer) -> Router {
    let source = SalesApiClient::with_base_url(
        &format!("{}/produtos", server.uri()),
        5,
        "salesdash-test/0.1",
    )
    .expect("client");
    build_app(
        AppState { source },
        RateLimitState::new(100, Duration::from_secs(60)),
    )
}

async fn send_get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    )
    .await
    .expect("response")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

fn decimal(value: &serde_json::Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal string")).expect("decimal")
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("upstream_error", StatusCode::BAD_GATEWAY),
        ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), status, "code {code}");
    }
}

#[test]
fn split_list_trims_and_drops_blanks() {
    assert_eq!(
        split_list(Some(" Ana Duarte, ,Bruno Lima ")),
        vec!["Ana Duarte".to_string(), "Bruno Lima".to_string()]
    );
    assert!(split_list(None).is_empty());
    assert!(split_list(Some("")).is_empty());
}

#[test]
fn raw_query_lists_are_split_and_absent_lists_stay_unset() {
    let query = RawRecordsQuery {
        products: Some("Mesa, Sofá".to_string()),
        sellers: Some(String::new()),
        price_min: Some(Decimal::from(500)),
        ..RawRecordsQuery::default()
    };
    let view = query.view_filter();
    assert_eq!(
        view.products,
        Some(vec!["Mesa".to_string(), "Sofá".to_string()])
    );
    assert_eq!(view.sellers, Some(Vec::new()));
    assert_eq!(view.categories, None);
    assert_eq!(view.price, (Some(Decimal::from(500)), None));
}

#[tokio::test]
async fn health_returns_ok_with_request_id() {
    let server = MockServer::start().await;
    let response = send_get(app_for(&server), "/api/v1/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = json_body(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn dashboard_returns_metrics_and_tabs() {
    let server = mock_source(three_sales()).await;
    let response = send_get(app_for(&server), "/api/v1/dashboard").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let data = &json["data"];
    assert_eq!(data["region"], "Brasil");
    assert!(data["year"].is_null());
    assert_eq!(decimal(&data["metrics"]["revenue"]), Decimal::from(180));
    assert_eq!(data["metrics"]["revenue_formatted"], "R$ 180.00");
    assert_eq!(data["metrics"]["sales"], 3);
    assert_eq!(data["metrics"]["sales_formatted"], "3.00");

    let by_location = data["revenue"]["by_location"].as_array().expect("array");
    assert_eq!(by_location[0]["location"], "SP");
    assert_eq!(decimal(&by_location[0]["value"]), Decimal::from(130));
    assert_eq!(data["revenue"]["by_month"].as_array().map(Vec::len), Some(3));
    assert_eq!(data["sales"]["top_locations"][0]["value"], 2);
    assert_eq!(data["sellers"]["top"], 5);
    assert_eq!(data["sellers"]["by_sales"][0]["seller"], "Ana Duarte");
    assert_eq!(
        data["available_sellers"],
        json!(["Ana Duarte", "Bruno Lima"])
    );
}

#[tokio::test]
async fn dashboard_filters_by_seller_and_clamps_top() {
    let server = mock_source(three_sales()).await;
    let response = send_get(
        app_for(&server),
        "/api/v1/dashboard?sellers=Bruno%20Lima&top_sellers=50",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let data = &json["data"];
    assert_eq!(data["metrics"]["sales"], 1);
    assert_eq!(data["sellers"]["top"], 10);
    assert_eq!(data["available_sellers"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn dashboard_forwards_region_and_year_to_the_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/produtos"))
        .and(query_param("regiao", "nordeste"))
        .and(query_param("ano", "2021"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let response = send_get(
        app_for(&server),
        "/api/v1/dashboard?region=Nordeste&year=2021",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["region"], "Nordeste");
    assert_eq!(json["data"]["metrics"]["revenue_formatted"], "R$ 0.00");
    assert!(json["data"]["revenue"]["by_month"]
        .as_array()
        .expect("array")
        .is_empty());
}

#[tokio::test]
async fn dashboard_treats_empty_parameters_as_unset() {
    let server = mock_source(three_sales()).await;
    let response = send_get(
        app_for(&server),
        "/api/v1/dashboard?region=&year=&sellers=&top_sellers=",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let data = &json["data"];
    assert_eq!(data["region"], "Brasil");
    assert!(data["year"].is_null());
    assert_eq!(data["metrics"]["sales"], 3);
    assert_eq!(data["sellers"]["top"], 5);
}

#[tokio::test]
async fn dashboard_rejects_unknown_region_without_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let response = send_get(app_for(&server), "/api/v1/dashboard?region=Atlantida").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn dashboard_rejects_year_outside_range() {
    let server = MockServer::start().await;
    let response = send_get(app_for(&server), "/api/v1/dashboard?year=2019").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/produtos"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let response = send_get(app_for(&server), "/api/v1/dashboard").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "upstream_error");
}

#[tokio::test]
async fn filter_options_list_observed_values_and_defaults() {
    let server = mock_source(three_sales()).await;
    let response = send_get(app_for(&server), "/api/v1/filters/options").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let data = &json["data"];
    assert_eq!(data["products"], json!(["Celular", "Fone"]));
    assert_eq!(data["locations"], json!(["SP", "RJ"]));
    assert_eq!(data["price"], json!({"min": 0, "max": 5000}));
    assert_eq!(data["installments"], json!({"min": 1, "max": 24}));
    assert_eq!(
        data["purchase_date"],
        json!({"min": "2021-01-10", "max": "2021-03-05"})
    );
    assert_eq!(data["regions"].as_array().map(Vec::len), Some(6));
    assert_eq!(data["columns"][0], "Produto");
}

#[tokio::test]
async fn records_projects_selected_columns_of_filtered_rows() {
    let server = mock_source(three_sales()).await;
    let response = send_get(
        app_for(&server),
        "/api/v1/records?columns=Produto,Pre%C3%A7o&price_max=60",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let data = &json["data"];
    assert_eq!(data["columns"], json!(["Produto", "Preço"]));
    assert_eq!(data["row_count"], 2);
    assert_eq!(data["column_count"], 2);
    assert_eq!(data["rows"][0][0], "Fone");
}

#[tokio::test]
async fn records_rejects_unknown_columns() {
    let server = mock_source(three_sales()).await;
    let response = send_get(app_for(&server), "/api/v1/records?columns=Produto,Cor").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn records_rejects_malformed_bounds() {
    let server = mock_source(three_sales()).await;
    let response = send_get(app_for(&server), "/api/v1/records?price_min=barato").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn records_treat_empty_bounds_as_unset() {
    let server = mock_source(three_sales()).await;
    let response = send_get(
        app_for(&server),
        "/api/v1/records?price_min=&price_max=&rating_min=&from=&to=",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["row_count"], 3);
}

#[tokio::test]
async fn records_after_the_last_purchase_are_empty() {
    let server = mock_source(three_sales()).await;
    let response = send_get(app_for(&server), "/api/v1/records?from=2024-01-01").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["row_count"], 0);
    assert_eq!(json["data"]["rows"], json!([]));
}

#[tokio::test]
async fn records_reject_inverted_selected_range() {
    let server = mock_source(three_sales()).await;
    let response = send_get(
        app_for(&server),
        "/api/v1/records?price_min=100&price_max=10",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_downloads_csv_with_requested_name() {
    let server = mock_source(three_sales()).await;
    let response = send_get(
        app_for(&server),
        "/api/v1/records/export?columns=Produto,Vendedor&sellers=Ana%20Duarte&file_name=vendas",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"vendas.csv\""
    );
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    assert_eq!(
        std::str::from_utf8(&body).expect("utf-8"),
        "Produto,Vendedor\nCelular,Ana Duarte\nCelular,Ana Duarte\n"
    );
}

#[tokio::test]
async fn export_defaults_file_name() {
    let server = mock_source(json!([])).await;
    let response = send_get(app_for(&server), "/api/v1/records/export").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"dados.csv\""
    );
}
