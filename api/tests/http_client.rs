//! HTTP contract tests for `HttpCheckoutApi` against a mock server.

#![allow(clippy::unwrap_used)] // Test code can unwrap

use campus_api::{
    ApiError, CartId, CheckoutApi, CreateOrderRequest, HttpCheckoutApi, OrderId, PaymentProvider,
    ProcessOrderRequest, Session,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpCheckoutApi {
    HttpCheckoutApi::new(server.uri(), Session::with_token("t0k3n")).unwrap()
}

fn order_request() -> CreateOrderRequest {
    CreateOrderRequest {
        cart_id: CartId::new("42"),
        billing_name: "Asha Rao".to_string(),
        billing_email: "asha@example.com".to_string(),
        billing_address: "12 Lake Road, Pune 411001".to_string(),
        customer_notes: Some("Gift for my sister".to_string()),
        payment_method: PaymentProvider::Stripe,
    }
}

#[tokio::test]
async fn cart_summary_is_fetched_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header("authorization", "Bearer t0k3n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cart_id": 42,
            "items": [{"id": 1, "name": "Yoga Basics", "quantity": 1, "line_total": "249.98"}],
            "subtotal": "249.98",
            "discount": "0",
            "tax": "20.62",
            "total": "270.60",
            "currency": "USD"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cart = client_for(&server).cart().await.unwrap();

    assert_eq!(cart.cart_id, CartId::new("42"));
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total.to_string(), "270.60");
}

#[tokio::test]
async fn missing_session_fails_without_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = HttpCheckoutApi::new(server.uri(), Session::new()).unwrap();

    assert_eq!(api.cart().await.unwrap_err(), ApiError::Unauthenticated);
}

#[tokio::test]
async fn teardown_revokes_access_for_existing_clients() {
    let server = MockServer::start().await;
    let session = Session::with_token("t0k3n");
    let api = HttpCheckoutApi::new(server.uri(), session.clone()).unwrap();

    session.teardown();

    assert_eq!(
        api.payment_methods().await.unwrap_err(),
        ApiError::Unauthenticated
    );
}

#[tokio::test]
async fn payment_methods_are_listed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/payment-methods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"code": "stripe", "name": "Card", "enabled": true},
            {"code": "razorpay", "name": "UPI", "enabled": false}
        ])))
        .mount(&server)
        .await;

    let methods = client_for(&server).payment_methods().await.unwrap();

    assert_eq!(methods.len(), 2);
    assert_eq!(methods[1].provider(), Some(PaymentProvider::Razorpay));
    assert!(!methods[1].enabled);
}

#[tokio::test]
async fn create_order_posts_billing_and_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_json(json!({
            "cart_id": "42",
            "billing_name": "Asha Rao",
            "billing_email": "asha@example.com",
            "billing_address": "12 Lake Road, Pune 411001",
            "customer_notes": "Gift for my sister",
            "payment_method": "stripe"
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": 7, "order_number": "ORD-0007", "status": "pending"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let order = client_for(&server).create_order(order_request()).await.unwrap();

    assert_eq!(order.id, OrderId::new("7"));
    assert_eq!(order.order_number, "ORD-0007");
}

#[tokio::test]
async fn process_order_targets_created_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders/7/process"))
        .and(body_json(json!({"payment_method": "razorpay"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "paid"})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .process_order(
            OrderId::new("7"),
            ProcessOrderRequest {
                payment_method: PaymentProvider::Razorpay,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn rejection_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders/7/process"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({"detail": "Card declined"})))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .process_order(
            OrderId::new("7"),
            ProcessOrderRequest {
                payment_method: PaymentProvider::Stripe,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ApiError::Status {
            status: 402,
            message: "Card declined".to_string()
        }
    );
    assert!(!error.is_retryable());
}

#[tokio::test]
async fn proxy_error_page_becomes_reason_phrase() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(
            ResponseTemplate::new(502)
                .set_body_string("<html><body><h1>502 Bad Gateway</h1>\n<hr>nginx</body></html>"),
        )
        .mount(&server)
        .await;

    let error = client_for(&server).cart().await.unwrap_err();

    assert_eq!(
        error,
        ApiError::Status {
            status: 502,
            message: "Bad Gateway".to_string()
        }
    );
    assert!(error.is_retryable());
}

#[tokio::test]
async fn unauthorized_status_is_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert_eq!(
        client_for(&server).cart().await.unwrap_err(),
        ApiError::Unauthorized
    );
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = client_for(&server).cart().await.unwrap_err();
    assert!(matches!(error, ApiError::ResponseParseFailed(_)));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let api = HttpCheckoutApi::with_timeout(
        server.uri(),
        Session::with_token("t0k3n"),
        Duration::from_millis(100),
    )
    .unwrap();

    let error = api.cart().await.unwrap_err();
    assert_eq!(error, ApiError::Timeout);
    assert!(error.is_retryable());
}
