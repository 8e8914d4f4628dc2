//! Integration tests for the checkout and payment-intent endpoints.
//!
//! These drive the full router (guards, validation, handlers) against the
//! in-memory payment provider.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};

use common::{body_json, json_post, send, settings, test_app, APP_ORIGIN, CLIENT_IP};
use payment_gateway::domain::foundation::SecurityEventKind;
use payment_gateway::domain::payment::CustomerRef;
use payment_gateway::ports::{CustomerIdentity, PaymentError};

fn pro_plan_checkout(amount: i64) -> Value {
    json!({
        "mode": "payment",
        "items": [{ "name": "Pro Plan", "amount": amount, "currency": "usd", "quantity": 1 }],
        "successUrl": "https://app.example/success",
        "cancelUrl": "https://app.example/cancel"
    })
}

// =============================================================================
// POST /checkout
// =============================================================================

#[tokio::test]
async fn checkout_from_own_origin_returns_hosted_session() {
    let app = test_app(settings(true));

    let response = send(&app, json_post("/checkout", &pro_plan_checkout(9900))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(!body["sessionId"].as_str().unwrap().is_empty());
    assert!(body["url"]
        .as_str()
        .unwrap()
        .starts_with("https://checkout.stripe.com"));
    assert_eq!(app.provider.call_count("create_checkout_session"), 1);
}

#[tokio::test]
async fn checkout_below_minimum_is_rejected_without_session() {
    let app = test_app(settings(true));

    let response = send(&app, json_post("/checkout", &pro_plan_checkout(10))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid amount or currency");
    assert_eq!(body["code"], "validation_error");
    assert!(!app.provider.was_called("create_checkout_session"));
    assert_eq!(app.provider.total_calls(), 0);
    assert!(app.sink.contains(SecurityEventKind::InvalidAmount));
}

#[tokio::test]
async fn checkout_with_email_reuses_existing_customer() {
    let app = test_app(settings(false));
    app.provider.add_customer(CustomerIdentity {
        id: "cus_existing".to_string(),
        email: "buyer@example.com".to_string(),
        name: None,
        metadata: Default::default(),
    });
    let mut request = pro_plan_checkout(9900);
    request["customerEmail"] = json!("buyer@example.com");

    let first = send(&app, json_post("/checkout", &request)).await;
    let second = send(&app, json_post("/checkout", &request)).await;

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    assert!(!app.provider.was_called("create_customer"));
    let sessions = app.provider.checkout_requests();
    assert_eq!(sessions.len(), 2);
    assert!(sessions
        .iter()
        .all(|s| s.customer == CustomerRef::Id("cus_existing".to_string())));
}

#[tokio::test]
async fn checkout_redirect_to_foreign_origin_is_rejected() {
    let app = test_app(settings(false));
    let mut request = pro_plan_checkout(9900);
    request["successUrl"] = json!("https://evil.example/success");

    let response = send(&app, json_post("/checkout", &request)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid success or cancel URL");
    assert!(app.sink.contains(SecurityEventKind::InvalidUrls));
}

#[tokio::test]
async fn checkout_subscription_mode_is_not_supported() {
    let app = test_app(settings(false));
    let mut request = pro_plan_checkout(9900);
    request["mode"] = json!("subscription");

    let response = send(&app, json_post("/checkout", &request)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Subscription mode not implemented yet"
    );
    assert_eq!(app.provider.total_calls(), 0);
}

#[tokio::test]
async fn checkout_malformed_json_is_a_validation_error() {
    let app = test_app(settings(false));
    let request = Request::post("/checkout")
        .header("content-type", "application/json")
        .header("origin", APP_ORIGIN)
        .body(Body::from("{\"items\": ["))
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid request body");
    assert_eq!(body["field"], "body");
}

#[tokio::test]
async fn checkout_items_of_wrong_type_fail_the_items_check() {
    let app = test_app(settings(false));
    let mut request = pro_plan_checkout(9900);
    request["items"] = json!("x");

    let response = send(&app, json_post("/checkout", &request)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid items array");
    assert_eq!(body["field"], "items");
    assert_eq!(app.sink.kinds(), vec![SecurityEventKind::InvalidItems]);
    assert_eq!(app.provider.total_calls(), 0);
}

#[tokio::test]
async fn checkout_string_amount_is_an_invalid_amount() {
    let app = test_app(settings(false));
    let mut request = pro_plan_checkout(9900);
    request["items"][0]["amount"] = json!("9900");

    let response = send(&app, json_post("/checkout", &request)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid amount or currency");
    assert_eq!(body["field"], "items[0].amount");
    assert_eq!(app.sink.kinds(), vec![SecurityEventKind::InvalidAmount]);
    assert_eq!(app.provider.total_calls(), 0);
}

#[tokio::test]
async fn checkout_numeric_metadata_is_passed_through() {
    let app = test_app(settings(false));
    let mut request = pro_plan_checkout(9900);
    request["metadata"] = json!({ "orderId": 42 });

    let response = send(&app, json_post("/checkout", &request)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let sessions = app.provider.checkout_requests();
    assert_eq!(sessions.len(), 1);
    assert_eq!(
        sessions[0].metadata.get("orderId").map(String::as_str),
        Some("42")
    );
}

#[tokio::test]
async fn checkout_provider_failure_relays_details() {
    let app = test_app(settings(false));
    app.provider.set_method_error(
        "create_checkout_session",
        PaymentError::provider("Card processor unavailable"),
    );

    let response = send(&app, json_post("/checkout", &pro_plan_checkout(9900))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to create checkout session");
    assert_eq!(body["details"], "Card processor unavailable");
}

// =============================================================================
// Guards
// =============================================================================

#[tokio::test]
async fn guards_apply_rate_limit_then_origin_then_size() {
    let mut settings = settings(true);
    settings.checkout_max_requests = 2;
    let app = test_app(settings);

    let oversized = json!({ "padding": "x".repeat(20 * 1024) });
    let foreign_oversized = || {
        Request::post("/checkout")
            .header("content-type", "application/json")
            .header("origin", "https://evil.example")
            .header("x-forwarded-for", CLIENT_IP)
            .body(Body::from(oversized.to_string()))
            .unwrap()
    };

    // Within quota: origin is checked before size
    let first = send(&app, foreign_oversized()).await;
    assert_eq!(first.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(first).await["error"], "Invalid request origin");
    send(&app, foreign_oversized()).await;

    // Quota used up: rate limit is checked before origin
    let third = send(&app, foreign_oversized()).await;
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(third.headers().contains_key("retry-after"));
    assert_eq!(third.headers()["x-ratelimit-remaining"], "0");
    assert_eq!(
        body_json(third).await["error"],
        "Too many requests. Please wait before trying again."
    );

    // Another client from the right origin reaches the size check
    let own_origin_oversized = Request::post("/checkout")
        .header("content-type", "application/json")
        .header("origin", APP_ORIGIN)
        .header("x-forwarded-for", "198.51.100.20")
        .body(Body::from(oversized.to_string()))
        .unwrap();
    let response = send(&app, own_origin_oversized).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["error"], "Request payload too large");

    let kinds = app.sink.kinds();
    assert!(kinds.contains(&SecurityEventKind::InvalidOrigin));
    assert!(kinds.contains(&SecurityEventKind::RateLimitExceeded));
    assert!(kinds.contains(&SecurityEventKind::RequestTooLarge));
    assert_eq!(app.provider.total_calls(), 0);
}

#[tokio::test]
async fn guards_are_relaxed_outside_production() {
    let app = test_app(settings(false));

    for _ in 0..12 {
        let request = Request::post("/checkout")
            .header("content-type", "application/json")
            .header("origin", "http://localhost:5173")
            .body(Body::from(
                json!({
                    "items": [{ "name": "Pro Plan", "amount": 9900 }],
                    "successUrl": "http://localhost:5173/success",
                    "cancelUrl": "http://localhost:5173/cancel"
                })
                .to_string(),
            ))
            .unwrap();
        assert_eq!(send(&app, request).await.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn success_responses_carry_rate_limit_headers() {
    let app = test_app(settings(true));

    let response = send(&app, json_post("/checkout", &pro_plan_checkout(9900))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-ratelimit-limit"], "10");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "9");
}

// =============================================================================
// POST /payment-intent
// =============================================================================

#[tokio::test]
async fn payment_intent_returns_client_secret() {
    let app = test_app(settings(true));

    let response = send(
        &app,
        json_post(
            "/payment-intent",
            &json!({ "amount": 2500, "customerEmail": "buyer@example.com" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let intent_id = body["paymentIntentId"].as_str().unwrap();
    assert!(intent_id.starts_with("pi_"));
    assert!(body["clientSecret"].as_str().unwrap().starts_with(intent_id));
    assert!(app.provider.was_called("create_customer"));

    let requests = app.provider.payment_intent_requests();
    assert_eq!(requests[0].amount, 2500);
    assert_eq!(requests[0].metadata.get("source").map(String::as_str), Some("api"));
}

#[tokio::test]
async fn payment_intent_long_description_is_truncated_not_rejected() {
    let app = test_app(settings(false));

    let response = send(
        &app,
        json_post(
            "/payment-intent",
            &json!({ "amount": 2500, "description": "d".repeat(1001) }),
        ),
    )
    .await;

    // Sanitization trims strings to 1000 characters before validation
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn payment_intent_rejects_unsupported_currency() {
    let app = test_app(settings(false));

    let response = send(
        &app,
        json_post("/payment-intent", &json!({ "amount": 2500, "currency": "jpy" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid amount or currency");
    assert_eq!(app.provider.total_calls(), 0);
}

#[tokio::test]
async fn payment_intent_string_amount_is_logged_and_rejected() {
    let app = test_app(settings(false));

    let response = send(
        &app,
        json_post("/payment-intent", &json!({ "amount": "9900" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid amount or currency");
    assert_eq!(body["field"], "amount");
    assert!(app.sink.contains(SecurityEventKind::InvalidAmount));
    assert_eq!(app.provider.total_calls(), 0);
}

#[tokio::test]
async fn payment_intent_has_the_stricter_rate_limit() {
    let app = test_app(settings(true));
    let request = || json_post("/payment-intent", &json!({ "amount": 2500 }));

    for _ in 0..5 {
        assert_eq!(send(&app, request()).await.status(), StatusCode::OK);
    }
    let response = send(&app, request()).await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["x-ratelimit-limit"], "5");
}

// =============================================================================
// GET /health
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app(settings(true));

    let response = send(
        &app,
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}
