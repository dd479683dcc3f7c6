//! Lemon Squeezy client tests against a mocked API

use billing_core::{BillingError, CheckoutRequest};
use billing_lemonsqueezy::{sign_payload, LemonSqueezyClient, LemonSqueezyConfig};
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "ls_whsec_test_secret";

fn config_for(server: &MockServer) -> LemonSqueezyConfig {
    LemonSqueezyConfig::new("lskey_test_xxx", "12345", SECRET)
        .with_api_base_url(format!("{}/v1", server.uri()))
}

fn checkout_response() -> serde_json::Value {
    json!({
        "jsonapi": {"version": "1.0"},
        "data": {
            "type": "checkouts",
            "id": "5e8b546c-c561-4a2c-a586-40c18bb2a195",
            "attributes": {
                "store_id": 12345,
                "variant_id": 777,
                "custom_price": null,
                "test_mode": true,
                "expires_at": null,
                "created_at": "2024-05-01T12:00:00.000000Z",
                "url": "https://demo.lemonsqueezy.com/checkout/custom/5e8b546c-c561-4a2c-a586-40c18bb2a195"
            }
        }
    })
}

#[tokio::test]
async fn test_create_checkout_uses_default_variant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkouts"))
        .and(header("authorization", "Bearer lskey_test_xxx"))
        .and(header("content-type", "application/vnd.api+json"))
        .and(header("accept", "application/vnd.api+json"))
        .and(body_partial_json(json!({
            "data": {
                "type": "checkouts",
                "relationships": {
                    "store": {"data": {"type": "stores", "id": "12345"}},
                    "variant": {"data": {"type": "variants", "id": "777"}}
                }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(checkout_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = LemonSqueezyClient::new(config_for(&server).with_default_variant("777")).unwrap();
    let session = client.create_checkout(&CheckoutRequest::new()).await.unwrap();

    assert_eq!(session.id, "5e8b546c-c561-4a2c-a586-40c18bb2a195");
    assert!(session.checkout_url.starts_with("https://demo.lemonsqueezy.com/checkout/custom/"));
    assert_eq!(session.variant_id.as_deref(), Some("777"));
    assert!(session.test_mode);
    assert!(session.created_at.is_some());
    assert!(session.expires_at.is_none());
}

#[tokio::test]
async fn test_create_checkout_sends_request_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkouts"))
        .and(body_partial_json(json!({
            "data": {
                "attributes": {
                    "checkout_data": {
                        "email": "buyer@example.com",
                        "custom": {"user_id": "u_42"}
                    },
                    "product_options": {
                        "redirect_url": "https://app.example.com/ok",
                        "cancel_url": "https://app.example.com/cancel"
                    },
                    "custom_price": 4900,
                    "test_mode": true
                },
                "relationships": {
                    "variant": {"data": {"type": "variants", "id": "888"}}
                }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(checkout_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = LemonSqueezyClient::new(config_for(&server).with_default_variant("777")).unwrap();
    let request = CheckoutRequest::for_variant("888")
        .with_customer_email("buyer@example.com")
        .with_metadata("user_id", "u_42")
        .with_urls("https://app.example.com/ok", "https://app.example.com/cancel")
        .with_custom_price(4900)
        .with_test_mode(true);

    client.create_checkout(&request).await.unwrap();
}

#[tokio::test]
async fn test_create_checkout_falls_back_to_configured_urls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkouts"))
        .and(body_partial_json(json!({
            "data": {
                "attributes": {
                    "product_options": {
                        "redirect_url": "https://localhost:3000/admin/subscription/success",
                        "cancel_url": "https://localhost:3000/admin/subscription/cancel"
                    }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(checkout_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = LemonSqueezyClient::new(config_for(&server)).unwrap();
    client
        .create_checkout(&CheckoutRequest::for_variant("777"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_checkout_without_variant_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(201).set_body_json(checkout_response()))
        .expect(0)
        .mount(&server)
        .await;

    let client = LemonSqueezyClient::new(config_for(&server)).unwrap();
    let result = client.create_checkout(&CheckoutRequest::new()).await;

    assert!(matches!(result, Err(BillingError::Configuration(_))));
}

#[tokio::test]
async fn test_create_checkout_error_taxonomy() {
    let cases: [(u16, &str); 6] = [
        (401, "Authentication"),
        (403, "Authentication"),
        (404, "InvalidRequest"),
        (422, "InvalidRequest"),
        (500, "ProviderUnavailable"),
        (503, "ProviderUnavailable"),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkouts"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "errors": [{"status": status.to_string(), "detail": "nope"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LemonSqueezyClient::new(config_for(&server)).unwrap();
        let err = client
            .create_checkout(&CheckoutRequest::for_variant("777"))
            .await
            .unwrap_err();

        let kind = match err {
            BillingError::Authentication(_) => "Authentication",
            BillingError::NotFound(_) => "NotFound",
            BillingError::InvalidRequest(_) => "InvalidRequest",
            BillingError::ProviderUnavailable(_) => "ProviderUnavailable",
            other => panic!("unexpected error for {}: {:?}", status, other),
        };
        assert_eq!(kind, expected, "status {}", status);
    }
}

#[tokio::test]
async fn test_invalid_request_surfaces_provider_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkouts"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "jsonapi": {"version": "1.0"},
            "errors": [{
                "detail": "The related resource does not exist.",
                "source": {"pointer": "/data/relationships/variant"},
                "status": "422",
                "title": "Unprocessable Entity"
            }]
        })))
        .mount(&server)
        .await;

    let client = LemonSqueezyClient::new(config_for(&server)).unwrap();
    let err = client
        .create_checkout(&CheckoutRequest::for_variant("1"))
        .await
        .unwrap_err();

    match err {
        BillingError::InvalidRequest(detail) => {
            assert!(detail.contains("The related resource does not exist."));
            assert!(detail.contains("/data/relationships/variant"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_checkout_not_found_is_invalid_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkouts"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"status": "404", "title": "Not Found", "detail": "Store not found."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = LemonSqueezyClient::new(config_for(&server)).unwrap();
    let err = client
        .create_checkout(&CheckoutRequest::for_variant("777"))
        .await
        .unwrap_err();

    match err {
        BillingError::InvalidRequest(detail) => assert_eq!(detail, "Store not found."),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unparseable_success_body_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkouts"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let client = LemonSqueezyClient::new(config_for(&server)).unwrap();
    let result = client.create_checkout(&CheckoutRequest::for_variant("1")).await;

    assert!(matches!(result, Err(BillingError::ProviderUnavailable(_))));
}

#[tokio::test]
async fn test_timeout_is_provider_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/variants/1"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = LemonSqueezyClient::new(
        config_for(&server).with_timeout(Duration::from_millis(200)),
    )
    .unwrap();
    let result = client.get_variant("1").await;

    assert!(matches!(result, Err(BillingError::ProviderUnavailable(_))));
}

#[tokio::test]
async fn test_unreachable_provider() {
    let config = LemonSqueezyConfig::new("lskey_test_xxx", "12345", SECRET)
        .with_api_base_url("http://127.0.0.1:9/v1")
        .with_timeout(Duration::from_secs(2));
    let client = LemonSqueezyClient::new(config).unwrap();

    let result = client.get_variant("1").await;

    assert!(matches!(result, Err(BillingError::ProviderUnavailable(_))));
}

#[tokio::test]
async fn test_get_variant() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/variants/42"))
        .and(header("authorization", "Bearer lskey_test_xxx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "type": "variants",
                "id": "42",
                "attributes": {
                    "product_id": 7,
                    "name": "Pro Yearly",
                    "slug": "pro-yearly",
                    "description": "<p>Everything</p>",
                    "price": 9900,
                    "is_subscription": true,
                    "interval": "year",
                    "interval_count": 1,
                    "status": "published"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = LemonSqueezyClient::new(config_for(&server)).unwrap();
    let variant = client.get_variant("42").await.unwrap();

    assert_eq!(variant.id, "42");
    assert_eq!(variant.product_id, "7");
    assert_eq!(variant.name, "Pro Yearly");
    assert_eq!(variant.price, 9900);
    assert!(variant.is_subscription);
    assert_eq!(variant.display_price(), "99.00");
}

#[tokio::test]
async fn test_get_variant_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/variants/404404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"status": "404", "title": "Not Found", "detail": "Resource not found."}]
        })))
        .mount(&server)
        .await;

    let client = LemonSqueezyClient::new(config_for(&server)).unwrap();
    let result = client.get_variant("404404").await;

    assert!(matches!(result, Err(BillingError::NotFound(_))));
}

#[tokio::test]
async fn test_get_variant_rejects_bad_ids_locally() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = LemonSqueezyClient::new(config_for(&server)).unwrap();

    for id in ["", "   ", " 42 ", "42\n", "1/../../stores", "1?include=product"] {
        let result = client.get_variant(id).await;
        assert!(matches!(result, Err(BillingError::InvalidRequest(_))), "{:?}", id);
    }
}

#[tokio::test]
async fn test_verify_webhook_round_trip() {
    let server = MockServer::start().await;
    let client = LemonSqueezyClient::new(config_for(&server)).unwrap();

    let body = br#"{"meta":{"event_name":"order_created","custom_data":{"user_id":"u_1"}},"data":{"type":"orders","id":"1","attributes":{"total":999}}}"#;
    let signature = sign_payload(SECRET, body).unwrap();

    let event = client.verify_webhook(body, &signature).unwrap();

    assert_eq!(event.event_name, "order_created");
    assert_eq!(event.custom_str("user_id"), Some("u_1"));
    assert_eq!(event.payload, serde_json::from_slice::<serde_json::Value>(body).unwrap());
}

#[tokio::test]
async fn test_verify_webhook_spec_example() {
    let server = MockServer::start().await;
    let config = LemonSqueezyConfig::new("lskey_test_xxx", "12345", "s3cret")
        .with_api_base_url(server.uri());
    let client = LemonSqueezyClient::new(config).unwrap();

    let body = br#"{"event":"order_created","id":"42"}"#;
    let digest = sign_payload("s3cret", body).unwrap();

    let event = client.verify_webhook(body, &digest).unwrap();
    assert_eq!(event.event_name, "order_created");
    assert_eq!(event.resource_id.as_deref(), Some("42"));

    let last = if digest.ends_with('0') { "1" } else { "0" };
    let tampered = format!("{}{}", &digest[..digest.len() - 1], last);
    assert!(matches!(
        client.verify_webhook(body, &tampered),
        Err(BillingError::SignatureMismatch)
    ));
}

#[tokio::test]
async fn test_verify_webhook_bad_json_after_valid_signature() {
    let server = MockServer::start().await;
    let client = LemonSqueezyClient::new(config_for(&server)).unwrap();

    let body = b"not json at all";
    let signature = sign_payload(SECRET, body).unwrap();

    assert!(matches!(
        client.verify_webhook(body, &signature),
        Err(BillingError::MalformedPayload(_))
    ));
}

#[tokio::test]
async fn test_verify_webhook_checks_signature_before_parsing() {
    let server = MockServer::start().await;
    let client = LemonSqueezyClient::new(config_for(&server)).unwrap();

    // Unsigned garbage must not reveal that it is also unparseable.
    assert!(matches!(
        client.verify_webhook(b"not json", "deadbeef"),
        Err(BillingError::SignatureMismatch)
    ));
}

/// Compares mean verification time for first-byte and last-byte mismatches.
///
/// Timing-sensitive; run with `cargo test -- --ignored` on an idle machine.
#[tokio::test]
#[ignore]
async fn test_verify_timing_is_position_independent() {
    let server = MockServer::start().await;
    let client = LemonSqueezyClient::new(config_for(&server)).unwrap();

    let body = vec![b'x'; 4096];
    let good = sign_payload(SECRET, &body).unwrap();
    let flip = |idx: usize| {
        let mut bytes = good.clone().into_bytes();
        bytes[idx] = if bytes[idx] == b'0' { b'1' } else { b'0' };
        String::from_utf8(bytes).unwrap()
    };
    let first = flip(0);
    let last = flip(good.len() - 1);

    let measure = |sig: &str| {
        let start = Instant::now();
        for _ in 0..20_000 {
            let _ = client.verify_webhook(&body, sig);
        }
        start.elapsed().as_secs_f64()
    };

    // Warm up, then interleave to spread noise evenly.
    measure(first.as_str());
    let mut first_total = 0.0;
    let mut last_total = 0.0;
    for _ in 0..5 {
        first_total += measure(first.as_str());
        last_total += measure(last.as_str());
    }

    let ratio = first_total / last_total;
    assert!((0.8..1.25).contains(&ratio), "timing ratio {}", ratio);
}
