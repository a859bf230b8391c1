// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `http_errors.rs`

use super::*;

#[test]
fn test_map_http_400() {
    let (reason, message) = map_http_error_to_reason(400);
    assert_eq!(reason, REASON_PROVIDER_BAD_REQUEST);
    assert!(message.contains("400"));
}

#[test]
fn test_map_http_auth_codes() {
    for code in [401, 403] {
        let (reason, message) = map_http_error_to_reason(code);
        assert_eq!(reason, REASON_PROVIDER_AUTH_FAILED);
        assert!(message.contains(&code.to_string()));
    }
}

#[test]
fn test_map_http_404() {
    let (reason, message) = map_http_error_to_reason(404);
    assert_eq!(reason, REASON_ZONE_NOT_FOUND);
    assert!(message.contains("not found"));
}

#[test]
fn test_map_http_409() {
    let (reason, _) = map_http_error_to_reason(409);
    assert_eq!(reason, REASON_RECORD_CONFLICT);
}

#[test]
fn test_map_http_429() {
    let (reason, _) = map_http_error_to_reason(429);
    assert_eq!(reason, REASON_RATE_LIMITED);
}

#[test]
fn test_map_http_server_errors() {
    for code in [500, 502, 503, 504, 520] {
        let (reason, message) = map_http_error_to_reason(code);
        assert_eq!(reason, REASON_PROVIDER_UNAVAILABLE, "code {code}");
        assert!(message.contains(&code.to_string()));
    }
}

#[test]
fn test_map_http_unknown() {
    let (reason, message) = map_http_error_to_reason(418); // I'm a teapot
    assert_eq!(reason, REASON_UNEXPECTED_STATUS);
    assert!(message.contains("418"));
}

mod transport {
    use super::super::*;
    use crate::status_reasons::{
        REASON_DECODE_FAILED, REASON_PROVIDER_UNAVAILABLE, REASON_TIMEOUT, REASON_UNREACHABLE,
    };
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_map_transport_refused_connection() {
        // Nothing listens on port 9 on loopback
        let err = reqwest::get("http://127.0.0.1:9/").await.unwrap_err();
        assert_eq!(map_transport_error(&err), REASON_UNREACHABLE);
    }

    #[tokio::test]
    async fn test_map_transport_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let err = client.get(server.uri()).send().await.unwrap_err();
        assert_eq!(map_transport_error(&err), REASON_TIMEOUT);
    }

    #[tokio::test]
    async fn test_map_transport_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = reqwest::get(server.uri())
            .await
            .unwrap()
            .json::<serde_json::Value>()
            .await
            .unwrap_err();
        assert_eq!(map_transport_error(&err), REASON_DECODE_FAILED);
    }

    #[tokio::test]
    async fn test_map_transport_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = reqwest::get(server.uri())
            .await
            .unwrap()
            .error_for_status()
            .unwrap_err();
        assert_eq!(map_transport_error(&err), REASON_PROVIDER_UNAVAILABLE);
    }
}
