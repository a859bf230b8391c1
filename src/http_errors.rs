// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP error mapping to swarmflare reason codes.
//!
//! This module maps HTTP status codes and transport failures from the Cloudflare
//! and Docker Engine APIs to the reason codes in [`crate::status_reasons`].
//!
//! # Usage
//!
//! ```rust
//! use swarmflare::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(403);
//! assert_eq!(reason, "ProviderAuthFailed");
//!
//! let (reason, message) = map_http_error_to_reason(503);
//! assert_eq!(reason, "ProviderUnavailable");
//! ```

use crate::status_reasons::{
    REASON_DECODE_FAILED, REASON_PROVIDER_AUTH_FAILED, REASON_PROVIDER_BAD_REQUEST,
    REASON_PROVIDER_UNAVAILABLE, REASON_RATE_LIMITED, REASON_RECORD_CONFLICT, REASON_TIMEOUT,
    REASON_UNEXPECTED_STATUS, REASON_UNREACHABLE, REASON_ZONE_NOT_FOUND,
};

/// Map HTTP status code to reason and message.
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Reason | Meaning |
/// |-----------|--------|---------|
/// | 400 | `ProviderBadRequest` | Invalid request body |
/// | 401 | `ProviderAuthFailed` | Token missing or invalid |
/// | 403 | `ProviderAuthFailed` | Token lacks permission for the zone |
/// | 404 | `ZoneNotFound` | Unknown zone identifier |
/// | 409 | `RecordConflict` | Conflicting record exists |
/// | 429 | `RateLimited` | Too many requests |
/// | 5xx | `ProviderUnavailable` | Server-side failure |
/// | Other | `UnexpectedStatus` | Anything else |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_PROVIDER_BAD_REQUEST,
            "Request rejected as invalid (400)".into(),
        ),
        401 => (
            REASON_PROVIDER_AUTH_FAILED,
            "API token missing or invalid (401)".into(),
        ),
        403 => (
            REASON_PROVIDER_AUTH_FAILED,
            "API token not authorized for this zone (403)".into(),
        ),
        404 => (
            REASON_ZONE_NOT_FOUND,
            "Zone or resource not found (404)".into(),
        ),
        409 => (
            REASON_RECORD_CONFLICT,
            "Record conflicts with an existing record (409)".into(),
        ),
        429 => (REASON_RATE_LIMITED, "Rate limit exceeded (429)".into()),
        500..=599 => (
            REASON_PROVIDER_UNAVAILABLE,
            format!("Server error ({status_code})"),
        ),
        _ => (
            REASON_UNEXPECTED_STATUS,
            format!("Unexpected HTTP status ({status_code})"),
        ),
    }
}

/// Map a `reqwest` transport error to a reason code.
///
/// Use this when no HTTP status was received, or when the body could not be read.
#[must_use]
pub fn map_transport_error(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        REASON_TIMEOUT
    } else if err.is_decode() || err.is_body() {
        REASON_DECODE_FAILED
    } else if let Some(status) = err.status() {
        map_http_error_to_reason(status.as_u16()).0
    } else {
        REASON_UNREACHABLE
    }
}

#[cfg(test)]
#[path = "http_errors_tests.rs"]
mod http_errors_tests;
