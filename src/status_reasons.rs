// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard reason codes for failed provider and orchestrator calls.
//!
//! Reasons are stable CamelCase strings. They appear in the `reason` field of
//! error logs and as the `reason` label of the `errors_total` metric, so a
//! dashboard can group failures without parsing messages.

// ============================================================================
// Cloudflare API Reasons
// ============================================================================

/// Cloudflare rejected the request body (HTTP 400)
pub const REASON_PROVIDER_BAD_REQUEST: &str = "ProviderBadRequest";

/// API token missing, invalid, or lacking DNS edit permission (HTTP 401/403)
pub const REASON_PROVIDER_AUTH_FAILED: &str = "ProviderAuthFailed";

/// Zone identifier unknown to Cloudflare (HTTP 404)
pub const REASON_ZONE_NOT_FOUND: &str = "ZoneNotFound";

/// Record conflicts with an existing record (HTTP 409)
pub const REASON_RECORD_CONFLICT: &str = "RecordConflict";

/// Cloudflare rate limit reached (HTTP 429)
pub const REASON_RATE_LIMITED: &str = "RateLimited";

/// Cloudflare returned a server-side error (HTTP 5xx)
pub const REASON_PROVIDER_UNAVAILABLE: &str = "ProviderUnavailable";

/// Cloudflare answered 2xx but reported `success: false`
pub const REASON_PROVIDER_API_ERROR: &str = "ProviderApiError";

// ============================================================================
// Transport Reasons
// ============================================================================

/// Connection could not be established or was reset
pub const REASON_UNREACHABLE: &str = "Unreachable";

/// Request exceeded the configured timeout
pub const REASON_TIMEOUT: &str = "Timeout";

/// Response body could not be decoded
pub const REASON_DECODE_FAILED: &str = "DecodeFailed";

/// Unexpected HTTP status with no dedicated reason
pub const REASON_UNEXPECTED_STATUS: &str = "UnexpectedStatus";

// ============================================================================
// Orchestrator Reasons
// ============================================================================

/// Service disappeared before it could be inspected
pub const REASON_WORKLOAD_NOT_FOUND: &str = "WorkloadNotFound";

/// Event subscription could not be opened
pub const REASON_SUBSCRIBE_FAILED: &str = "SubscribeFailed";

/// Event stream ended
pub const REASON_EVENT_STREAM_CLOSED: &str = "EventStreamClosed";

// ============================================================================
// Reconciler Reasons
// ============================================================================

/// Neither `PUBLIC_IP` nor `SWARM_PUBLIC_IP` is set, records cannot be created
pub const REASON_PUBLIC_ADDRESS_UNSET: &str = "PublicAddressUnset";

/// Cloudflare did not accept a record creation
pub const REASON_RECORD_CREATE_FAILED: &str = "RecordCreateFailed";
