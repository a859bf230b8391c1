// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for swarmflare.
//!
//! This module provides specialized error types for:
//! - Startup configuration (domain table, addresses, endpoints)
//! - Cloudflare API operations (record lookup and creation)
//! - Docker Engine operations (service listing, inspection, events)
//!
//! Configuration errors are fatal. Provider errors never escape the DNS client:
//! lookups degrade to "not found" and creations to `false`. Orchestrator errors
//! are caught per event, except for subscription failures which end the loop.

use crate::status_reasons::{
    REASON_DECODE_FAILED, REASON_EVENT_STREAM_CLOSED, REASON_PROVIDER_API_ERROR,
    REASON_SUBSCRIBE_FAILED, REASON_TIMEOUT, REASON_WORKLOAD_NOT_FOUND,
};
use thiserror::Error;

/// Errors raised while loading configuration at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The domain table is not valid JSON of the expected shape
    #[error("Failed to parse {variable}: {reason}")]
    MalformedDomains {
        /// Environment variable holding the table
        variable: String,
        /// Parser error message
        reason: String,
    },

    /// No domain is configured, so no hostname could ever be resolved
    #[error("No domain configuration found. Set {variable}, e.g. {{\"example.com\": {{\"zone_id\": \"...\", \"api_key\": \"...\"}}}}")]
    NoDomains {
        /// Environment variable holding the table
        variable: String,
    },

    /// A public address override is not an IPv4 address
    #[error("{variable} must be an IPv4 address, got '{value}'")]
    InvalidPublicAddress {
        /// Environment variable holding the address
        variable: String,
        /// Rejected value
        value: String,
    },

    /// A numeric setting could not be parsed
    #[error("{variable} must be a non-negative integer, got '{value}'")]
    InvalidNumber {
        /// Environment variable holding the number
        variable: String,
        /// Rejected value
        value: String,
    },

    /// Docker endpoint scheme the client cannot reach
    #[error("Unsupported DOCKER_HOST '{value}': use unix://, tcp://, http:// or https://")]
    UnsupportedDockerHost {
        /// Rejected value
        value: String,
    },

    /// The metrics bind address is not `host:port`
    #[error("{variable} must be a socket address like 0.0.0.0:9090, got '{value}'")]
    InvalidBindAddress {
        /// Environment variable holding the address
        variable: String,
        /// Rejected value
        value: String,
    },

    /// A URL setting could not be parsed
    #[error("{variable} is not a valid URL '{value}': {reason}")]
    InvalidUrl {
        /// Environment variable holding the URL
        variable: String,
        /// Rejected value
        value: String,
        /// Parser error message
        reason: String,
    },
}

/// Errors from the Cloudflare DNS API.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Connection failed before an HTTP status was received, or the body could not be read
    #[error("Request to {url} failed ({reason}): {message}")]
    Transport {
        /// Request URL (without credentials)
        url: String,
        /// Reason code from [`crate::http_errors::map_transport_error`]
        reason: &'static str,
        /// Underlying error
        message: String,
    },

    /// Request exceeded the configured timeout
    #[error("Request to {url} timed out after {timeout_ms}ms")]
    Timeout {
        /// Request URL
        url: String,
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// Non-success HTTP status
    #[error("{message} from {url}: {body}")]
    Http {
        /// Request URL
        url: String,
        /// HTTP status code
        status_code: u16,
        /// Reason code from [`crate::http_errors::map_http_error_to_reason`]
        reason: &'static str,
        /// Human-readable status description
        message: String,
        /// Response body, usually Cloudflare's error envelope
        body: String,
    },

    /// Cloudflare answered but reported `success: false`
    #[error("Cloudflare API error: {}", .messages.join("; "))]
    Api {
        /// Error messages from the `errors` array
        messages: Vec<String>,
    },

    /// Response body was not the expected JSON
    #[error("Failed to decode response from {url}: {reason}")]
    Decode {
        /// Request URL
        url: String,
        /// Decoder error message
        reason: String,
    },
}

impl ProviderError {
    /// Returns the reason code for logs and metrics.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Transport { reason, .. } => *reason,
            Self::Timeout { .. } => REASON_TIMEOUT,
            Self::Http { reason, .. } => *reason,
            Self::Api { .. } => REASON_PROVIDER_API_ERROR,
            Self::Decode { .. } => REASON_DECODE_FAILED,
        }
    }
}

/// Errors from the orchestration client.
#[derive(Error, Debug, Clone)]
pub enum OrchestratorError {
    /// Engine endpoint unreachable, request timed out or body unreadable
    #[error("Connection to {endpoint} failed ({reason}): {message}")]
    Connection {
        /// Engine endpoint
        endpoint: String,
        /// Reason code from [`crate::http_errors::map_transport_error`]
        reason: &'static str,
        /// Underlying error
        message: String,
    },

    /// Non-success HTTP status from the engine
    #[error("Docker Engine returned HTTP {status_code} for {path}: {body}")]
    Http {
        /// Request path
        path: String,
        /// HTTP status code
        status_code: u16,
        /// Response body
        body: String,
    },

    /// Response or event could not be decoded
    #[error("Failed to decode {what}: {reason}")]
    Decode {
        /// What was being decoded
        what: String,
        /// Decoder error message
        reason: String,
    },

    /// The workload no longer exists
    #[error("Workload '{id}' not found")]
    WorkloadNotFound {
        /// Workload identifier
        id: String,
    },

    /// Event subscription could not be opened
    #[error("Failed to subscribe to workload events: {reason}")]
    Subscribe {
        /// Underlying error
        reason: String,
    },

    /// The event stream ended; the process should be restarted by its supervisor
    #[error("Workload event stream closed")]
    EventStreamClosed,
}

impl OrchestratorError {
    /// Returns the reason code for logs and metrics.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Connection { reason, .. } => *reason,
            Self::Http { status_code, .. } => {
                crate::http_errors::map_http_error_to_reason(*status_code).0
            }
            Self::Decode { .. } => REASON_DECODE_FAILED,
            Self::WorkloadNotFound { .. } => REASON_WORKLOAD_NOT_FOUND,
            Self::Subscribe { .. } => REASON_SUBSCRIBE_FAILED,
            Self::EventStreamClosed => REASON_EVENT_STREAM_CLOSED,
        }
    }

    /// Returns true if this error ends the reconciliation loop.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Subscribe { .. } | Self::EventStreamClosed)
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
