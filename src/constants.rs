// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for swarmflare.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

use std::net::Ipv4Addr;

// ============================================================================
// Environment Variables
// ============================================================================

/// JSON table mapping domain suffixes to Cloudflare zone credentials
pub const ENV_CLOUDFLARE_DOMAINS: &str = "CLOUDFLARE_DOMAINS";

/// Public address override, consulted first
pub const ENV_PUBLIC_IP: &str = "PUBLIC_IP";

/// Swarm-specific public address override, consulted after `PUBLIC_IP`
pub const ENV_SWARM_PUBLIC_IP: &str = "SWARM_PUBLIC_IP";

/// Docker Engine API endpoint
pub const ENV_DOCKER_HOST: &str = "DOCKER_HOST";

/// Cloudflare API base URL override
pub const ENV_CLOUDFLARE_API_URL: &str = "CLOUDFLARE_API_URL";

/// Per-request HTTP timeout in seconds
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

/// Periodic resync interval in seconds (0 disables)
pub const ENV_CHECK_INTERVAL: &str = "CHECK_INTERVAL";

/// Bind address for the Prometheus metrics endpoint
pub const ENV_METRICS_BIND_ADDRESS: &str = "METRICS_BIND_ADDRESS";

/// Log output format (`text` or `json`)
pub const ENV_LOG_FORMAT: &str = "RUST_LOG_FORMAT";

// ============================================================================
// Cloudflare API Constants
// ============================================================================

/// Cloudflare v4 API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// The only record type this operator manages
pub const RECORD_TYPE_A: &str = "A";

/// TTL sentinel Cloudflare interprets as "automatic" (required for proxied records)
pub const PROXIED_RECORD_TTL: u32 = 1;

/// TTL for records resolved directly, without the Cloudflare proxy (5 minutes)
pub const DIRECT_RECORD_TTL_SECS: u32 = 300;

// ============================================================================
// Docker Engine Constants
// ============================================================================

/// Default Docker Engine endpoint, the local engine socket
pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

/// Docker event type carrying Swarm service lifecycle changes
pub const DOCKER_EVENT_TYPE_SERVICE: &str = "service";

/// Swarm `LocalNodeState` reported by an active manager or worker
pub const SWARM_STATE_ACTIVE: &str = "active";

// ============================================================================
// Timing Constants
// ============================================================================

/// Default per-request HTTP timeout (10 seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default resync interval; 0 means event-driven only
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 0;

// ============================================================================
// Address Constants
// ============================================================================

/// Sentinel meaning "no public address configured"
pub const UNSET_PUBLIC_ADDRESS: Ipv4Addr = Ipv4Addr::UNSPECIFIED;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of Tokio worker threads
pub const TOKIO_WORKER_THREADS: usize = 2;

/// Thread name for the reconciler runtime
pub const RUNTIME_THREAD_NAME: &str = "swarmflare";
