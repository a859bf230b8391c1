// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Startup configuration loaded from environment variables.
//!
//! All settings are read once. [`Config::from_env`] reads the process
//! environment; [`Config::from_lookup`] takes any lookup function so tests can
//! supply variables without touching global state.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `CLOUDFLARE_DOMAINS` | required |
//! | `PUBLIC_IP` | unset |
//! | `SWARM_PUBLIC_IP` | unset |
//! | `DOCKER_HOST` | `unix:///var/run/docker.sock` |
//! | `CLOUDFLARE_API_URL` | `https://api.cloudflare.com/client/v4` |
//! | `HTTP_TIMEOUT_SECS` | `10` |
//! | `CHECK_INTERVAL` | `0` (event-driven only) |
//! | `METRICS_BIND_ADDRESS` | unset (no metrics server) |

use crate::constants::{
    CLOUDFLARE_API_BASE, DEFAULT_CHECK_INTERVAL_SECS, DEFAULT_DOCKER_HOST,
    DEFAULT_HTTP_TIMEOUT_SECS, ENV_CHECK_INTERVAL, ENV_CLOUDFLARE_API_URL, ENV_CLOUDFLARE_DOMAINS,
    ENV_DOCKER_HOST, ENV_HTTP_TIMEOUT_SECS, ENV_METRICS_BIND_ADDRESS, ENV_PUBLIC_IP,
    ENV_SWARM_PUBLIC_IP, UNSET_PUBLIC_ADDRESS,
};
use crate::domains::DomainTable;
use crate::errors::ConfigError;
use crate::orchestrator::DockerEndpoint;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Domain suffix → zone credentials, in configuration order
    pub domains: DomainTable,
    /// Address new records point at; `0.0.0.0` when unset
    pub public_address: Ipv4Addr,
    /// Docker Engine API endpoint
    pub docker_host: DockerEndpoint,
    /// Cloudflare API base URL
    pub cloudflare_api_url: Url,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
    /// Periodic full resync, if enabled
    pub check_interval: Option<Duration>,
    /// Where to serve `/metrics`, if enabled
    pub metrics_bind_address: Option<SocketAddr>,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if no domain is configured or a setting is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if no domain is configured or a setting is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let domains = load_domain_table(lookup(ENV_CLOUDFLARE_DOMAINS).as_deref());
        if domains.is_empty() {
            return Err(ConfigError::NoDomains {
                variable: ENV_CLOUDFLARE_DOMAINS.to_string(),
            });
        }
        debug!(
            domains = ?domains.domains().collect::<Vec<_>>(),
            "Loaded domain configuration"
        );

        let public_address = resolve_public_address(
            non_empty(lookup(ENV_PUBLIC_IP)).as_deref(),
            non_empty(lookup(ENV_SWARM_PUBLIC_IP)).as_deref(),
        )?;

        let docker_host = parse_docker_host(
            non_empty(lookup(ENV_DOCKER_HOST))
                .as_deref()
                .unwrap_or(DEFAULT_DOCKER_HOST),
        )?;

        let cloudflare_api_url = parse_url(
            ENV_CLOUDFLARE_API_URL,
            non_empty(lookup(ENV_CLOUDFLARE_API_URL))
                .as_deref()
                .unwrap_or(CLOUDFLARE_API_BASE),
        )?;

        let http_timeout = Duration::from_secs(parse_secs(
            ENV_HTTP_TIMEOUT_SECS,
            lookup(ENV_HTTP_TIMEOUT_SECS),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);

        let check_interval = match parse_secs(
            ENV_CHECK_INTERVAL,
            lookup(ENV_CHECK_INTERVAL),
            DEFAULT_CHECK_INTERVAL_SECS,
        )? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let metrics_bind_address = non_empty(lookup(ENV_METRICS_BIND_ADDRESS))
            .map(|value| {
                value
                    .parse::<SocketAddr>()
                    .map_err(|_| ConfigError::InvalidBindAddress {
                        variable: ENV_METRICS_BIND_ADDRESS.to_string(),
                        value,
                    })
            })
            .transpose()?;

        Ok(Self {
            domains,
            public_address,
            docker_host,
            cloudflare_api_url,
            http_timeout,
            check_interval,
            metrics_bind_address,
        })
    }

    /// True when neither public address override is set.
    #[must_use]
    pub fn public_address_unset(&self) -> bool {
        self.public_address == UNSET_PUBLIC_ADDRESS
    }
}

/// Parse the domain table, degrading to an empty table on malformed JSON.
///
/// An absent variable is treated as `{}`. A parse failure is logged; the
/// caller decides whether an empty table is fatal.
#[must_use]
pub fn load_domain_table(raw: Option<&str>) -> DomainTable {
    let raw = raw.unwrap_or("{}");
    match DomainTable::from_json(raw) {
        Ok(table) => table,
        Err(e) => {
            let err = ConfigError::MalformedDomains {
                variable: ENV_CLOUDFLARE_DOMAINS.to_string(),
                reason: e.to_string(),
            };
            error!(error = %err, "Failed to load domain configuration");
            DomainTable::default()
        }
    }
}

/// Pick the public address: `PUBLIC_IP`, then `SWARM_PUBLIC_IP`, then `0.0.0.0`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPublicAddress`] if the chosen value is not IPv4.
pub fn resolve_public_address(
    public_ip: Option<&str>,
    swarm_public_ip: Option<&str>,
) -> Result<Ipv4Addr, ConfigError> {
    let (variable, value) = match (public_ip, swarm_public_ip) {
        (Some(value), _) => (ENV_PUBLIC_IP, value),
        (None, Some(value)) => (ENV_SWARM_PUBLIC_IP, value),
        (None, None) => return Ok(UNSET_PUBLIC_ADDRESS),
    };

    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidPublicAddress {
            variable: variable.to_string(),
            value: value.to_string(),
        })
}

/// Parse `DOCKER_HOST` into an engine endpoint.
///
/// `unix:///path` selects the Unix socket at `/path`. `tcp://host:port`
/// becomes `http://host:port`; `http://` and `https://` are kept.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedDockerHost`] for other schemes or a
/// socket URL without a path, and [`ConfigError::InvalidUrl`] for unparsable
/// values.
pub fn parse_docker_host(value: &str) -> Result<DockerEndpoint, ConfigError> {
    let unsupported = || ConfigError::UnsupportedDockerHost {
        value: value.to_string(),
    };

    if let Some(path) = value.strip_prefix("unix://") {
        if path.is_empty() {
            return Err(unsupported());
        }
        return Ok(DockerEndpoint::Unix(PathBuf::from(path)));
    }

    let normalized = if let Some(rest) = value.strip_prefix("tcp://") {
        format!("http://{rest}")
    } else if value.starts_with("http://") || value.starts_with("https://") {
        value.to_string()
    } else {
        return Err(unsupported());
    };

    parse_url(ENV_DOCKER_HOST, &normalized).map(DockerEndpoint::Http)
}

fn parse_url(variable: &str, value: &str) -> Result<Url, ConfigError> {
    // Without a trailing slash Url::join would drop the last path segment
    let with_slash = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };

    Url::parse(&with_slash).map_err(|e| ConfigError::InvalidUrl {
        variable: variable.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_secs(variable: &str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match non_empty(value) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber {
                variable: variable.to_string(),
                value,
            }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
