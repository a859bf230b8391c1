// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cloudflare DNS record client.
//!
//! The reconciler needs exactly two operations from the DNS provider: check
//! whether an `A` record exists, and create one. Both are exposed through the
//! [`DnsRecordClient`] trait so the reconciler can be tested without a network.
//!
//! Neither operation returns an error. A failed lookup is logged and reported
//! as "not found"; a failed creation is logged and reported as `false`. The
//! typed [`ProviderError`] is used internally to carry the cause into logs and
//! metrics.
//!
//! # API
//!
//! - Lookup: `GET {api}/zones/{zone_id}/dns_records?name={name}&type=A`
//! - Create: `POST {api}/zones/{zone_id}/dns_records`
//!
//! Both are authenticated with `Authorization: Bearer {api_token}`.

use crate::constants::{DIRECT_RECORD_TTL_SECS, PROXIED_RECORD_TTL, RECORD_TYPE_A};
use crate::errors::ProviderError;
use crate::http_errors::{map_http_error_to_reason, map_transport_error};
use crate::metrics;
use crate::status_reasons::{REASON_TIMEOUT, REASON_UNREACHABLE};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Component label used for provider metrics.
const COMPONENT: &str = "cloudflare";

/// DNS record as returned by Cloudflare.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
    #[serde(default)]
    pub proxied: bool,
    pub ttl: u32,
}

/// Body of a record creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDnsRecord<'a> {
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub name: &'a str,
    pub content: String,
    pub proxied: bool,
    pub ttl: u32,
}

impl<'a> NewDnsRecord<'a> {
    /// An `A` record for `name` pointing at `ip`.
    #[must_use]
    pub fn a_record(name: &'a str, ip: Ipv4Addr, proxied: bool) -> Self {
        Self {
            record_type: RECORD_TYPE_A,
            name,
            content: ip.to_string(),
            proxied,
            ttl: ttl_for(proxied),
        }
    }
}

/// TTL for a record: `1` ("automatic") when proxied, 300 seconds otherwise.
#[must_use]
pub fn ttl_for(proxied: bool) -> u32 {
    if proxied {
        PROXIED_RECORD_TTL
    } else {
        DIRECT_RECORD_TTL_SECS
    }
}

/// Cloudflare v4 response envelope.
#[derive(Debug, Deserialize)]
struct CloudflareResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<CloudflareMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CloudflareMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

impl<T> CloudflareResponse<T> {
    fn into_result(self) -> Result<Option<T>, ProviderError> {
        if self.success {
            Ok(self.result)
        } else {
            Err(ProviderError::Api {
                messages: self
                    .errors
                    .into_iter()
                    .map(|e| format!("{} (code {})", e.message, e.code))
                    .collect(),
            })
        }
    }
}

/// DNS provider operations used by the reconciler.
#[async_trait]
pub trait DnsRecordClient: Send + Sync {
    /// First `A` record named `name` in the zone, or `None` if absent or the lookup failed.
    async fn lookup(&self, zone_id: &str, api_token: &str, name: &str) -> Option<DnsRecord>;

    /// Create an `A` record; returns whether Cloudflare accepted it.
    async fn create(
        &self,
        zone_id: &str,
        api_token: &str,
        name: &str,
        ip: Ipv4Addr,
        proxied: bool,
    ) -> bool;
}

/// [`DnsRecordClient`] backed by the Cloudflare v4 REST API.
#[derive(Debug, Clone)]
pub struct CloudflareClient {
    http: HttpClient,
    api_base: Url,
    timeout: Duration,
}

impl CloudflareClient {
    /// Create a client for `api_base` (e.g. `https://api.cloudflare.com/client/v4/`).
    ///
    /// Every request is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(api_base: Url, timeout: Duration) -> Result<Self, ProviderError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(concat!("swarmflare/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Transport {
                url: api_base.to_string(),
                reason: map_transport_error(&e),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_base,
            timeout,
        })
    }

    fn records_url(&self, zone_id: &str) -> Result<Url, ProviderError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::Transport {
                url: self.api_base.to_string(),
                reason: REASON_UNREACHABLE,
                message: "API base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(["zones", zone_id, "dns_records"]);
        Ok(url)
    }

    /// Query the zone for an `A` record named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, non-2xx status,
    /// undecodable body, or `success: false`.
    pub async fn fetch_record(
        &self,
        zone_id: &str,
        api_token: &str,
        name: &str,
    ) -> Result<Option<DnsRecord>, ProviderError> {
        let mut url = self.records_url(zone_id)?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("type", RECORD_TYPE_A);

        debug!(zone_id = %zone_id, name = %name, "Looking up DNS record");

        let request = self.http.get(url.clone()).bearer_auth(api_token);
        let response: CloudflareResponse<Vec<DnsRecord>> = self.execute(request, &url).await?;

        Ok(response
            .into_result()?
            .and_then(|records| records.into_iter().next()))
    }

    /// Create `record` in the zone.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, non-2xx status,
    /// undecodable body, or `success: false`.
    pub async fn post_record(
        &self,
        zone_id: &str,
        api_token: &str,
        record: &NewDnsRecord<'_>,
    ) -> Result<Option<DnsRecord>, ProviderError> {
        let url = self.records_url(zone_id)?;

        debug!(
            zone_id = %zone_id,
            name = %record.name,
            content = %record.content,
            proxied = record.proxied,
            ttl = record.ttl,
            "Creating DNS record"
        );

        let request = self.http.post(url.clone()).bearer_auth(api_token).json(record);
        let response: CloudflareResponse<DnsRecord> = self.execute(request, &url).await?;

        response.into_result()
    }

    async fn execute<T>(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<CloudflareResponse<T>, ProviderError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(url, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(url, &e))?;

        if !status.is_success() {
            let (reason, message) = map_http_error_to_reason(status.as_u16());
            return Err(ProviderError::Http {
                url: url.to_string(),
                status_code: status.as_u16(),
                reason,
                message,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn transport_error(&self, url: &Url, err: &reqwest::Error) -> ProviderError {
        match map_transport_error(err) {
            REASON_TIMEOUT => ProviderError::Timeout {
                url: url.to_string(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            },
            reason => ProviderError::Transport {
                url: url.to_string(),
                reason,
                message: err.to_string(),
            },
        }
    }
}

#[async_trait]
impl DnsRecordClient for CloudflareClient {
    async fn lookup(&self, zone_id: &str, api_token: &str, name: &str) -> Option<DnsRecord> {
        match self.fetch_record(zone_id, api_token, name).await {
            Ok(record) => record,
            Err(e) => {
                error!(
                    zone_id = %zone_id,
                    name = %name,
                    reason = e.status_reason(),
                    error = %e,
                    "Failed to look up DNS record, treating as absent"
                );
                metrics::record_error(COMPONENT, e.status_reason());
                None
            }
        }
    }

    async fn create(
        &self,
        zone_id: &str,
        api_token: &str,
        name: &str,
        ip: Ipv4Addr,
        proxied: bool,
    ) -> bool {
        let record = NewDnsRecord::a_record(name, ip, proxied);
        match self.post_record(zone_id, api_token, &record).await {
            Ok(created) => {
                info!(
                    name = %name,
                    content = %ip,
                    proxied = proxied,
                    record_id = created.and_then(|r| r.id).as_deref().unwrap_or("unknown"),
                    "DNS record created"
                );
                true
            }
            Err(e) => {
                error!(
                    zone_id = %zone_id,
                    name = %name,
                    reason = e.status_reason(),
                    error = %e,
                    "Failed to create DNS record"
                );
                metrics::record_error(COMPONENT, e.status_reason());
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "cloudflare_tests.rs"]
mod cloudflare_tests;
