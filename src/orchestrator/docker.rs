// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Docker Engine client for Swarm services.
//!
//! Talks to the Engine REST API over the local Unix socket
//! (`unix:///var/run/docker.sock`, the default) or over HTTP(S) for a remote
//! engine or a socket proxy.
//!
//! # Endpoints
//!
//! - `GET /services` - initial listing
//! - `GET /services/{id}` - snapshot for one event
//! - `GET /info` - Swarm membership check at startup
//! - `GET /events?filters={"type":["service"]}` - newline-delimited JSON stream

use super::{EventStream, Orchestrator};
use crate::constants::{DOCKER_EVENT_TYPE_SERVICE, SWARM_STATE_ACTIVE};
use crate::errors::OrchestratorError;
use crate::http_errors::map_transport_error;
use crate::status_reasons::REASON_UNREACHABLE;
use crate::workload::{Labels, WorkloadAction, WorkloadEvent, WorkloadSnapshot};
use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::fmt::{self, Display};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Event filter sent to `/events`.
const SERVICE_EVENTS_FILTER: &str = r#"{"type":["service"]}"#;

/// Base URL for requests sent over a Unix socket. The host only fills the
/// `Host` header; the socket decides where the request goes.
const UNIX_SOCKET_BASE_URL: &str = "http://localhost/";

/// Where the Docker Engine API is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerEndpoint {
    /// Engine or socket proxy reachable over HTTP(S)
    Http(Url),
    /// Local engine socket, e.g. `/var/run/docker.sock`
    Unix(PathBuf),
}

impl DockerEndpoint {
    /// URL requests are built on.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket base URL cannot be parsed.
    pub fn base_url(&self) -> Result<Url, OrchestratorError> {
        match self {
            Self::Http(url) => Ok(url.clone()),
            Self::Unix(_) => Url::parse(UNIX_SOCKET_BASE_URL).map_err(|e| {
                OrchestratorError::Connection {
                    endpoint: self.to_string(),
                    reason: REASON_UNREACHABLE,
                    message: e.to_string(),
                }
            }),
        }
    }

    fn client_builder(&self) -> Result<reqwest::ClientBuilder, OrchestratorError> {
        let builder = HttpClient::builder();
        match self {
            Self::Http(_) => Ok(builder),
            #[cfg(unix)]
            Self::Unix(path) => Ok(builder.unix_socket(path.clone())),
            #[cfg(not(unix))]
            Self::Unix(_) => Err(OrchestratorError::Connection {
                endpoint: self.to_string(),
                reason: REASON_UNREACHABLE,
                message: "Unix sockets are not available on this platform".to_string(),
            }),
        }
    }
}

impl fmt::Display for DockerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServiceResponse {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Spec", default)]
    spec: ServiceSpec,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceSpec {
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Labels", default)]
    labels: Labels,
}

impl From<ServiceResponse> for WorkloadSnapshot {
    fn from(service: ServiceResponse) -> Self {
        WorkloadSnapshot::new(service.id, service.spec.name, service.spec.labels)
    }
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    #[serde(rename = "Swarm", default)]
    swarm: SwarmInfo,
}

#[derive(Debug, Default, Deserialize)]
struct SwarmInfo {
    #[serde(rename = "LocalNodeState", default)]
    local_node_state: String,
}

#[derive(Debug, Deserialize)]
struct DockerEvent {
    #[serde(rename = "Type", default)]
    event_type: String,
    #[serde(rename = "Action", default)]
    action: String,
    #[serde(rename = "Actor", default)]
    actor: DockerActor,
}

#[derive(Debug, Default, Deserialize)]
struct DockerActor {
    #[serde(rename = "ID", default)]
    id: String,
    #[serde(rename = "Attributes", default)]
    attributes: HashMap<String, String>,
}

/// [`Orchestrator`] backed by the Docker Engine API.
#[derive(Debug, Clone)]
pub struct DockerOrchestrator {
    http: HttpClient,
    events_http: HttpClient,
    endpoint: DockerEndpoint,
    base_url: Url,
    public_address: Ipv4Addr,
}

impl DockerOrchestrator {
    /// Create a client for the engine at `endpoint`.
    ///
    /// `timeout` bounds unary requests. The event stream only has a connect
    /// timeout since it stays open indefinitely. `public_address` is what
    /// [`Orchestrator::cluster_public_address`] reports.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be initialized.
    pub fn new(
        endpoint: DockerEndpoint,
        timeout: Duration,
        public_address: Ipv4Addr,
    ) -> Result<Self, OrchestratorError> {
        let build_error = |e: reqwest::Error| OrchestratorError::Connection {
            endpoint: endpoint.to_string(),
            reason: map_transport_error(&e),
            message: e.to_string(),
        };

        let http = endpoint
            .client_builder()?
            .timeout(timeout)
            .build()
            .map_err(build_error)?;
        let events_http = endpoint
            .client_builder()?
            .connect_timeout(timeout)
            .build()
            .map_err(build_error)?;
        let base_url = endpoint.base_url()?;

        Ok(Self {
            http,
            events_http,
            endpoint,
            base_url,
            public_address,
        })
    }

    /// Swarm `LocalNodeState` of the engine (`active`, `inactive`, `pending`...).
    ///
    /// # Errors
    ///
    /// Returns an error if `/info` cannot be fetched or decoded.
    pub async fn swarm_state(&self) -> Result<String, OrchestratorError> {
        let info: InfoResponse = self.get_json(self.endpoint(&["info"])?, "engine info").await?;
        Ok(info.swarm.local_node_state)
    }

    /// Log a warning when the engine is not an active Swarm member.
    ///
    /// Never fails; an unreachable engine is logged and startup continues.
    pub async fn warn_if_not_swarm(&self) {
        match self.swarm_state().await {
            Ok(state) if state == SWARM_STATE_ACTIVE => {
                info!(endpoint = %self.endpoint, "Connected to active Swarm node");
            }
            Ok(state) => {
                warn!(
                    endpoint = %self.endpoint,
                    local_node_state = %state,
                    "Docker engine is not an active Swarm member, no services will be found"
                );
            }
            Err(e) => {
                warn!(
                    endpoint = %self.endpoint,
                    reason = e.status_reason(),
                    error = %e,
                    "Failed to query Swarm state"
                );
            }
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, OrchestratorError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| OrchestratorError::Connection {
                endpoint: self.endpoint.to_string(),
                reason: REASON_UNREACHABLE,
                message: "Docker host URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T>(&self, url: Url, what: &str) -> Result<T, OrchestratorError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| connection_error(&url, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| connection_error(&url, &e))?;

        if !status.is_success() {
            return Err(OrchestratorError::Http {
                path: url.path().to_string(),
                status_code: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| OrchestratorError::Decode {
            what: what.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl Orchestrator for DockerOrchestrator {
    async fn list_workloads(&self) -> Result<Vec<WorkloadSnapshot>, OrchestratorError> {
        let services: Vec<ServiceResponse> = self
            .get_json(self.endpoint(&["services"])?, "service list")
            .await?;
        debug!(count = services.len(), "Listed services");
        Ok(services.into_iter().map(WorkloadSnapshot::from).collect())
    }

    async fn subscribe(&self) -> Result<EventStream, OrchestratorError> {
        let subscribe_error = |reason: String| OrchestratorError::Subscribe { reason };

        let mut url = self
            .endpoint(&["events"])
            .map_err(|e| subscribe_error(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("filters", SERVICE_EVENTS_FILTER);

        let response = self
            .events_http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| subscribe_error(connection_error(&url, &e).to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(subscribe_error(format!("HTTP {status}: {body}")));
        }

        info!(endpoint = %self.endpoint, "Subscribed to service events");
        Ok(decode_event_stream(response.bytes_stream()))
    }

    async fn get_workload(&self, id: &str) -> Result<WorkloadSnapshot, OrchestratorError> {
        let url = self.endpoint(&["services", id])?;
        match self.get_json::<ServiceResponse>(url, "service").await {
            Ok(service) => Ok(service.into()),
            Err(OrchestratorError::Http { status_code, .. })
                if status_code == StatusCode::NOT_FOUND.as_u16() =>
            {
                Err(OrchestratorError::WorkloadNotFound { id: id.to_string() })
            }
            Err(e) => Err(e),
        }
    }

    async fn cluster_public_address(&self) -> Result<Ipv4Addr, OrchestratorError> {
        Ok(self.public_address)
    }
}

fn connection_error(url: &Url, err: &reqwest::Error) -> OrchestratorError {
    OrchestratorError::Connection {
        endpoint: url.to_string(),
        reason: map_transport_error(err),
        message: err.to_string(),
    }
}

/// Append `chunk` to `buffer` and drain every complete line.
///
/// Partial trailing data stays in `buffer` until the next chunk. Blank lines
/// and trailing `\r` are dropped.
pub(crate) fn split_lines(buffer: &mut Vec<u8>, chunk: &[u8]) -> Vec<Vec<u8>> {
    buffer.extend_from_slice(chunk);

    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
        let mut line: Vec<u8> = buffer.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if !line.iter().all(u8::is_ascii_whitespace) {
            lines.push(line);
        }
    }
    lines
}

/// Decode one event line. Returns `None` for events the reconciler ignores.
pub(crate) fn decode_event(line: &[u8]) -> Result<Option<WorkloadEvent>, OrchestratorError> {
    let event: DockerEvent =
        serde_json::from_slice(line).map_err(|e| OrchestratorError::Decode {
            what: "service event".to_string(),
            reason: e.to_string(),
        })?;

    if event.event_type != DOCKER_EVENT_TYPE_SERVICE {
        debug!(event_type = %event.event_type, "Ignoring non-service event");
        return Ok(None);
    }

    let Some(action) = WorkloadAction::parse(&event.action) else {
        debug!(action = %event.action, "Ignoring untracked service action");
        return Ok(None);
    };

    if event.actor.id.is_empty() {
        return Err(OrchestratorError::Decode {
            what: "service event".to_string(),
            reason: "event has no actor ID".to_string(),
        });
    }

    let mut workload_event = WorkloadEvent::new(event.actor.id, action);
    if let Some(name) = event.actor.attributes.get("name") {
        workload_event = workload_event.with_name(name.clone());
    }
    Ok(Some(workload_event))
}

struct DecodeState<S> {
    chunks: std::pin::Pin<Box<S>>,
    buffer: Vec<u8>,
    pending: VecDeque<Result<WorkloadEvent, OrchestratorError>>,
    finished: bool,
}

impl<S> DecodeState<S> {
    fn push_lines(&mut self, lines: Vec<Vec<u8>>) {
        for line in lines {
            match decode_event(&line) {
                Ok(Some(event)) => self.pending.push_back(Ok(event)),
                Ok(None) => {}
                Err(e) => self.pending.push_back(Err(e)),
            }
        }
    }
}

/// Turn a byte stream of newline-delimited Docker events into [`EventStream`].
///
/// Undecodable lines are yielded as errors without ending the stream. A
/// transport error is yielded once and ends the stream.
pub(crate) fn decode_event_stream<S, B, E>(chunks: S) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = DecodeState {
        chunks: Box::pin(chunks),
        buffer: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.chunks.next().await {
                Some(Ok(chunk)) => {
                    let lines = split_lines(&mut state.buffer, chunk.as_ref());
                    state.push_lines(lines);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    state.pending.push_back(Err(OrchestratorError::Connection {
                        endpoint: "events".to_string(),
                        reason: REASON_UNREACHABLE,
                        message: e.to_string(),
                    }));
                }
                None => {
                    state.finished = true;
                    // Flush a final line that had no newline
                    let mut rest = std::mem::take(&mut state.buffer);
                    rest.push(b'\n');
                    let lines = split_lines(&mut Vec::new(), &rest);
                    state.push_lines(lines);
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod docker_tests;
