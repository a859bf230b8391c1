// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation engine.
//!
//! Turns workload events into Cloudflare `A` records. For every routing rule
//! of a created or updated service the engine:
//!
//! 1. extracts the hostname from the rule (skips rules without one),
//! 2. skips hostnames already reconciled for this service,
//! 3. resolves the Cloudflare zone owning the hostname,
//! 4. looks the record up and, when absent, creates it pointing at the
//!    cluster's public address.
//!
//! Remove events are logged and ignored; records are never deleted or
//! updated. Every rule yields a [`RuleOutcome`].
//!
//! Events are handled one at a time, each to completion. A failure while
//! handling one service is logged and counted, and the loop moves on.

use crate::cloudflare::DnsRecordClient;
use crate::constants::UNSET_PUBLIC_ADDRESS;
use crate::domains::DomainTable;
use crate::errors::OrchestratorError;
use crate::metrics;
use crate::orchestrator::Orchestrator;
use crate::rules::{extract_routing, ProxySettings, RoutingRule};
use crate::state::{IdempotencyKey, ReconciliationStore};
use crate::status_reasons::{REASON_PUBLIC_ADDRESS_UNSET, REASON_RECORD_CREATE_FAILED};
use crate::workload::{WorkloadAction, WorkloadEvent, WorkloadSnapshot};
use futures::StreamExt;
use std::future::Future;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Component label used for reconciler metrics.
const COMPONENT: &str = "reconciler";

/// What happened to one routing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The rule has no host matcher
    NoHostname { label: String },
    /// The hostname was reconciled earlier for this service
    AlreadySatisfied { hostname: String },
    /// No configured domain is a suffix of the hostname
    NoDomainConfig { hostname: String },
    /// Cloudflare already has an `A` record for the hostname
    RecordExists { hostname: String },
    /// The record is missing but no public address is configured
    AddressUnset { hostname: String },
    /// A record was created
    Created {
        hostname: String,
        address: Ipv4Addr,
        proxied: bool,
    },
    /// Cloudflare did not accept the record
    CreateFailed { hostname: String },
}

impl RuleOutcome {
    /// Stable name used as a metric label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoHostname { .. } => "no_hostname",
            Self::AlreadySatisfied { .. } => "already_satisfied",
            Self::NoDomainConfig { .. } => "no_domain_config",
            Self::RecordExists { .. } => "record_exists",
            Self::AddressUnset { .. } => "address_unset",
            Self::Created { .. } => "created",
            Self::CreateFailed { .. } => "create_failed",
        }
    }

    /// Hostname the outcome concerns, if the rule had one.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        match self {
            Self::NoHostname { .. } => None,
            Self::AlreadySatisfied { hostname }
            | Self::NoDomainConfig { hostname }
            | Self::RecordExists { hostname }
            | Self::AddressUnset { hostname }
            | Self::Created { hostname, .. }
            | Self::CreateFailed { hostname } => Some(hostname),
        }
    }
}

/// What caused a workload to be reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Initial,
    Event,
    Resync,
}

impl Trigger {
    fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Event => "event",
            Self::Resync => "resync",
        }
    }
}

/// Drives DNS reconciliation from orchestrator events.
pub struct Reconciler {
    orchestrator: Arc<dyn Orchestrator>,
    dns: Arc<dyn DnsRecordClient>,
    store: Arc<dyn ReconciliationStore>,
    domains: Arc<DomainTable>,
    resync_interval: Option<Duration>,
}

impl Reconciler {
    pub fn new(
        orchestrator: Arc<dyn Orchestrator>,
        dns: Arc<dyn DnsRecordClient>,
        store: Arc<dyn ReconciliationStore>,
        domains: Arc<DomainTable>,
    ) -> Self {
        Self {
            orchestrator,
            dns,
            store,
            domains,
            resync_interval: None,
        }
    }

    /// Re-list and reconcile every workload on this interval. `None` or a
    /// zero duration disables it.
    #[must_use]
    pub fn with_resync_interval(mut self, interval: Option<Duration>) -> Self {
        self.resync_interval = interval.filter(|period| !period.is_zero());
        self
    }

    /// Reconcile every routing rule of `snapshot`, in label order.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster public address cannot be obtained.
    /// Rules handled before the failure keep their effects.
    pub async fn reconcile_workload(
        &self,
        snapshot: &WorkloadSnapshot,
    ) -> Result<Vec<RuleOutcome>, OrchestratorError> {
        let facts = extract_routing(&snapshot.labels);
        debug!(
            workload = %snapshot.name,
            rules = facts.rules.len(),
            proxy_settings = facts.proxy_settings.len(),
            "Extracted routing rules"
        );

        let mut address = None;
        let mut outcomes = Vec::with_capacity(facts.rules.len());
        for rule in &facts.rules {
            let outcome = self
                .reconcile_rule(snapshot, rule, &facts.proxy_settings, &mut address)
                .await?;
            metrics::record_rule_outcome(outcome.as_str());
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Handle one workload event.
    ///
    /// `remove` is a no-op. `create` and `update` fetch the current snapshot
    /// and reconcile it.
    ///
    /// # Errors
    ///
    /// Returns an error if the workload cannot be fetched or the public
    /// address cannot be obtained.
    pub async fn handle_event(
        &self,
        event: &WorkloadEvent,
    ) -> Result<Vec<RuleOutcome>, OrchestratorError> {
        match event.action {
            WorkloadAction::Remove => {
                info!(
                    workload = %event.display_name(),
                    id = %event.id,
                    "Service removed, DNS record deletion not implemented"
                );
                Ok(Vec::new())
            }
            WorkloadAction::Create | WorkloadAction::Update => {
                let snapshot = self.orchestrator.get_workload(&event.id).await?;
                self.reconcile_workload(&snapshot).await
            }
        }
    }

    /// Run the reconciliation loop until `shutdown` resolves.
    ///
    /// Subscribes first, then reconciles every existing workload, then
    /// consumes events. With a resync interval the full listing is reconciled
    /// again on every tick.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Subscribe`] if the subscription fails and
    /// [`OrchestratorError::EventStreamClosed`] if the stream ends.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), OrchestratorError>
    where
        F: Future<Output = ()>,
    {
        // Subscribe before listing so no event between the two is lost
        let mut events = self.orchestrator.subscribe().await.map_err(|e| {
            error!(reason = e.status_reason(), error = %e, "Failed to subscribe to service events");
            metrics::record_error(COMPONENT, e.status_reason());
            e
        })?;

        info!(domains = self.domains.len(), "Starting DNS reconciliation");
        self.reconcile_all(Trigger::Initial).await;

        let mut resync = self.resync_interval.map(|period| {
            info!(interval_secs = period.as_secs(), "Periodic resync enabled");
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    info!("Shutdown requested, stopping reconciliation loop");
                    return Ok(());
                }

                next = events.next() => match next {
                    Some(Ok(event)) => self.process_event(&event).await,
                    Some(Err(e)) => {
                        error!(reason = e.status_reason(), error = %e, "Failed to read service event");
                        metrics::record_error(COMPONENT, e.status_reason());
                        if e.is_fatal() {
                            return Err(e);
                        }
                    }
                    None => {
                        let e = OrchestratorError::EventStreamClosed;
                        error!(reason = e.status_reason(), "Service event stream closed");
                        metrics::record_error(COMPONENT, e.status_reason());
                        return Err(e);
                    }
                },

                () = next_tick(&mut resync) => {
                    debug!("Periodic resync");
                    self.reconcile_all(Trigger::Resync).await;
                }
            }
        }
    }

    async fn reconcile_all(&self, trigger: Trigger) {
        let workloads = match self.orchestrator.list_workloads().await {
            Ok(workloads) => workloads,
            Err(e) => {
                error!(
                    trigger = trigger.as_str(),
                    reason = e.status_reason(),
                    error = %e,
                    "Failed to list services"
                );
                metrics::record_error(COMPONENT, e.status_reason());
                return;
            }
        };

        info!(
            trigger = trigger.as_str(),
            count = workloads.len(),
            "Reconciling all services"
        );
        for snapshot in &workloads {
            let started = Instant::now();
            let result = self.reconcile_workload(snapshot).await;
            record_result(trigger, &snapshot.id, &snapshot.name, started, &result);
        }
    }

    async fn process_event(&self, event: &WorkloadEvent) {
        metrics::record_event(event.action.as_str());
        debug!(
            workload = %event.display_name(),
            id = %event.id,
            action = %event.action,
            "Received service event"
        );

        let started = Instant::now();
        let result = self.handle_event(event).await;
        record_result(
            Trigger::Event,
            &event.id,
            event.display_name(),
            started,
            &result,
        );
    }

    async fn reconcile_rule(
        &self,
        snapshot: &WorkloadSnapshot,
        rule: &RoutingRule,
        proxy_settings: &ProxySettings,
        address: &mut Option<Ipv4Addr>,
    ) -> Result<RuleOutcome, OrchestratorError> {
        let Some(hostname) = rule.hostname() else {
            debug!(
                workload = %snapshot.name,
                label = %rule.label,
                rule = %rule.expression(),
                "No host matcher in routing rule"
            );
            return Ok(RuleOutcome::NoHostname {
                label: rule.label.clone(),
            });
        };

        let key = IdempotencyKey::new(snapshot.name.as_str(), hostname.as_str());
        if self.store.contains(&key) {
            debug!(key = %key, "Hostname already reconciled, skipping");
            return Ok(RuleOutcome::AlreadySatisfied { hostname });
        }

        let Some(domain) = self.domains.resolve(&hostname) else {
            warn!(
                workload = %snapshot.name,
                hostname = %hostname,
                "No Cloudflare domain configured for hostname"
            );
            return Ok(RuleOutcome::NoDomainConfig { hostname });
        };

        let proxied = proxy_settings.resolve(rule.expression(), &snapshot.name);

        if let Some(record) = self
            .dns
            .lookup(&domain.zone_id, &domain.api_token, &hostname)
            .await
        {
            metrics::record_dns_lookup(true);
            info!(
                hostname = %hostname,
                content = %record.content,
                "DNS record already exists"
            );
            self.store.mark_satisfied(key);
            return Ok(RuleOutcome::RecordExists { hostname });
        }
        metrics::record_dns_lookup(false);

        let ip = match *address {
            Some(ip) => ip,
            None => {
                let ip = self.orchestrator.cluster_public_address().await?;
                *address = Some(ip);
                ip
            }
        };

        if ip == UNSET_PUBLIC_ADDRESS {
            error!(
                workload = %snapshot.name,
                hostname = %hostname,
                reason = REASON_PUBLIC_ADDRESS_UNSET,
                "Public address not configured, set PUBLIC_IP or SWARM_PUBLIC_IP"
            );
            metrics::record_error(COMPONENT, REASON_PUBLIC_ADDRESS_UNSET);
            return Ok(RuleOutcome::AddressUnset { hostname });
        }

        let created = self
            .dns
            .create(&domain.zone_id, &domain.api_token, &hostname, ip, proxied)
            .await;
        metrics::record_dns_create(created);

        if created {
            self.store.mark_satisfied(key);
            Ok(RuleOutcome::Created {
                hostname,
                address: ip,
                proxied,
            })
        } else {
            // Key stays unset so the next event for this service retries
            warn!(
                workload = %snapshot.name,
                hostname = %hostname,
                reason = REASON_RECORD_CREATE_FAILED,
                "DNS record not created, will retry on next event"
            );
            Ok(RuleOutcome::CreateFailed { hostname })
        }
    }
}

fn record_result(
    trigger: Trigger,
    id: &str,
    name: &str,
    started: Instant,
    result: &Result<Vec<RuleOutcome>, OrchestratorError>,
) {
    let elapsed = started.elapsed();
    match result {
        Ok(outcomes) => {
            debug!(
                trigger = trigger.as_str(),
                workload = %name,
                rules = outcomes.len(),
                elapsed_secs = elapsed.as_secs_f64(),
                "Service reconciled"
            );
            metrics::record_reconciliation_success(trigger.as_str(), elapsed);
        }
        Err(e) => {
            error!(
                trigger = trigger.as_str(),
                workload = %name,
                id = %id,
                reason = e.status_reason(),
                error = %e,
                "Failed to reconcile service"
            );
            metrics::record_error(COMPONENT, e.status_reason());
            metrics::record_reconciliation_error(trigger.as_str(), elapsed);
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
