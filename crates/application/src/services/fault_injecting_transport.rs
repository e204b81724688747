//! Fault-injecting transport
//!
//! Decorates a [`TransportPort`] with the fault-injection protocol. Every
//! request goes through the same fixed sequence:
//!
//! 1. log the incoming request
//! 2. sleep for a sampled pre-delay
//! 3. roll the drop decision
//! 4. forward to the inner transport unless dropped
//! 5. sleep for a sampled post-delay, whatever happened in 3 and 4
//! 6. hand back the inner result (or `TransportError::Dropped`) untouched
//!
//! The sleeps only suspend the current request. They can be interrupted with
//! a [`CancellationToken`], in which case the request ends immediately with
//! `TransportError::Cancelled`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::FaultConfig;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, debug, info, instrument, warn};

use super::delay_generator::DelayGenerator;
use super::fault_stats::{FaultCounters, FaultStats};
use crate::ports::{ProxyRequest, ProxyResponse, TransportError, TransportPort};

/// Transport that injects latency and drops around an inner transport
pub struct FaultInjectingTransport {
    inner: Arc<dyn TransportPort>,
    config: FaultConfig,
    generator: DelayGenerator,
    counters: FaultCounters,
    dispatch: Option<Dispatch>,
}

impl std::fmt::Debug for FaultInjectingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultInjectingTransport")
            .field("inner", &"<TransportPort>")
            .field("config", &self.config)
            .field("generator", &self.generator)
            .field("dispatch", &self.dispatch.is_some())
            .finish_non_exhaustive()
    }
}

impl FaultInjectingTransport {
    /// Wrap `inner` with the faults described by `config`
    pub fn new(config: FaultConfig, inner: Arc<dyn TransportPort>) -> Self {
        let generator = DelayGenerator::from_config(&config);
        Self {
            inner,
            config,
            generator,
            counters: FaultCounters::default(),
            dispatch: None,
        }
    }

    /// Send this transport's events to `dispatch` instead of the global subscriber
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Fault configuration in effect
    pub const fn config(&self) -> &FaultConfig {
        &self.config
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> FaultStats {
        self.counters.snapshot()
    }

    /// Run the fault-injection protocol, aborting if `cancel` fires during a delay
    pub async fn round_trip_until(
        &self,
        request: ProxyRequest,
        cancel: &CancellationToken,
    ) -> Result<ProxyResponse, TransportError> {
        match &self.dispatch {
            Some(dispatch) => {
                self.run(request, cancel)
                    .with_subscriber(dispatch.clone())
                    .await
            },
            None => self.run(request, cancel).await,
        }
    }

    #[instrument(
        name = "fault_round_trip",
        skip_all,
        fields(method = %request.method(), uri = %request.uri())
    )]
    async fn run(
        &self,
        request: ProxyRequest,
        cancel: &CancellationToken,
    ) -> Result<ProxyResponse, TransportError> {
        info!("Incoming request");
        self.counters.record_request();

        let pre = self.generator.pre_delay();
        debug!(delay_ms = pre.as_millis(), "Sleeping before forwarding");
        self.pause(pre, cancel).await?;

        let outcome = if self.generator.roll_drop(self.config.drop_probability()) {
            info!(
                probability = %self.config.drop_probability(),
                "Dropping request"
            );
            self.counters.record_drop();
            Err(TransportError::Dropped)
        } else {
            debug!(destination = %self.config.destination(), "Forwarding request");
            let result = self.inner.round_trip(request).await;
            self.counters.record_forward(result.is_ok());
            if let Err(ref e) = result {
                debug!(error = %e, "Upstream returned an error");
            }
            result
        };

        let post = self.generator.post_delay();
        debug!(delay_ms = post.as_millis(), "Sleeping after response");
        self.pause(post, cancel).await?;

        debug!(
            status = outcome.as_ref().map_or(0, |r| r.status().as_u16()),
            "Returning response to client"
        );
        outcome
    }

    /// Sleep for `delay` unless `cancel` fires first
    async fn pause(&self, delay: Duration, cancel: &CancellationToken) -> Result<(), TransportError> {
        if delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                warn!(delay_ms = delay.as_millis(), "Request cancelled during injected delay");
                self.counters.record_cancel();
                Err(TransportError::Cancelled)
            },
            () = tokio::time::sleep(delay) => {
                self.counters.record_delay(delay);
                Ok(())
            },
        }
    }
}

#[async_trait]
impl TransportPort for FaultInjectingTransport {
    async fn round_trip(&self, request: ProxyRequest) -> Result<ProxyResponse, TransportError> {
        self.round_trip_until(request, &CancellationToken::new())
            .await
    }
}
