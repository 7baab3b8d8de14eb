use crate::bus::EventListener;
use crate::envelope::Envelope;
use crate::error::{EventError, EventResult};
use crate::event::FlowEvent;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stepflow_core::ForwardConfig;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardStats {
    pub posted: usize,
    pub failed: usize,
}

#[derive(Default)]
struct Counters {
    posted: AtomicUsize,
    failed: AtomicUsize,
}

/// POSTs every envelope to an HTTP endpoint on the host side.
///
/// `on_event` only spawns the request and returns; the dispatching thread
/// never waits on the network. Failed posts are logged and counted, not
/// retried.
pub struct HttpForwarder {
    client: reqwest::Client,
    endpoint: String,
    runtime: Handle,
    pending: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl HttpForwarder {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, runtime: Handle) -> EventResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EventError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            runtime,
            pending: Mutex::new(Vec::new()),
            counters: Arc::new(Counters::default()),
        })
    }

    /// `Ok(None)` when no endpoint is configured.
    pub fn from_config(cfg: &ForwardConfig, runtime: Handle) -> EventResult<Option<Self>> {
        let Some(endpoint) = cfg.endpoint.as_deref() else {
            return Ok(None);
        };
        let timeout = Duration::from_millis(cfg.timeout_ms());
        Self::new(endpoint, timeout, runtime).map(Some)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn stats(&self) -> ForwardStats {
        ForwardStats {
            posted: self.counters.posted.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Waits for every post spawned so far.
    pub async fn drain(&self) -> ForwardStats {
        let handles = {
            let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
            std::mem::take(&mut *pending)
        };
        for handle in handles {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "forward task aborted");
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.stats()
    }
}

impl EventListener for HttpForwarder {
    fn name(&self) -> &str {
        "http-forwarder"
    }

    fn on_event(&self, event: &FlowEvent) -> anyhow::Result<()> {
        let envelope = Envelope::from_event(event)?;
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let counters = Arc::clone(&self.counters);

        let handle = self.runtime.spawn(async move {
            match client.post(&endpoint).json(&envelope).send().await {
                Ok(resp) if resp.status().is_success() => {
                    counters.posted.fetch_add(1, Ordering::Relaxed);
                }
                Ok(resp) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        endpoint = %endpoint,
                        status = %resp.status(),
                        event_type = %envelope.event_type,
                        "host rejected forwarded event"
                    );
                }
                Err(err) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        endpoint = %endpoint,
                        error = %err,
                        event_type = %envelope.event_type,
                        "failed to forward event"
                    );
                }
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
        Ok(())
    }
}
