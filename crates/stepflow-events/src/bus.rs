use crate::envelope::Envelope;
use crate::event::FlowEvent;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use stepflow_core::DispatchConfig;

/// Receiver of flow events. Returning `Err` marks the delivery as failed;
/// the bus logs it and carries on with the next listener.
pub trait EventListener: Send + Sync {
    fn name(&self) -> &str {
        "listener"
    }

    fn on_event(&self, event: &FlowEvent) -> anyhow::Result<()>;
}

impl<L: EventListener + ?Sized> EventListener for Arc<L> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_event(&self, event: &FlowEvent) -> anyhow::Result<()> {
        (**self).on_event(event)
    }
}

struct FnListener<F>(F);

impl<F> EventListener for FnListener<F>
where
    F: Fn(&FlowEvent) + Send + Sync,
{
    fn name(&self) -> &str {
        "closure"
    }

    fn on_event(&self, event: &FlowEvent) -> anyhow::Result<()> {
        (self.0)(event);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionToken(u64);

impl SubscriptionToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub token: SubscriptionToken,
    pub listener: String,
    pub reason: String,
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failures.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusStats {
    pub total_sent: usize,
    pub total_delivered: usize,
    pub total_failed: usize,
    pub listeners: usize,
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    listeners: Vec<(SubscriptionToken, Arc<dyn EventListener>)>,
    stats: BusStats,
}

struct BusInner {
    state: Mutex<BusState>,
    log_events: bool,
}

/// Registry of listeners plus synchronous fan-out. Clones share one
/// registry, so hand a clone to every subsystem that emits or subscribes.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .field("log_events", &self.inner.log_events)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(&DispatchConfig::default())
    }

    pub fn with_config(cfg: &DispatchConfig) -> Self {
        Self {
            inner: Arc::new(BusInner {
                state: Mutex::new(BusState::default()),
                log_events: cfg.log_events,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, BusState> {
        match self.inner.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("event bus registry lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    pub fn subscribe<L: EventListener + 'static>(&self, listener: L) -> SubscriptionToken {
        let listener: Arc<dyn EventListener> = Arc::new(listener);
        let mut state = self.state();
        let token = SubscriptionToken(state.next_id);
        state.next_id += 1;
        tracing::debug!(token = %token, listener = listener.name(), "listener subscribed");
        state.listeners.push((token, listener));
        token
    }

    pub fn subscribe_fn<F>(&self, f: F) -> SubscriptionToken
    where
        F: Fn(&FlowEvent) + Send + Sync + 'static,
    {
        self.subscribe(FnListener(f))
    }

    /// Removes the listener registered under `token`. Returns `false` if
    /// it was already gone.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        let mut state = self.state();
        let before = state.listeners.len();
        state.listeners.retain(|(t, _)| *t != token);
        let removed = state.listeners.len() != before;
        if removed {
            tracing::debug!(token = %token, "listener unsubscribed");
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.state().listeners.len()
    }

    pub fn stats(&self) -> BusStats {
        let state = self.state();
        BusStats {
            listeners: state.listeners.len(),
            ..state.stats.clone()
        }
    }

    /// Delivers `event` to every listener registered right now, in
    /// registration order, on the calling thread.
    ///
    /// The registry lock is released before any listener runs, so
    /// listeners may subscribe or unsubscribe from inside `on_event`;
    /// such changes take effect from the next dispatch.
    pub fn dispatch(&self, event: FlowEvent) -> DispatchReport {
        let listeners = {
            let mut state = self.state();
            state.stats.total_sent += 1;
            state.listeners.clone()
        };

        tracing::debug!(kind = %event.kind(), listeners = listeners.len(), "dispatching event");
        if self.inner.log_events {
            match Envelope::from_event(&event).and_then(|env| env.to_json()) {
                Ok(json) => tracing::debug!(envelope = %json, "event envelope"),
                Err(err) => tracing::warn!(error = %err, "failed to encode event for logging"),
            }
        }

        let mut report = DispatchReport::default();
        for (token, listener) in listeners {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));
            let reason = match outcome {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(err)) => format!("{:#}", err),
                Err(panic) => format!("listener panicked: {}", panic_message(&*panic)),
            };
            tracing::warn!(
                token = %token,
                listener = listener.name(),
                kind = %event.kind(),
                error = %reason,
                "event delivery failed"
            );
            report.failures.push(DeliveryFailure {
                token,
                listener: listener.name().to_string(),
                reason,
            });
        }

        let mut state = self.state();
        state.stats.total_delivered += report.delivered;
        state.stats.total_failed += report.failures.len();
        report
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
