use crate::config::{TerminalPolicy, TrackingConfig};
use crate::error::TrackingError;
use crate::model::{OrderId, RawOrder};
use crate::resolver::ProfileLookup;
use crate::route::RoutingProvider;
use crate::session::pipeline::{system_clock, Clock, Pipeline};
use crate::session::view::TrackingView;
use async_trait::async_trait;
use order_store::{StoreError, Subscription};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Push source of raw order documents (the store's `subscribe`).
#[async_trait]
pub trait OrderFeed: Send + Sync {
    async fn subscribe(&self, order_id: &OrderId) -> Result<Subscription<RawOrder>, StoreError>;
}

/// Receives views in the order their notifications arrived.
#[async_trait]
pub trait Observer: Send + 'static {
    /// Returns `false` once the observer is gone; the session then terminates.
    async fn on_view(&mut self, view: TrackingView) -> bool;
}

#[async_trait]
impl Observer for mpsc::UnboundedSender<TrackingView> {
    async fn on_view(&mut self, view: TrackingView) -> bool {
        self.send(view).is_ok()
    }
}

#[async_trait]
impl Observer for mpsc::Sender<TrackingView> {
    async fn on_view(&mut self, view: TrackingView) -> bool {
        self.send(view).await.is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Subscribed,
    Terminated,
}

/// Tracks one order for one observer.
///
/// Notifications are processed strictly one at a time; one that arrives mid-processing
/// waits in the subscription feed. Route cache, lookup memo and viewport are private
/// to the session.
pub struct TrackingSession<L, P> {
    order_id: OrderId,
    pipeline: Pipeline<L, P>,
    policy: TerminalPolicy,
    state: watch::Sender<SessionState>,
}

impl<L, P> TrackingSession<L, P>
where
    L: ProfileLookup + 'static,
    P: RoutingProvider + 'static,
{
    pub fn new(order_id: OrderId, lookup: L, router: P, config: &TrackingConfig) -> Self {
        Self::with_clock(order_id, lookup, router, config, system_clock())
    }

    pub fn with_clock(order_id: OrderId, lookup: L, router: P, config: &TrackingConfig, clock: Clock) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            pipeline: Pipeline::new(order_id.clone(), lookup, router, config, clock),
            order_id,
            policy: config.terminal_policy,
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Subscribes and spawns the session task. Returns once the subscription is
    /// registered.
    pub async fn start<F, O>(self, feed: &F, observer: O) -> Result<SessionHandle, TrackingError>
    where
        F: OrderFeed + ?Sized,
        O: Observer,
    {
        let subscription = feed
            .subscribe(&self.order_id)
            .await
            .map_err(|source| TrackingError::Subscribe {
                order_id: self.order_id.to_string(),
                source,
            })?;

        self.state.send_replace(SessionState::Subscribed);
        info!(order_id = %self.order_id, "Tracking session started");

        let (stop, stop_rx) = watch::channel(false);
        let state = self.state.subscribe();
        let order_id = self.order_id.clone();
        let task = tokio::spawn(self.run(subscription, observer, stop_rx));

        Ok(SessionHandle {
            order_id,
            stop,
            state,
            task: Some(task),
        })
    }

    async fn run<O: Observer>(
        mut self,
        mut subscription: Subscription<RawOrder>,
        mut observer: O,
        mut stop: watch::Receiver<bool>,
    ) {
        let reason = loop {
            let update = tokio::select! {
                biased;
                _ = stop.changed() => break "stopped",
                update = subscription.next() => update,
            };
            let Some(raw) = update else {
                break "feed closed";
            };

            let view = tokio::select! {
                biased;
                _ = stop.changed() => break "stopped",
                view = self.pipeline.process(raw) => view,
            };

            let is_final = view.is_final();
            let delivered = tokio::select! {
                biased;
                _ = stop.changed() => break "stopped",
                delivered = observer.on_view(view) => delivered,
            };
            if !delivered {
                break "observer gone";
            }
            debug!(order_id = %self.order_id, generation = self.pipeline.generation(), "View emitted");

            if is_final && self.policy == TerminalPolicy::StopAfterFinalView {
                break "final view emitted";
            }
        };

        drop(subscription);
        self.state.send_replace(SessionState::Terminated);
        if reason == "feed closed" {
            warn!(order_id = %self.order_id, "Order feed closed, terminating session");
        }
        info!(order_id = %self.order_id, reason, "Tracking session terminated");
    }
}

/// Control handle for a running [`TrackingSession`].
///
/// Dropping the handle stops the session without waiting for it.
pub struct SessionHandle {
    order_id: OrderId,
    stop: watch::Sender<bool>,
    state: watch::Receiver<SessionState>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Cancels in-flight work, releases the subscription and waits for the task.
    /// Nothing is emitted after this is called.
    pub async fn stop(mut self) -> Result<(), TrackingError> {
        let _ = self.stop.send(true);
        self.join().await
    }

    /// Waits for the session to terminate on its own (final view, closed feed, or
    /// observer gone).
    pub async fn finished(mut self) -> Result<(), TrackingError> {
        self.join().await
    }

    async fn join(&mut self) -> Result<(), TrackingError> {
        match self.task.take() {
            Some(task) => task.await.map_err(|e| TrackingError::TaskFailed(e.to_string())),
            None => Ok(()),
        }
    }
}
