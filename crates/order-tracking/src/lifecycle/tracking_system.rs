use crate::clients::{OrderClient, ProfileClient};
use crate::config::TrackingConfig;
use crate::error::TrackingError;
use crate::model::{OrderId, RawCourier, RawOrder, RawVendor};
use crate::route::{OsrmRouter, RoutingProvider};
use crate::session::{Observer, SessionHandle, TrackingSession};
use order_store::DocumentActor;
use tracing::{error, info};

const COLLECTION_BUFFER: usize = 100;

/// Runs the order, vendor and courier collections and starts tracking sessions
/// against them.
///
/// ```no_run
/// # async fn demo() -> Result<(), order_tracking::TrackingError> {
/// use order_tracking::{OrderId, TrackingConfig, TrackingSystem, TrackingView};
///
/// let system = TrackingSystem::new(TrackingConfig::default());
/// let router = system.osrm_router()?;
/// let (tx, mut views) = tokio::sync::mpsc::unbounded_channel::<TrackingView>();
///
/// let session = system.track(OrderId::from("order-1"), router, tx).await?;
/// while let Some(view) = views.recv().await {
///     println!("{view:?}");
/// }
/// session.stop().await?;
/// system.shutdown().await
/// # }
/// ```
pub struct TrackingSystem {
    pub order_client: OrderClient,
    pub profile_client: ProfileClient,
    config: TrackingConfig,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl TrackingSystem {
    /// Spawns one actor per collection. Must be called inside a Tokio runtime.
    pub fn new(config: TrackingConfig) -> Self {
        let (order_actor, orders) = DocumentActor::<RawOrder>::new(COLLECTION_BUFFER);
        let (vendor_actor, vendors) = DocumentActor::<RawVendor>::new(COLLECTION_BUFFER);
        let (courier_actor, couriers) = DocumentActor::<RawCourier>::new(COLLECTION_BUFFER);

        let handles = vec![
            tokio::spawn(order_actor.run()),
            tokio::spawn(vendor_actor.run()),
            tokio::spawn(courier_actor.run()),
        ];

        Self {
            order_client: OrderClient::new(orders),
            profile_client: ProfileClient::new(vendors, couriers),
            config,
            handles,
        }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// An [`OsrmRouter`] for the configured routing server.
    pub fn osrm_router(&self) -> Result<OsrmRouter, TrackingError> {
        OsrmRouter::with_base_url(
            &self.config.router_url,
            &self.config.router_profile,
            self.config.io_timeout(),
        )
        .map_err(|e| TrackingError::RouterSetup(e.to_string()))
    }

    /// Starts a session for `order_id` that reports to `observer`.
    pub async fn track<P, O>(&self, order_id: OrderId, router: P, observer: O) -> Result<SessionHandle, TrackingError>
    where
        P: RoutingProvider + 'static,
        O: Observer,
    {
        TrackingSession::new(order_id, self.profile_client.clone(), router, &self.config)
            .start(&self.order_client, observer)
            .await
    }

    /// Drops the clients and waits for every collection to stop.
    ///
    /// Sessions still running see their feed close and terminate.
    pub async fn shutdown(self) -> Result<(), TrackingError> {
        info!("Shutting down tracking system...");

        drop(self.order_client);
        drop(self.profile_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Collection task failed: {:?}", e);
                return Err(TrackingError::TaskFailed(e.to_string()));
            }
        }

        info!("Tracking system shutdown complete.");
        Ok(())
    }
}
