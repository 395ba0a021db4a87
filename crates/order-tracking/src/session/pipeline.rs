use crate::config::TrackingConfig;
use crate::fulfillment::{classify, step_states, FulfillmentStatus};
use crate::model::{OrderId, OrderSnapshot, RawOrder};
use crate::resolver::{CoordinateResolver, ProfileLookup, Resolution};
use crate::route::{RouteResult, RouteThrottle, RoutingProvider};
use crate::session::view::{CourierCard, OrderTracking, Progress, TrackingView, CANCELLED_BANNER};
use crate::viewport::ViewportFitter;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of "now" for route throttling.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Turns one raw notification into one view. Owns every piece of per-session state.
pub struct Pipeline<L, P> {
    order_id: OrderId,
    resolver: CoordinateResolver<L>,
    throttle: RouteThrottle<P>,
    fitter: ViewportFitter,
    clock: Clock,
    generation: u64,
    last_status: Option<FulfillmentStatus>,
}

impl<L: ProfileLookup, P: RoutingProvider> Pipeline<L, P> {
    pub fn new(order_id: OrderId, lookup: L, router: P, config: &TrackingConfig, clock: Clock) -> Self {
        Self {
            order_id,
            resolver: CoordinateResolver::new(lookup, config.io_timeout()),
            throttle: RouteThrottle::new(router, config.route_interval(), config.io_timeout()),
            fitter: ViewportFitter::new(config.viewport_min_span, config.default_center),
            clock,
            generation: 0,
            last_status: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn process(&mut self, raw: Option<RawOrder>) -> TrackingView {
        self.generation += 1;
        let Some(raw) = raw else {
            debug!(order_id = %self.order_id, generation = self.generation, "Order not found");
            return TrackingView::NotFound {
                order_id: self.order_id.clone(),
            };
        };

        let snapshot = OrderSnapshot::normalize(self.order_id.clone(), raw);
        let status = snapshot.status;
        self.check_transition(status);

        let step = classify(status);
        let progress = match step.ordinal {
            Some(current) => Progress::Steps {
                steps: step_states(current).to_vec(),
            },
            None => Progress::Cancelled {
                banner: CANCELLED_BANNER,
            },
        };

        let Resolution { points, courier_photo } = self.resolver.resolve(&snapshot).await;

        let map_eligible = status.map_eligible();
        let route = if map_eligible {
            let now = (self.clock)();
            self.throttle.maybe_recompute(&points, status, now).await.into_route()
        } else {
            None
        };

        let viewport = self.fitter.fit(&points);

        let courier_card_eligible = status.courier_card_eligible();
        let courier_card = snapshot
            .courier
            .as_ref()
            .filter(|_| courier_card_eligible)
            .map(|courier| CourierCard {
                name: courier.name.clone(),
                phone: courier.phone.clone(),
                photo: courier_photo,
                position: points.courier_point(),
                position_updated_at: snapshot.courier_updated_at,
                eta: route.as_ref().and_then(RouteResult::eta),
                distance_meters: route.as_ref().map(|r| r.distance_meters),
            });

        debug!(
            order_id = %self.order_id,
            generation = self.generation,
            %status,
            map_eligible,
            has_route = route.is_some(),
            "View computed"
        );

        TrackingView::Tracking(Box::new(OrderTracking {
            generation: self.generation,
            order: snapshot,
            step,
            progress,
            points,
            route,
            map_eligible,
            courier_card_eligible,
            courier_card,
            viewport,
        }))
    }

    fn check_transition(&mut self, status: FulfillmentStatus) {
        if let Some(previous) = self.last_status {
            if previous != status && !previous.can_transition_to(status) {
                warn!(
                    order_id = %self.order_id,
                    from = %previous,
                    to = %status,
                    "Unexpected status transition"
                );
            }
        }
        self.last_status = Some(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use crate::model::{RawAddress, RawCoordinate, RawCourier, RawVendor};
    use crate::route::{RouteLeg, RoutingError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct NoProfiles;

    #[async_trait]
    impl ProfileLookup for NoProfiles {
        async fn vendor(&self, _id: &str) -> Result<Option<RawVendor>, LookupError> {
            Ok(None)
        }
        async fn courier(&self, _id: &str) -> Result<Option<RawCourier>, LookupError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct CountingRouter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RoutingProvider for CountingRouter {
        async fn route(
            &self,
            origin: crate::model::Coordinate,
            destination: crate::model::Coordinate,
        ) -> Result<RouteLeg, RoutingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RouteLeg {
                path: vec![origin, destination],
                duration: Duration::from_secs(420),
                distance_meters: 1200.0,
            })
        }
    }

    fn pipeline(router: Arc<CountingRouter>) -> Pipeline<NoProfiles, Arc<CountingRouter>> {
        let clock: Clock = Arc::new(|| DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        Pipeline::new(OrderId::from("o1"), NoProfiles, router, &TrackingConfig::default(), clock)
    }

    fn order(status: &str) -> RawOrder {
        RawOrder {
            status: Some(status.into()),
            vendor_id: Some("v1".into()),
            courier_id: Some("c1".into()),
            courier_name: Some("Luis".into()),
            courier_location: Some(RawCoordinate::new(19.78, -70.68)),
            delivery_address: Some(RawAddress {
                coordinates: Some(RawCoordinate::new(19.79, -70.69)),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let mut p = pipeline(Arc::default());
        let view = p.process(None).await;
        assert_eq!(
            view,
            TrackingView::NotFound {
                order_id: OrderId::from("o1")
            }
        );
        assert!(view.is_final());
    }

    #[tokio::test]
    async fn test_generations_count_every_notification() {
        let mut p = pipeline(Arc::default());
        p.process(None).await;
        let view = p.process(Some(order("preparing"))).await;
        assert_eq!(view.tracking().unwrap().generation, 2);
    }

    #[tokio::test]
    async fn test_cancelled_replaces_steps_with_banner_and_hides_map() {
        let router = Arc::new(CountingRouter::default());
        let mut p = pipeline(router.clone());
        let view = p.process(Some(order("cancelled"))).await;
        let t = view.tracking().unwrap();

        assert_eq!(
            t.progress,
            Progress::Cancelled {
                banner: CANCELLED_BANNER
            }
        );
        assert!(!t.map_eligible);
        assert!(t.route.is_none());
        assert!(t.courier_card.is_none());
        assert_eq!(router.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_out_for_delivery_shows_card_with_eta() {
        let mut p = pipeline(Arc::default());
        let view = p.process(Some(order("out_for_delivery"))).await;
        let t = view.tracking().unwrap();

        let card = t.courier_card.as_ref().unwrap();
        assert_eq!(card.name.as_deref(), Some("Luis"));
        assert_eq!(card.distance_meters, Some(1200.0));
        assert_eq!(card.eta, t.eta());
        assert!(t.eta().is_some());
        assert!(t.viewport.fitted);
    }

    #[tokio::test]
    async fn test_delivered_is_final_and_unrouted() {
        let router = Arc::new(CountingRouter::default());
        let mut p = pipeline(router.clone());
        let view = p.process(Some(order("delivered"))).await;

        assert!(view.is_final());
        let t = view.tracking().unwrap();
        assert!(!t.map_eligible && !t.courier_card_eligible);
        assert!(!t.step.active);
        assert_eq!(router.calls.load(Ordering::SeqCst), 0);
    }
}
