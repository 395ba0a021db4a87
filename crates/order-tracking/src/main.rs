//! # Order Tracking Demo
//!
//! Seeds a vendor and an order, starts a tracking session that logs every view, then
//! walks the order from `received` to `delivered` with a moving courier.
//!
//! ```bash
//! RUST_LOG=info cargo run -p order-tracking
//! TRACKING_ROUTER_URL=http://localhost:5000 RUST_LOG=debug cargo run -p order-tracking
//! ```

use chrono::Utc;
use order_tracking::lifecycle::setup_tracing;
use order_tracking::model::{OrderPatch, RawAddress, RawCoordinate, RawLineItem, RawOrder, RawVendor};
use order_tracking::session::Progress;
use order_tracking::{load_tracking_config, OrderClient, OrderId, TrackingError, TrackingSystem, TrackingView};
use std::time::Duration;
use tracing::{info, Instrument};

const STEP_DELAY: Duration = Duration::from_millis(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = load_tracking_config()?;
    info!(?config, "Starting order tracking demo");

    let system = TrackingSystem::new(config);
    let order_id = OrderId::from("order-1001");

    // Vendor record from before coordinates moved onto the order.
    system
        .profile_client
        .put_vendor(
            "vendor-7",
            RawVendor {
                name: Some("Colmado La Esquina".into()),
                location: Some(RawCoordinate::new(19.4517, -70.6970)),
                ..Default::default()
            },
        )
        .await?;

    system
        .order_client
        .put_order(
            order_id.clone(),
            RawOrder {
                tracking_code: Some("LE-1001".into()),
                status: Some("received".into()),
                vendor_id: Some("vendor-7".into()),
                vendor_name: Some("Colmado La Esquina".into()),
                customer_id: Some("customer-3".into()),
                customer_name: Some("Ana".into()),
                delivery_address: Some(RawAddress {
                    street: Some("Calle del Sol 12".into()),
                    city: Some("Santiago".into()),
                    instructions: Some("Blue gate".into()),
                    coordinates: Some(RawCoordinate::new(19.4790, -70.6931)),
                }),
                items: vec![
                    RawLineItem {
                        name: Some("Mangú".into()),
                        quantity: Some(2),
                        price: Some(250.0),
                    },
                    RawLineItem {
                        name: Some("Morir soñando".into()),
                        quantity: None,
                        price: Some(120.0),
                    },
                ],
                subtotal: Some(620.0),
                delivery_fee: Some(80.0),
                total: Some(700.0),
                tracking_pin: Some("4821".into()),
                ..Default::default()
            },
        )
        .await?;

    let (tx, mut views) = tokio::sync::mpsc::unbounded_channel::<TrackingView>();
    let router = system.osrm_router()?;
    let session = system.track(order_id.clone(), router, tx).await?;

    let printer = tokio::spawn(
        async move {
            while let Some(view) = views.recv().await {
                log_view(&view);
            }
        }
        .instrument(tracing::info_span!("observer")),
    );

    let courier_path = [
        RawCoordinate::new(19.4530, -70.6962),
        RawCoordinate::new(19.4602, -70.6948),
        RawCoordinate::new(19.4695, -70.6940),
        RawCoordinate::new(19.4771, -70.6933),
    ];

    let span = tracing::info_span!("fulfillment", order_id = %order_id);
    async {
        let orders = &system.order_client;
        for status in ["confirmed", "preparing", "ready_for_pickup"] {
            orders.update_order(order_id.clone(), OrderPatch::SetStatus(status.into())).await?;
            tokio::time::sleep(STEP_DELAY).await;
        }

        orders
            .update_order(
                order_id.clone(),
                OrderPatch::AssignCourier {
                    id: "courier-42".into(),
                    name: "Luis".into(),
                    phone: Some("+1 809 555 0142".into()),
                    photo: None,
                },
            )
            .await?;
        orders
            .update_order(order_id.clone(), OrderPatch::SetStatus("courier_assigned".into()))
            .await?;
        move_courier(orders, &order_id, courier_path[0]).await?;
        orders
            .update_order(order_id.clone(), OrderPatch::SetStatus("out_for_delivery".into()))
            .await?;

        for point in &courier_path[1..] {
            tokio::time::sleep(STEP_DELAY).await;
            move_courier(orders, &order_id, *point).await?;
        }

        orders
            .update_order(order_id.clone(), OrderPatch::SetStatus("delivered".into()))
            .await?;
        Ok::<_, TrackingError>(())
    }
    .instrument(span)
    .await?;

    session.finished().await?;
    let _ = printer.await;

    system.shutdown().await?;
    info!("Demo completed");
    Ok(())
}

async fn move_courier(
    orders: &OrderClient,
    order_id: &OrderId,
    location: RawCoordinate,
) -> Result<(), TrackingError> {
    orders
        .update_order(
            order_id.clone(),
            OrderPatch::MoveCourier {
                location,
                at: Utc::now(),
            },
        )
        .await?;
    Ok(())
}

fn log_view(view: &TrackingView) {
    let Some(t) = view.tracking() else {
        info!(?view, "Order not found");
        return;
    };
    let progress = match &t.progress {
        Progress::Steps { .. } => t.step.label,
        Progress::Cancelled { banner } => *banner,
    };
    info!(
        generation = t.generation,
        status = %t.order.status,
        progress,
        map = t.map_eligible,
        courier = ?t.points.courier_point(),
        eta = ?t.eta(),
        fitted = t.viewport.fitted,
        "View"
    );
}
