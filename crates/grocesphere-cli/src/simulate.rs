//! `simulate`: place an order and drive a live session from the terminal.
//!
//! Events are printed to stdout as JSON lines; logs go to stderr.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use chrono::Utc;
use grocesphere_core::{store_price_multiplier, AppConfig, Cart, Coordinate, Product, Store};
use grocesphere_engine::{
    order_feed, shared, FeedError, FeedPublisher, LocalityEngine, MovementFilter, PendingSwitch,
    SeededRandom, Session, SessionEvent, SharedEngine, StoreDirectory, SwitchReason,
    SwitchResolution, SystemClock,
};
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;

use crate::directory::load_directory;
use crate::SimulateArgs;

/// Placeholder in feed rows replaced with the id of the placed order.
const ORDER_ID_PLACEHOLDER: &str = "{order_id}";

fn emit(value: &Value) {
    println!("{value}");
}

/// Point `step` of `steps` on the straight line from `from` to `to`.
fn waypoint(from: Coordinate, to: Coordinate, step: u32, steps: u32) -> Coordinate {
    let t = f64::from(step.min(steps)) / f64::from(steps.max(1));
    Coordinate::new(
        from.lat + (to.lat - from.lat) * t,
        from.lng + (to.lng - from.lng) * t,
    )
}

/// Fill `cart` with the requested lines from `store`.
///
/// With no explicit items the first catalog product the store stocks is
/// added once. Demo and crawled stores get their store-specific pricing.
fn fill_cart(
    cart: &mut Cart,
    store: &Store,
    catalog: &[Product],
    items: &[(String, u32)],
) -> anyhow::Result<()> {
    let default_item;
    let items = if items.is_empty() {
        let product = catalog
            .iter()
            .find(|p| store.stocks(&p.id))
            .ok_or_else(|| anyhow!("store '{}' stocks nothing in the catalog", store.id))?;
        default_item = [(product.id.clone(), 1)];
        &default_item[..]
    } else {
        items
    };

    for (id, quantity) in items {
        let product = catalog
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| anyhow!("unknown product '{id}'"))?;
        if !store.stocks(id) {
            anyhow::bail!("store '{}' does not stock product '{id}'", store.id);
        }
        let product = if store.is_external() {
            product.repriced(store_price_multiplier(&store.id))
        } else {
            product.clone()
        };
        cart.add(store, &product, *quantity, None, None);
    }
    Ok(())
}

fn reason_name(reason: SwitchReason) -> &'static str {
    match reason {
        SwitchReason::Arrival => "arrival",
        SwitchReason::BetterOption => "better_option",
    }
}

fn suggestion_json(pending: &PendingSwitch) -> Value {
    json!({
        "event": "switch_suggested",
        "store_id": pending.candidate.id,
        "store_name": pending.candidate.name,
        "distance_km": pending.distance_km,
        "reason": reason_name(pending.reason),
    })
}

fn resolution_json(resolution: &SwitchResolution) -> Value {
    match resolution {
        SwitchResolution::Accepted {
            store,
            cart_cleared,
        } => json!({
            "event": "switch_accepted",
            "store_id": store.id,
            "cart_cleared": cart_cleared,
        }),
        SwitchResolution::Declined { store_id } => json!({
            "event": "switch_declined",
            "store_id": store_id,
        }),
    }
}

fn event_json(event: &SessionEvent) -> Value {
    match event {
        SessionEvent::OrdersUpdated(orders) => json!({
            "event": "orders_updated",
            "orders": orders
                .iter()
                .map(|o| json!({ "id": o.id, "status": o.status }))
                .collect::<Vec<_>>(),
        }),
        SessionEvent::DriverPositions(positions) => json!({
            "event": "driver_positions",
            "positions": positions,
        }),
    }
}

/// Read backend rows, one JSON object per non-blank line.
fn read_feed(path: &Path, order_id: &str) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read feed file {}: {e}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.replace(ORDER_ID_PLACEHOLDER, order_id))
        .collect())
}

async fn push_rows(publisher: FeedPublisher, rows: Vec<String>, every: Duration) {
    for row in rows {
        tokio::time::sleep(every).await;
        match publisher.publish_row(&row) {
            Ok(()) => {}
            Err(FeedError::Closed) => break,
            Err(e) => tracing::warn!(error = %e, "cli: dropping feed row"),
        }
    }
}

async fn on_location(
    engine: &SharedEngine,
    directory: &dyn StoreDirectory,
    sample: Coordinate,
    accept_switches: bool,
) {
    let stores = directory.stores_near(sample);
    let mut engine = engine.lock().await;
    engine.refresh_stores(stores);
    emit(&json!({
        "event": "location",
        "lat": sample.lat,
        "lng": sample.lng,
        "active_store": engine.active_store().map(|s| s.id.clone()),
    }));

    if let Some(pending) = engine.evaluate_proximity(Some(sample)) {
        emit(&suggestion_json(&pending));
        if let Some(resolution) = engine.resolve_switch(accept_switches) {
            emit(&resolution_json(&resolution));
        }
    }
}

/// # Errors
///
/// Returns an error for an invalid start location, an unreadable stores or
/// feed file, no store serving the start location, or an unknown item.
pub(crate) async fn run_simulate(
    config: &AppConfig,
    demo: bool,
    args: SimulateArgs,
) -> anyhow::Result<()> {
    let start = Coordinate::new(args.lat, args.lng);
    if !start.in_range() || !start.is_known() {
        anyhow::bail!("start location {start} is not a usable coordinate");
    }
    let destination = args
        .to_lat
        .zip(args.to_lng)
        .map(|(lat, lng)| Coordinate::new(lat, lng));

    let loaded = load_directory(config, demo)?;
    let engine = shared(LocalityEngine::new(
        config.advisory.clone(),
        config.lifecycle.clone(),
        Arc::new(SystemClock),
        Box::new(SeededRandom::from_optional_seed(config.rng_seed)),
    )
    .with_checkout(config.checkout.clone()));
    let mut session = Session::new(Arc::clone(&engine), &config.lifecycle);
    let mut events = session.subscribe();

    let order = {
        let mut engine = engine.lock().await;
        engine.refresh_stores(loaded.directory.stores_near(start));
        engine.evaluate_proximity(Some(start));
        let store = engine
            .active_store()
            .cloned()
            .ok_or_else(|| anyhow!("no stores serve {start}"))?;
        fill_cart(engine.cart_mut(), &store, &loaded.catalog, &args.items)?;
        emit(&json!({
            "event": "checkout_quote",
            "quote": engine.checkout_quote(args.mode.into()),
        }));
        let order = engine
            .place_order(args.mode.into(), None, Utc::now())
            .ok_or_else(|| anyhow!("nothing to order"))?;
        emit(&json!({ "event": "order_placed", "order": order }));
        if !args.pay_later {
            if let Some(paid) = engine.settle_payment(&order.id) {
                emit(&json!({
                    "event": "payment_settled",
                    "order_id": paid.id,
                    "total": paid.total,
                    "splits": paid.splits,
                }));
            }
        }
        order
    };

    let feed_task = match &args.feed {
        Some(path) => {
            let rows = read_feed(path, &order.id)?;
            let (publisher, subscription) = order_feed();
            session.attach_feed(subscription);
            let every = Duration::from_secs(args.feed_interval_secs);
            Some(tokio::spawn(push_rows(publisher, rows, every)))
        }
        None => None,
    };
    session.sync().await;

    let mut filter = MovementFilter::default();
    filter.accept(start);
    let mut step = 0;
    let mut walk = tokio::time::interval(Duration::from_secs(args.walk_interval_secs.max(1)));
    walk.tick().await;
    let deadline = tokio::time::sleep(Duration::from_secs(args.max_secs));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => emit(&event_json(&event)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "cli: event output fell behind");
                }
                Err(RecvError::Closed) => break,
            },
            _ = walk.tick() => {
                if let Some(to) = destination.filter(|_| step < args.walk_steps) {
                    step += 1;
                    let sample = waypoint(start, to, step, args.walk_steps);
                    if let Some(sample) = filter.accept(sample) {
                        on_location(&engine, loaded.directory.as_ref(), sample, args.accept_switches)
                            .await;
                    }
                }
                session.sync().await;
                if !session.is_ticking() {
                    tracing::info!("cli: every order has settled");
                    break;
                }
            }
            () = &mut deadline => {
                tracing::info!(max_secs = args.max_secs, "cli: time limit reached");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("cli: interrupted");
                break;
            }
        }
    }

    session.end();
    if let Some(task) = feed_task {
        task.abort();
    }
    while let Ok(event) = events.try_recv() {
        emit(&event_json(&event));
    }

    let engine = engine.lock().await;
    emit(&json!({
        "event": "session_ended",
        "orders": engine
            .orders()
            .iter()
            .map(|o| json!({ "id": o.id, "status": o.status }))
            .collect::<Vec<_>>(),
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use grocesphere_core::{BrandOption, StoreKind};
    use rust_decimal::Decimal;

    use super::*;

    fn store(id: &str, stocked: &[&str]) -> Store {
        Store {
            id: id.to_string(),
            name: id.to_string(),
            address: String::new(),
            lat: 12.97,
            lng: 77.59,
            kind: StoreKind::General,
            rating: 4.0,
            is_open: true,
            available_product_ids: stocked.iter().map(ToString::to_string).collect(),
            upi_id: None,
        }
    }

    fn catalog() -> Vec<Product> {
        ["41", "61"]
            .iter()
            .map(|id| Product {
                id: (*id).to_string(),
                name: format!("Product {id}"),
                price: Decimal::new(100, 0),
                emoji: String::new(),
                category: "Test".to_string(),
                description: None,
                brands: vec![BrandOption {
                    name: "House".to_string(),
                    price: Decimal::new(120, 0),
                }],
                variants: vec![],
            })
            .collect()
    }

    #[test]
    fn waypoint_interpolates_and_clamps() {
        let from = Coordinate::new(12.0, 77.0);
        let to = Coordinate::new(13.0, 78.0);
        assert_eq!(waypoint(from, to, 0, 10), from);
        let mid = waypoint(from, to, 5, 10);
        assert!((mid.lat - 12.5).abs() < 1e-12);
        assert!((mid.lng - 77.5).abs() < 1e-12);
        assert_eq!(waypoint(from, to, 12, 10), to);
    }

    #[test]
    fn fill_cart_defaults_to_first_stocked_product() {
        let mut cart = Cart::new();
        fill_cart(&mut cart, &store("corner", &["61"]), &catalog(), &[]).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product_id, "61");
        assert_eq!(cart.items()[0].unit_price, Decimal::new(100, 0));
    }

    #[test]
    fn fill_cart_reprices_external_stores() {
        let mut cart = Cart::new();
        let demo = store("demo-gen-1", &["41"]);
        fill_cart(&mut cart, &demo, &catalog(), &[("41".to_string(), 2)]).unwrap();
        let expected = (Decimal::new(100, 0) * store_price_multiplier("demo-gen-1")).ceil();
        assert_eq!(cart.items()[0].unit_price, expected);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn fill_cart_rejects_unknown_or_unstocked_products() {
        let mut cart = Cart::new();
        let corner = store("corner", &["61"]);
        assert!(fill_cart(&mut cart, &corner, &catalog(), &[("999".to_string(), 1)]).is_err());
        assert!(fill_cart(&mut cart, &corner, &catalog(), &[("41".to_string(), 1)]).is_err());
        assert!(fill_cart(&mut cart, &store("empty", &[]), &catalog(), &[]).is_err());
    }

    #[test]
    fn read_feed_substitutes_order_id_and_skips_blank_lines() {
        let path = std::env::temp_dir().join(format!("grocesphere-feed-{}.jsonl", std::process::id()));
        std::fs::write(
            &path,
            "{\"id\":\"{order_id}\",\"status\":\"packing\"}\n\n{\"id\":\"{order_id}\",\"status\":\"on_way\"}\n",
        )
        .unwrap();
        let rows = read_feed(&path, "abc").unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(
            rows,
            vec![
                r#"{"id":"abc","status":"packing"}"#.to_string(),
                r#"{"id":"abc","status":"on_way"}"#.to_string(),
            ]
        );
    }

    #[test]
    fn event_json_names_statuses_like_the_ui() {
        let positions = std::collections::HashMap::from([(
            "o1".to_string(),
            Coordinate::new(12.97, 77.59),
        )]);
        let value = event_json(&SessionEvent::DriverPositions(positions));
        assert_eq!(value["event"], "driver_positions");
        assert_eq!(value["positions"]["o1"]["lat"], 12.97);
    }
}
