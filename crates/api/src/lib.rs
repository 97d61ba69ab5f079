//! HTTP API server for the order fulfillment and payment core.
//!
//! Exposes cart, order and payment endpoints plus the gateway webhook
//! ingest, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use checkout::{CartService, OrderOrchestrator, PaymentCoordinator, PaymentGateway};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{
    InMemoryCartStore, InMemoryCatalog, InMemoryCustomerDirectory, InMemoryJournal,
    InMemoryOrderStore, InMemoryPaymentStore,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<G: PaymentGateway + 'static>(
    state: Arc<AppState<G>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/cart", get(routes::cart::get::<G>))
        .route("/cart", delete(routes::cart::clear::<G>))
        .route("/cart/items", post(routes::cart::add_item::<G>))
        .route(
            "/cart/items/{product_id}",
            delete(routes::cart::remove_item::<G>),
        )
        .route("/orders", post(routes::orders::create::<G>))
        .route("/orders", get(routes::orders::list::<G>))
        .route("/orders/reconcile", post(routes::orders::reconcile::<G>))
        .route("/orders/{id}", get(routes::orders::get::<G>))
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<G>))
        .route(
            "/orders/{id}/payment-intent",
            post(routes::payments::create_intent::<G>),
        )
        .route("/orders/{id}/refund", post(routes::payments::refund::<G>))
        .route("/webhooks/payment", post(routes::payments::webhook::<G>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state wired over in-memory stores.
///
/// The catalog and customer directory are also returned so the caller can
/// seed products and profile addresses.
pub fn create_default_state<G: PaymentGateway + 'static>(
    gateway: G,
) -> (Arc<AppState<G>>, InMemoryCatalog, InMemoryCustomerDirectory) {
    let orders = InMemoryOrderStore::new();
    let carts = InMemoryCartStore::new();
    let catalog = InMemoryCatalog::new();
    let customers = InMemoryCustomerDirectory::new();
    let journal = InMemoryJournal::new();
    let payments = InMemoryPaymentStore::new();

    let state = Arc::new(AppState {
        cart_service: CartService::new(carts.clone(), catalog.clone()),
        orchestrator: OrderOrchestrator::new(
            orders.clone(),
            carts,
            catalog.clone(),
            customers.clone(),
            journal,
        ),
        coordinator: PaymentCoordinator::new(orders, payments, catalog.clone(), gateway),
    });

    (state, catalog, customers)
}
