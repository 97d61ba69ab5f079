//! API server entry point.

use checkout::InMemoryPaymentGateway;
use domain::Money;
use store::Product;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Seeds a few demo products so the API is usable out of the box.
async fn seed_catalog(catalog: &store::InMemoryCatalog) {
    catalog
        .put(Product::new("SKU-TEE", "T-Shirt", Money::from_cents(1999), 50))
        .await;
    catalog
        .put(Product::new("SKU-MUG", "Mug", Money::from_cents(899), 30))
        .await;
    catalog
        .put(Product::new("SKU-CAP", "Cap", Money::from_cents(1499), 20))
        .await;
}

#[tokio::main]
async fn main() {
    let config = api::config::Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire the application state and seed demo data
    let gateway = InMemoryPaymentGateway::new(config.gateway_webhook_secret.clone());
    let (state, catalog, _customers) = api::create_default_state(gateway);
    seed_catalog(&catalog).await;

    // 4. Build the application
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
