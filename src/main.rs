//! Plugin marketplace billing core
//!
//! Architecture:
//! - SeaORM for database access (SQLite)
//! - Axum for HTTP API with rate limiting
//! - Pluggable payment gateways behind one trait
//! - Webhook-driven entitlement with idempotent fulfilment

mod entities;
mod error;
mod handlers;
mod migration;
mod payments;
mod prelude;
mod services;
mod state;
#[cfg(test)]
mod testing;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post, put};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::prelude::*;
use crate::state::{AppState, Config};

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();

  // Initialize tracing
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "storefront=debug,tower_http=debug,axum=trace,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  // Load configuration from environment
  let db_url = env::var("DATABASE_URL")
    .unwrap_or_else(|_| "sqlite:storefront.db?mode=rwc".into());
  let admin_token = env::var("ADMIN_TOKEN").expect("ADMIN_TOKEN not set");

  info!("Starting billing core v{}", env!("CARGO_PKG_VERSION"));

  let app_state =
    Arc::new(AppState::new(&db_url, Config::from_env(admin_token)).await);

  // Configure rate limiting (100 requests per minute per IP)
  let governor_conf = Arc::new(
    GovernorConfigBuilder::default()
      .per_second(2)
      .burst_size(100)
      .finish()
      .expect("Failed to build rate limiter config"),
  );

  let governor_limiter = governor_conf.limiter().clone();

  // Spawn rate limiter cleanup task
  tokio::spawn(async move {
    loop {
      tokio::time::sleep(Duration::from_secs(60)).await;
      governor_limiter.retain_recent();
    }
  });

  // Build router with middleware
  let app = Router::new()
    // Checkout and coupons
    .route("/api/checkout/subscribe", post(handlers::subscribe))
    .route("/api/coupons/validate", post(handlers::validate_coupon))
    // Webhooks: the static Stripe route wins over the capture
    .route("/api/checkout/webhook/stripe", post(handlers::stripe_webhook))
    .route(
      "/api/checkout/webhook/{provider_id}",
      post(handlers::provider_webhook),
    )
    // Licenses
    .route("/api/licenses/validate", post(handlers::validate_license))
    .route("/api/licenses/activate", post(handlers::activate_license))
    .route("/api/licenses", get(handlers::my_licenses))
    // Subscriptions
    .route("/api/subscriptions", get(handlers::my_subscriptions))
    .route(
      "/api/subscriptions/{id}/cancel",
      post(handlers::cancel_subscription),
    )
    // Admin
    .route(
      "/api/admin/coupons",
      get(handlers::list_coupons).post(handlers::create_coupon),
    )
    .route(
      "/api/admin/coupons/{id}",
      put(handlers::update_coupon).delete(handlers::delete_coupon),
    )
    .route(
      "/api/admin/payment-providers",
      get(handlers::list_providers).post(handlers::create_provider),
    )
    .route(
      "/api/admin/payment-providers/{id}",
      put(handlers::update_provider).delete(handlers::delete_provider),
    )
    .route(
      "/api/admin/payment-providers/{id}/default",
      post(handlers::set_default_provider),
    )
    .route("/health", get(handlers::health))
    // Middleware
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(
          CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        ),
    )
    .with_state(app_state);

  // Start HTTP server
  let port: u16 =
    env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3000);
  let addr = SocketAddr::from(([0, 0, 0, 0], port));

  info!("HTTP server listening on {}", addr);

  let listener =
    tokio::net::TcpListener::bind(addr).await.expect("Failed to bind");
  axum::serve(
    listener,
    app.into_make_service_with_connect_info::<SocketAddr>(),
  )
  .await
  .expect("Server error");
}
