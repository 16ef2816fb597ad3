//! Reviews API - HTTP surface for Smart Reviews
//!
//! Shops submit reviews and read aggregated product data through these
//! routes. All writes go through the `SubmissionHandler`, so derived
//! content stays in step with what the handlers persist.

use std::sync::Arc;

use axum::Router;
use reviews_core::{ReviewStore, SubmissionHandler};
use tokio::net::TcpListener;
use tracing::info;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Read side of the review store
    pub store: Arc<dyn ReviewStore>,
    /// Write path for human reviews
    pub submissions: Arc<SubmissionHandler>,
}

impl AppState {
    /// Create state around a submission handler, sharing its store
    pub fn new(submissions: SubmissionHandler) -> Self {
        Self {
            store: submissions.store().clone(),
            submissions: Arc::new(submissions),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let reviews = Router::new()
        .route(
            "/product/:external_id/review",
            get(api::get_product_reviews).post(api::create_review),
        )
        .route("/shop/:shop_id/product", get(api::get_shop_products));

    Router::new()
        .merge(reviews)
        .merge(api::health_routes())
        .with_state(state)
}

/// Serve the API on an already bound listener until the process stops
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Listening for review requests");
    }
    axum::serve(listener, build_router(state)).await
}
