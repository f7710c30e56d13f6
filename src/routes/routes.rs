//! Defines routes for the bucket gateway pages.
//!
//! ## Structure
//! - **Thaw pages** (`/thaw/...`)
//!   - `GET  /thaw/show`          — thaw page shell
//!   - `GET  /thaw/show_flush`    — flush page shell
//!   - `GET  /thaw/list_indexes`  — sorted archived indexes
//!   - `POST /thaw/list_buckets`  — archived buckets for an index and date range
//!   - `POST /thaw/list_thawed`   — buckets already thawed
//!   - `POST /thaw/thaw`          — thaw buckets
//!   - `POST /thaw/flush`         — flush thawed buckets
//!
//! - **Archiving overview**
//!   - `GET  /archiving/show`     — indexes and every archived bucket
//!
//! POST routes take `application/x-www-form-urlencoded` bodies.

use crate::{
    handlers::{
        bucket_handlers::{
            flush, list_buckets, list_indexes, list_thawed, show_archiving, show_flush, show_thaw,
            thaw,
        },
        health_handlers::{healthz, readyz},
    },
    services::gateway_service::GatewayService,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for all gateway pages.
///
/// The router carries shared state (`GatewayService`) to all handlers.
pub fn routes() -> Router<GatewayService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Thaw and flush pages
        .route("/thaw/show", get(show_thaw))
        .route("/thaw/show_flush", get(show_flush))
        .route("/thaw/list_indexes", get(list_indexes))
        .route("/thaw/list_buckets", post(list_buckets))
        .route("/thaw/list_thawed", post(list_thawed))
        .route("/thaw/thaw", post(thaw))
        .route("/thaw/flush", post(flush))
        // Legacy archiving overview
        .route("/archiving/show", get(show_archiving))
}
