//! Route definitions for the Little Bites API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/scans", post(handlers::scan_product))
        .route("/grade", post(handlers::grade_product))
        .route("/age-groups", get(handlers::list_age_groups))
        .nest("/products", product_routes())
        .nest("/history", history_routes())
        .route(
            "/criteria",
            get(handlers::get_criteria)
                .put(handlers::update_criteria)
                .delete(handlers::reset_criteria),
        )
}

/// Product lookup routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(handlers::search_products))
        .route("/:barcode", get(handlers::get_product))
}

/// Scan history routes
fn history_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_history).delete(handlers::clear_history),
        )
        .route("/favorites", get(handlers::list_favorites))
        .route("/:barcode", get(handlers::get_scanned_product))
        .route("/:barcode/favorite", post(handlers::toggle_favorite))
}
