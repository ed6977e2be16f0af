//! HTTP API Layer
//!
//! REST API for the rental core using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each resource
//! - **Middleware**: Bearer authentication, tracing, audit logging
//! - **DTOs**: Validated request bodies and query strings
//! - **Error Handling**: Domain errors mapped to JSON error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(store, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::RecordStore;
use domain_billing::BillingService;
use domain_rental::RentalService;

use crate::config::ApiConfig;
use crate::handlers::{contracts, health, properties, rent, tenants, utilities};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: ApiConfig,
    pub rental: RentalService,
    pub billing: BillingService,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: ApiConfig) -> Self {
        Self {
            rental: RentalService::new(Arc::clone(&store), config.currency),
            billing: BillingService::new(Arc::clone(&store)),
            store,
            config,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `store` - Record store backing every service
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(store: Arc<dyn RecordStore>, config: ApiConfig) -> Router {
    let state = AppState::new(store, config);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let property_routes = Router::new()
        .route("/", post(properties::create_property).get(properties::list_properties))
        .route(
            "/:id",
            get(properties::get_property)
                .put(properties::update_property)
                .delete(properties::delete_property),
        )
        .route("/:id/units", post(properties::create_unit).get(properties::list_units))
        .route("/:id/pairings", get(properties::list_pairings));

    let unit_routes = Router::new().route(
        "/:id",
        get(properties::get_unit)
            .put(properties::update_unit)
            .delete(properties::delete_unit),
    );

    let pairing_routes = Router::new()
        .route("/", post(properties::create_pairing))
        .route("/:id", get(properties::get_pairing));

    let tenant_routes = Router::new()
        .route("/", post(tenants::create_tenant).get(tenants::list_tenants))
        .route(
            "/:id",
            get(tenants::get_tenant)
                .put(tenants::update_tenant)
                .delete(tenants::delete_tenant),
        )
        .route("/:id/contracts", get(tenants::list_contracts));

    let contract_routes = Router::new()
        .route("/", post(contracts::create_contract))
        .route("/:id", get(contracts::get_contract))
        .route("/:id/sign", post(contracts::sign_contract))
        .route("/:id/notarize", post(contracts::notarize_contract))
        .route("/:id/terminate", post(contracts::terminate_contract))
        .route("/:id/lease-document", get(contracts::lease_document))
        .route("/:id/outstanding-rent", get(contracts::outstanding_rent));

    let rent_routes = Router::new()
        .route("/", post(rent::record_rent_payment).get(rent::list_rent_payments))
        .route("/:id/paid", put(rent::set_rent_paid));

    let utility_routes = Router::new()
        .route("/", post(utilities::record_reading).get(utilities::list_readings))
        .route("/latest", get(utilities::latest_readings))
        .route("/summary", get(utilities::billing_summary))
        .route("/:id", get(utilities::get_reading).delete(utilities::delete_reading))
        .route("/:id/payment", put(utilities::record_payment))
        .route("/:id/billing", get(utilities::generate_billing));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/properties", property_routes)
        .nest("/units", unit_routes)
        .nest("/pairings", pairing_routes)
        .nest("/tenants", tenant_routes)
        .nest("/contracts", contract_routes)
        .nest("/rent-payments", rent_routes)
        .nest("/utilities", utility_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
