//! HTTP surface. Handlers are thin: they read identity from headers, parse
//! enums and bodies, and call the typed clients.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, Method};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::app_system::MarketplaceSystem;
use crate::clients::{BoxClient, BuyForMeClient, CustomerClient};

mod admin;
mod box_contents;
mod customers;
mod error;
mod user;

pub use error::AppError;

pub const ACTOR_HEADER: &str = "x-actor-id";
pub const CUSTOMER_HEADER: &str = "x-customer-id";

#[derive(Clone)]
pub struct AppState {
    pub customers: CustomerClient,
    pub requests: BuyForMeClient,
    pub boxes: BoxClient,
}

impl AppState {
    pub fn from_system(system: &MarketplaceSystem) -> Self {
        Self {
            customers: system.customer_client.clone(),
            requests: system.buyforme_client.clone(),
            boxes: system.box_client.clone(),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &'static str) -> Result<String, AppError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(AppError::Unauthorized(name))
}

/// Identity of the admin or staff member making the call.
pub fn actor_id(headers: &HeaderMap) -> Result<String, AppError> {
    header_value(headers, ACTOR_HEADER)
}

pub fn customer_id(headers: &HeaderMap) -> Result<String, AppError> {
    header_value(headers, CUSTOMER_HEADER)
}

/// Parses an optional enum value from a query or body, rejecting unknown names.
pub fn parse_enum<T: FromStr<Err = String>>(raw: Option<&str>) -> Result<Option<T>, AppError> {
    raw.filter(|value| !value.is_empty())
        .map(|value| value.parse::<T>().map_err(AppError::BadRequest))
        .transpose()
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(ACTOR_HEADER),
            HeaderName::from_static(CUSTOMER_HEADER),
        ])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .nest("/api/admin/buyforme-requests", admin::routes())
        .nest("/api/user/buyforme-requests", user::routes())
        .nest("/api/customers", customers::routes())
        .nest("/api/box-contents", box_contents::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(port: u16, state: AppState) -> Result<()> {
    let app = router(state);

    let address = format!("0.0.0.0:{port}");
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated with an error")?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
