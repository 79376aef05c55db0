//! Axum-based Alpaca HTTP server.
//!
//! Provides:
//! - GET/PUT `/api/v1/{device_type}/{device_number}/{command}` - Device commands
//! - GET `/management/apiversions` - Supported API versions
//! - GET `/management/v1/description` - Server description
//! - GET `/management/v1/configureddevices` - Bridged devices
//!
//! Unknown devices answer HTTP 404 and unsupported API versions HTTP 400;
//! everything else answers 200 with an Alpaca envelope.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::cache::DeviceHandle;
use crate::config::{ServerConfig, DEFAULT_HTTP_PORT};
use crate::device::DeviceType;
use crate::error::BridgeError;
use crate::params::Params;
use crate::traits::DeviceBus;

use super::api::{AlpacaResponse, ConfiguredDevice, ServerDescription};
use super::shared::AlpacaState;

/// The only supported Alpaca API version.
pub const API_VERSION: &str = "v1";

type DevicePath = (String, String, String, String);

// ============================================================================
// Route Handlers
// ============================================================================

/// Resolve the device addressed by a request path.
fn resolve<B: DeviceBus>(
    state: &AlpacaState<B>,
    version: &str,
    device_type: &str,
    number: &str,
) -> Result<Arc<DeviceHandle>, Response> {
    if version != API_VERSION {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Unsupported API version: {}", version),
        )
            .into_response());
    }
    DeviceType::from_path(device_type)
        .zip(number.parse::<u32>().ok())
        .and_then(|(device_type, number)| state.bridge().device(device_type, number))
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("No such device: {}/{}", device_type, number),
            )
                .into_response()
        })
}

/// GET /api/v1/{device_type}/{device_number}/{command}
async fn device_get<B: DeviceBus + 'static>(
    State(state): State<Arc<AlpacaState<B>>>,
    Path((version, device_type, number, command)): Path<DevicePath>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = Params::parse(query.as_deref().unwrap_or(""));
    let device = match resolve(&state, &version, &device_type, &number) {
        Ok(device) => device,
        Err(response) => return response,
    };
    let tx = state.transaction(&params);
    let result = state.bridge().get_command(&device, &command, &params);
    Json(AlpacaResponse::from_value(result, tx)).into_response()
}

/// PUT /api/v1/{device_type}/{device_number}/{command}
///
/// Parameters arrive form-encoded in the body.
async fn device_put<B: DeviceBus + 'static>(
    State(state): State<Arc<AlpacaState<B>>>,
    Path((version, device_type, number, command)): Path<DevicePath>,
    body: Bytes,
) -> Response {
    let params = Params::from_body(&body);
    let device = match resolve(&state, &version, &device_type, &number) {
        Ok(device) => device,
        Err(response) => return response,
    };
    let tx = state.transaction(&params);
    let result = state.bridge().set_command(&device, &command, &params).await;
    Json(AlpacaResponse::from_unit(result, tx)).into_response()
}

/// GET /management/apiversions
async fn api_versions<B: DeviceBus + 'static>(
    State(state): State<Arc<AlpacaState<B>>>,
    RawQuery(query): RawQuery,
) -> Json<AlpacaResponse> {
    let tx = state.transaction(&Params::parse(query.as_deref().unwrap_or("")));
    Json(AlpacaResponse::from_value(Ok(json!([1])), tx))
}

/// GET /management/v1/description
async fn description<B: DeviceBus + 'static>(
    State(state): State<Arc<AlpacaState<B>>>,
    RawQuery(query): RawQuery,
) -> Json<AlpacaResponse> {
    let tx = state.transaction(&Params::parse(query.as_deref().unwrap_or("")));
    let config = state.bridge().config();
    let description = ServerDescription {
        server_name: config.server_name.clone(),
        manufacturer: config.manufacturer.clone(),
        manufacturer_version: env!("CARGO_PKG_VERSION").to_string(),
        location: config.location.clone(),
    };
    Json(AlpacaResponse::from_value(Ok(json!(description)), tx))
}

/// GET /management/v1/configureddevices
async fn configured_devices<B: DeviceBus + 'static>(
    State(state): State<Arc<AlpacaState<B>>>,
    RawQuery(query): RawQuery,
) -> Json<AlpacaResponse> {
    let tx = state.transaction(&Params::parse(query.as_deref().unwrap_or("")));
    let devices: Vec<ConfiguredDevice> = state
        .bridge()
        .cache()
        .list()
        .iter()
        .map(|device| ConfiguredDevice::from(device.as_ref()))
        .collect();
    Json(AlpacaResponse::from_value(Ok(json!(devices)), tx))
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_HTTP_PORT)),
            cors_permissive: true,
        }
    }
}

impl WebServerConfig {
    /// Create a new config with the given address
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set whether CORS should be permissive
    pub fn cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Create from the server section of [`Config`](crate::config::Config)
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router<B: DeviceBus + 'static>(
    state: Arc<AlpacaState<B>>,
    config: &WebServerConfig,
) -> Router {
    let mut router = Router::new()
        // Device API
        .route(
            "/api/:version/:device_type/:device_number/:command",
            get(device_get::<B>).put(device_put::<B>),
        )
        // Management API
        .route("/management/apiversions", get(api_versions::<B>))
        .route("/management/v1/description", get(description::<B>))
        .route("/management/v1/configureddevices", get(configured_devices::<B>))
        // Fallback
        .fallback(not_found)
        .with_state(state);

    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Start the Alpaca server with shared state
///
/// This function runs until the server fails.
pub async fn run_server<B: DeviceBus + 'static>(
    state: Arc<AlpacaState<B>>,
    config: WebServerConfig,
) -> Result<(), BridgeError> {
    let router = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "Alpaca server listening");

    axum::serve(listener, router).await?;
    Ok(())
}
