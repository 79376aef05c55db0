//! Network services and the bus ingestion loop.
//!
//! - `ingest`: drains bus events into the [`Bridge`](crate::bridge::Bridge)
//! - `web` feature: Axum-based Alpaca HTTP API and UDP discovery
//!
//! All services share one bridge through `Arc`:
//!
//! ```ignore
//! let bridge = Arc::new(Bridge::new(bus, config.bridge.clone()));
//! tokio::spawn(run_ingestion(Arc::clone(&bridge), events));
//!
//! let state = Arc::new(AlpacaState::new(bridge));
//! run_server(state, WebServerConfig::from_config(&config.server)).await?;
//! ```

pub mod ingest;

#[cfg(feature = "web")]
pub mod api;

#[cfg(feature = "web")]
pub mod discovery;

#[cfg(feature = "web")]
pub mod shared;

#[cfg(feature = "web")]
pub mod web;

// Re-exports
pub use ingest::*;

#[cfg(feature = "web")]
pub use api::*;

#[cfg(feature = "web")]
pub use discovery::*;

#[cfg(feature = "web")]
pub use shared::*;

#[cfg(feature = "web")]
pub use web::*;
