//! Bus event ingestion loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::bridge::Bridge;
use crate::property::BusEvent;
use crate::traits::DeviceBus;

/// Apply bus events to the bridge in delivery order until the sender closes.
pub async fn run_ingestion<B: DeviceBus>(bridge: Arc<Bridge<B>>, mut events: mpsc::Receiver<BusEvent>) {
    while let Some(event) = events.recv().await {
        bridge.handle_event(event);
    }
    info!("bus event stream closed");
}
