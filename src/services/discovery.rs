//! Alpaca UDP discovery responder.
//!
//! Clients broadcast `alpacadiscovery1`; every bridge on the network answers
//! with the port of its HTTP server.

use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::config::DiscoveryConfig;
use crate::error::BridgeError;

/// Discovery request prefix.
pub const DISCOVERY_REQUEST: &[u8] = b"alpacadiscovery1";

/// Reply to a discovery datagram, or `None` if it is not a discovery request.
pub fn discovery_response(datagram: &[u8], http_port: u16) -> Option<String> {
    datagram
        .starts_with(DISCOVERY_REQUEST)
        .then(|| serde_json::json!({ "AlpacaPort": http_port }).to_string())
}

/// Bind the configured port and answer discovery requests.
pub async fn run_discovery(config: DiscoveryConfig, http_port: u16) -> Result<(), BridgeError> {
    let socket = UdpSocket::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "discovery responder listening");
    serve_discovery(socket, http_port).await
}

/// Answer discovery requests on an already bound socket.
pub async fn serve_discovery(socket: UdpSocket, http_port: u16) -> Result<(), BridgeError> {
    let mut buf = [0u8; 256];
    loop {
        let (len, peer) = socket.recv_from(&mut buf).await?;
        let Some(reply) = discovery_response(&buf[..len], http_port) else {
            continue;
        };
        debug!(%peer, "discovery request");
        if let Err(err) = socket.send_to(reply.as_bytes(), peer).await {
            warn!(%peer, error = %err, "discovery reply failed");
        }
    }
}
