//! Bridge configuration.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use alpaca_bridge::config::{BridgeConfig, Config, ServerConfig, WaitConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.server.port, 11111);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_server(ServerConfig::default().with_port(8080))
//!     .with_bridge(
//!         BridgeConfig::default()
//!             .with_server_name("Observatory")
//!             .with_waits(WaitConfig::default().with_short_timeout(Duration::from_secs(10))),
//!     );
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Default Alpaca HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 11111;

/// Alpaca discovery port.
pub const DEFAULT_DISCOVERY_PORT: u16 = 32227;

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Discovery responder configuration
    pub discovery: DiscoveryConfig,
    /// Bridge behavior
    pub bridge: BridgeConfig,
}

impl Config {
    /// Set server configuration
    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    /// Set discovery configuration
    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    /// Set bridge configuration
    pub fn with_bridge(mut self, bridge: BridgeConfig) -> Self {
        self.bridge = bridge;
        self
    }

    /// Reject settings the bridge cannot run with.
    pub fn validate(&self) -> Result<(), BridgeError> {
        let waits = &self.bridge.waits;
        if waits.poll_interval.is_zero() {
            return Err(BridgeError::Config("poll interval must be positive".into()));
        }
        if waits.short_timeout < waits.poll_interval || waits.slew_timeout < waits.poll_interval {
            return Err(BridgeError::Config(
                "wait timeouts must not be shorter than the poll interval".into(),
            ));
        }
        if self.discovery.enabled && self.discovery.port == 0 {
            return Err(BridgeError::Config("discovery needs a fixed port".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Server Config
// ============================================================================

/// Alpaca HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP port
    pub port: u16,
    /// Enable permissive CORS headers
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_HTTP_PORT,
            cors_permissive: true,
        }
    }
}

impl ServerConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }
}

// ============================================================================
// Discovery Config
// ============================================================================

/// Alpaca UDP discovery configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// UDP port to listen on
    pub port: u16,
    /// Whether discovery is enabled
    pub enabled: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_DISCOVERY_PORT,
            enabled: true,
        }
    }
}

impl DiscoveryConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable discovery
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// Bridge Config
// ============================================================================

/// Bridge identity and wait behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Server name reported by the management API
    pub server_name: String,
    /// Manufacturer reported by the management API
    pub manufacturer: String,
    /// Location reported by the management API
    pub location: String,
    /// Wait adapter timing
    pub waits: WaitConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            server_name: "Alpaca Bridge".to_string(),
            manufacturer: "alpaca-bridge".to_string(),
            location: String::new(),
            waits: WaitConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Set the server name
    pub fn with_server_name(mut self, name: &str) -> Self {
        self.server_name = name.to_string();
        self
    }

    /// Set the manufacturer
    pub fn with_manufacturer(mut self, manufacturer: &str) -> Self {
        self.manufacturer = manufacturer.to_string();
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }

    /// Set wait timing
    pub fn with_waits(mut self, waits: WaitConfig) -> Self {
        self.waits = waits;
        self
    }
}

/// Wait adapter timing
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Cache poll interval
    pub poll_interval: Duration,
    /// Timeout for connection, switch, filter, focuser and tracking changes
    pub short_timeout: Duration,
    /// Timeout for mount slews
    pub slew_timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            short_timeout: Duration::from_secs(30),
            slew_timeout: Duration::from_secs(300),
        }
    }
}

impl WaitConfig {
    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the short timeout
    pub fn with_short_timeout(mut self, timeout: Duration) -> Self {
        self.short_timeout = timeout;
        self
    }

    /// Set the slew timeout
    pub fn with_slew_timeout(mut self, timeout: Duration) -> Self {
        self.slew_timeout = timeout;
        self
    }
}
