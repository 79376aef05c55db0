//! Alpaca response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::DeviceHandle;
use crate::error::{AlpacaError, AlpacaResult, OK_CODE};

// ============================================================================
// Envelope
// ============================================================================

/// Client and server transaction ids of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    /// Echoed `ClientTransactionID`.
    pub client: u32,
    /// Bridge-assigned id.
    pub server: u32,
}

/// Alpaca response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlpacaResponse {
    /// Command value, present on successful GETs.
    #[serde(rename = "Value", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Echoed client transaction id.
    #[serde(rename = "ClientTransactionID")]
    pub client_transaction_id: u32,
    /// Server transaction id.
    #[serde(rename = "ServerTransactionID")]
    pub server_transaction_id: u32,
    /// Alpaca error number, 0 on success.
    #[serde(rename = "ErrorNumber")]
    pub error_number: i32,
    /// Error message, empty on success.
    #[serde(rename = "ErrorMessage")]
    pub error_message: String,
}

impl AlpacaResponse {
    fn new(value: Option<Value>, error: Option<AlpacaError>, tx: Transaction) -> Self {
        Self {
            value,
            client_transaction_id: tx.client,
            server_transaction_id: tx.server,
            error_number: error.map_or(OK_CODE, |e| e.code()),
            error_message: error.map(|e| e.to_string()).unwrap_or_default(),
        }
    }

    /// Envelope for a GET result.
    pub fn from_value(result: AlpacaResult<Value>, tx: Transaction) -> Self {
        match result {
            Ok(value) => Self::new(Some(value), None, tx),
            Err(error) => Self::new(None, Some(error), tx),
        }
    }

    /// Envelope for a PUT result.
    pub fn from_unit(result: AlpacaResult<()>, tx: Transaction) -> Self {
        Self::new(None, result.err(), tx)
    }

    /// Whether the envelope reports success.
    pub fn is_ok(&self) -> bool {
        self.error_number == OK_CODE
    }
}

// ============================================================================
// Management API
// ============================================================================

/// `GET /management/v1/description` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerDescription {
    /// Server name.
    pub server_name: String,
    /// Manufacturer.
    pub manufacturer: String,
    /// Bridge version.
    pub manufacturer_version: String,
    /// Location.
    pub location: String,
}

/// One entry of `GET /management/v1/configureddevices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredDevice {
    /// Device name.
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    /// Capitalized device type.
    #[serde(rename = "DeviceType")]
    pub device_type: String,
    /// Device number.
    #[serde(rename = "DeviceNumber")]
    pub device_number: u32,
    /// Stable unique id.
    #[serde(rename = "UniqueID")]
    pub unique_id: String,
}

impl From<&DeviceHandle> for ConfiguredDevice {
    fn from(device: &DeviceHandle) -> Self {
        let identity = device.identity();
        Self {
            device_name: identity.name.clone(),
            device_type: identity.id.device_type.display_name().to_string(),
            device_number: identity.id.number,
            unique_id: identity.unique_id.to_string(),
        }
    }
}
