//! Alpaca error vocabulary and bridge infrastructure errors.
//!
//! Every command failure resolves to exactly one [`AlpacaError`] at the point
//! where it is detected. The numeric codes are part of the Alpaca wire
//! contract and are reproduced exactly.
//!
//! | Variant | Code | Message |
//! |---------|------|---------|
//! | [`NotImplemented`](AlpacaError::NotImplemented) | `0x400` | Property or method not implemented |
//! | [`InvalidValue`](AlpacaError::InvalidValue) | `0x401` | Invalid value |
//! | [`ValueNotSet`](AlpacaError::ValueNotSet) | `0x402` | Value not set |
//! | [`NotConnected`](AlpacaError::NotConnected) | `0x407` | Not connected |
//! | [`InvalidWhileParked`](AlpacaError::InvalidWhileParked) | `0x408` | Invalid while parked |
//! | [`InvalidWhileSlaved`](AlpacaError::InvalidWhileSlaved) | `0x409` | Invalid while slaved |
//! | [`InvalidOperation`](AlpacaError::InvalidOperation) | `0x40B` | Invalid operation |
//! | [`ActionNotImplemented`](AlpacaError::ActionNotImplemented) | `0x40C` | Action not implemented |

use thiserror::Error;

/// Error code reported when a command succeeds.
pub const OK_CODE: i32 = 0;

/// Message for codes outside the vocabulary.
pub const UNKNOWN_CODE_MESSAGE: &str = "Unknown code";

/// Alpaca protocol error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlpacaError {
    /// The device has no such capability, or the command is unknown.
    #[error("Property or method not implemented")]
    NotImplemented,

    /// Parameter missing, unparseable or out of range.
    #[error("Invalid value")]
    InvalidValue,

    /// Read of a target that was never staged.
    #[error("Value not set")]
    ValueNotSet,

    /// The device is not connected.
    #[error("Not connected")]
    NotConnected,

    /// The operation is not allowed while parked.
    #[error("Invalid while parked")]
    InvalidWhileParked,

    /// The operation is not allowed while slaved.
    #[error("Invalid while slaved")]
    InvalidWhileSlaved,

    /// The capability exists but the current state forbids the operation.
    #[error("Invalid operation")]
    InvalidOperation,

    /// Device-specific actions are not supported.
    #[error("Action not implemented")]
    ActionNotImplemented,
}

impl AlpacaError {
    /// Wire error number.
    pub const fn code(&self) -> i32 {
        match self {
            AlpacaError::NotImplemented => 0x400,
            AlpacaError::InvalidValue => 0x401,
            AlpacaError::ValueNotSet => 0x402,
            AlpacaError::NotConnected => 0x407,
            AlpacaError::InvalidWhileParked => 0x408,
            AlpacaError::InvalidWhileSlaved => 0x409,
            AlpacaError::InvalidOperation => 0x40B,
            AlpacaError::ActionNotImplemented => 0x40C,
        }
    }

    /// Map a wire error number back to a variant.
    ///
    /// Returns `None` for `0` and for numbers outside the vocabulary.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0x400 => Some(AlpacaError::NotImplemented),
            0x401 => Some(AlpacaError::InvalidValue),
            0x402 => Some(AlpacaError::ValueNotSet),
            0x407 => Some(AlpacaError::NotConnected),
            0x408 => Some(AlpacaError::InvalidWhileParked),
            0x409 => Some(AlpacaError::InvalidWhileSlaved),
            0x40B => Some(AlpacaError::InvalidOperation),
            0x40C => Some(AlpacaError::ActionNotImplemented),
            _ => None,
        }
    }
}

/// Human string for any wire error number.
///
/// `0` maps to the empty string, unknown numbers to [`UNKNOWN_CODE_MESSAGE`].
pub fn error_message(code: i32) -> String {
    if code == OK_CODE {
        return String::new();
    }
    match AlpacaError::from_code(code) {
        Some(err) => err.to_string(),
        None => UNKNOWN_CODE_MESSAGE.to_string(),
    }
}

/// Result alias used by command dispatch.
pub type AlpacaResult<T> = Result<T, AlpacaError>;

/// Infrastructure errors outside the Alpaca vocabulary.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Socket or file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bus side of a channel has gone away.
    #[error("bus channel closed")]
    BusClosed,

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}
