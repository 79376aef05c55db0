//! Alpaca request parameter parsing.
//!
//! Parameters arrive as `name=value` pairs, form-encoded in PUT bodies and
//! in the query string for GET. Names match case-insensitively. Every
//! typed accessor turns a missing or malformed value into
//! [`AlpacaError::InvalidValue`].
//!
//! # Example
//!
//! ```rust
//! use alpaca_bridge::params::Params;
//!
//! let params = Params::parse("RightAscension=5.5&declination=-10&ClientTransactionID=7");
//! assert_eq!(params.f64("RightAscension"), Ok(5.5));
//! assert_eq!(params.f64("Declination"), Ok(-10.0));
//! assert_eq!(params.client_transaction_id(), 7);
//! assert!(params.f64("Azimuth").is_err());
//! ```

use crate::error::{AlpacaError, AlpacaResult};

/// Parsed request parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a form-encoded string. Undecodable pairs are dropped.
    pub fn parse(encoded: &str) -> Self {
        let pairs = encoded
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                Some((decode(name)?, decode(value)?))
            })
            .collect();
        Self { pairs }
    }

    /// Parse a form-encoded body. Non-UTF-8 bodies yield no parameters.
    pub fn from_body(body: &[u8]) -> Self {
        std::str::from_utf8(body).map(Self::parse).unwrap_or_default()
    }

    /// Add a pair.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    /// Raw value of the first pair named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Raw value, required.
    pub fn require(&self, name: &str) -> AlpacaResult<&str> {
        self.get(name).ok_or(AlpacaError::InvalidValue)
    }

    /// Finite floating-point value.
    pub fn f64(&self, name: &str) -> AlpacaResult<f64> {
        self.require(name)?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(AlpacaError::InvalidValue)
    }

    /// Integer value.
    pub fn i32(&self, name: &str) -> AlpacaResult<i32> {
        self.require(name)?
            .trim()
            .parse::<i32>()
            .map_err(|_| AlpacaError::InvalidValue)
    }

    /// Boolean value: `true` or `false`, any case.
    pub fn bool(&self, name: &str) -> AlpacaResult<bool> {
        let value = self.require(name)?.trim();
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(AlpacaError::InvalidValue)
        }
    }

    /// `ClientTransactionID`, or 0 when absent or malformed.
    pub fn client_transaction_id(&self) -> u32 {
        self.get("ClientTransactionID")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }
}

fn decode(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|decoded| decoded.into_owned())
}
