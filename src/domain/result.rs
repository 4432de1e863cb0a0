//! Result type alias used throughout the crate

use super::errors::BridgeError;

/// Convenience alias binding the crate's error type
pub type Result<T> = std::result::Result<T, BridgeError>;
