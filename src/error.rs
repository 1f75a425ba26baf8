//! Error types for the bridge.
//!
//! The failure surface is deliberately small: construction can fail (the
//! adapter node then does not mount), and lifecycle hooks can be invoked in a
//! forbidden state. Everything else - detached projection targets, unknown
//! property names - is by contract not an error.

use thiserror::Error;

/// Errors surfaced by the adapter and lifecycle binder.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The external component's creation call failed. The adapter node does
    /// not mount; the failure propagates to the host tree.
    #[error("external component construction failed: {0}")]
    Construction(String),

    /// A lifecycle hook was invoked in a state that forbids it (construct
    /// twice, update or disconnect outside the connected lifetime).
    #[error("lifecycle violation: {0}")]
    Lifecycle(&'static str),
}

impl BridgeError {
    /// Construction failure with a message.
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }
}
