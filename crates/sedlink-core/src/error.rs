//! Error types for the host-side session layer.
//!
//! Strongly-typed errors for the layers above the wire codec: framing
//! violations, session-manager handshakes, and remote method status. Wire
//! and transport errors convert in unchanged via `#[from]`, so callers see
//! one error type with the original failure preserved.

use std::time::Duration;

use sedlink_proto::{MethodStatus, SyntaxError};
use thiserror::Error;

use crate::transport::TransportError;

/// Result alias for session-layer operations.
pub type Result<T> = std::result::Result<T, TperError>;

/// Errors surfaced while driving a Trusted Peripheral.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TperError {
    /// Wire-layer encode/decode failure
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// Failure in the block-device transport
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Outbound transmission exceeds the negotiated ComPacket limit
    #[error("packet too large: {size} bytes exceeds the negotiated {max}")]
    PacketTooLarge {
        /// Total framed transmission size
        size: usize,
        /// Negotiated `MaxComPacketSize`
        max: usize,
    },

    /// Response carries a ComID other than the channel's
    #[error("response for ComID {actual:#06x}, expected {expected:#06x}")]
    BadComId {
        /// ComID this handle communicates on
        expected: u16,
        /// ComID found in the response header
        actual: u16,
    },

    /// Response violates the expected shape
    #[error("malformed response: {0}")]
    Malformed(&'static str),

    /// TPer produced no response within the receive deadline
    #[error("no response from TPer after {elapsed:?}")]
    Timeout {
        /// How long the transceiver polled
        elapsed: Duration,
    },

    /// Drive's Security Subsystem Class is unknown
    #[error("unknown security subsystem class")]
    NoSsc,

    /// Device exposes no trusted peripheral.
    ///
    /// Reported by openers probing the device before this layer is used;
    /// kept here so discovery and session code share one taxonomy.
    #[error("device does not contain a trusted peripheral")]
    NoTpm,

    /// Trusted peripheral lists no TCG comms protocol
    #[error("trusted peripheral supports no known security protocol")]
    TpmProto,

    /// Trusted peripheral speaks an unrecognized protocol version.
    ///
    /// Reported by discovery layers above this crate; see [`Self::NoTpm`].
    #[error("trusted peripheral uses an unknown protocol version")]
    TpmVersion,

    /// Drive rejected the ComID stack reset
    #[error("ComID stack reset failed")]
    ComIdResetFailed,

    /// Remote method call completed with a nonzero status
    #[error("method failed: {0}")]
    MethodFailed(MethodStatus),
}

impl TperError {
    /// True if retrying the operation may succeed.
    ///
    /// Timeouts and busy/locked method statuses are transient; framing and
    /// syntax violations indicate a broken peer and are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::MethodFailed(MethodStatus::SpBusy | MethodStatus::NoSessionsAvailable)
        )
    }
}
