//! Error types for the SWG wire layer.
//!
//! Encoding errors are bounds violations on the target buffer; decoding
//! errors distinguish "not enough bytes" from "wrong shape" so that callers
//! can fall back to an alternative parse (see [`crate::Reader::read_uid`]).

use thiserror::Error;

/// Result alias for wire-layer operations.
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Errors produced while encoding or decoding the SWG binary syntax.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// Target buffer has no room for the encoded bytes
    #[error("buffer full: need {needed} more bytes, capacity {capacity}")]
    NoSpace {
        /// Bytes the operation tried to append
        needed: usize,
        /// Total capacity of the target buffer
        capacity: usize,
    },

    /// Source ran out of bytes mid-value
    #[error("unexpected end of data: need {needed} bytes, {available} available")]
    BufferEnd {
        /// Bytes the operation required
        needed: usize,
        /// Bytes actually remaining
        available: usize,
    },

    /// Value too large for any atom encoding
    #[error("cannot represent {len} bytes: long atoms carry at most 2^24 - 1")]
    CannotRepresent {
        /// Length of the rejected payload
        len: usize,
    },

    /// Atom at the cursor does not have the requested type
    #[error("unexpected datatype: atom starts with {found:#04x}")]
    BadDatatype {
        /// First byte of the offending atom or token
        found: u8,
    },

    /// Expected a specific control token
    #[error("bad syntax: expected token {expected:#04x}, found {found:#04x}")]
    BadSyntax {
        /// Token the caller required
        expected: u8,
        /// Byte actually at the cursor
        found: u8,
    },
}
