//! Host-side session and transport logic for TCG SWG self-encrypting
//! drives.
//!
//! This crate drives a Trusted Peripheral (TPer) over a block-device
//! transport: it frames token streams built with [`sedlink_proto`], polls
//! the drive for responses, extracts method status, and manages the
//! session lifecycle against a Security Provider.
//!
//! # Architecture
//!
//! Everything hangs off the [`Tper`] handle, which owns the transport and
//! the reusable I/O block. The stack is synchronous and single-caller by
//! construction: every operation takes `&mut self`, and the zero-copy
//! response views returned by [`Tper::invoke`] borrow the handle, so the
//! compiler rejects overlapping requests.
//!
//! ```no_run
//! use sedlink_core::{SscKind, Tper, Transport, Uid};
//!
//! fn open_admin_sp<T: Transport>(transport: T) -> sedlink_core::Result<Tper<T>> {
//!     let mut tper = Tper::new(transport, SscKind::Opal, 0x07FE);
//!     tper.probe_protocols()?;
//!     if tper.has_reset() {
//!         tper.stack_reset()?;
//!     }
//!     tper.negotiate_properties()?;
//!     tper.start_session(Uid::ADMIN_SP)?;
//!     Ok(tper)
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod comms;
mod error;
mod security;
mod session;
mod tper;
mod transport;

pub use error::{Result, TperError};
pub use session::HostPropertiesKey;
pub use tper::{
    CommsConfig, DEFAULT_DRIVE_MAX_PACKET, DEFAULT_DRIVE_MAX_TOKEN, DEFAULT_POLL_INTERVAL,
    DEFAULT_RECV_TIMEOUT, MAX_IO_BLOCK, SessionState, SscKind, Tper,
};
pub use transport::{
    BLOCK_SIZE, PROTO_COMMS, PROTO_DISCOVERY, PROTO_STACK_RESET, Transport, TransportError,
    protocol_name,
};

// Wire-layer types that appear in this crate's API
pub use sedlink_proto::{Buffer, MethodStatus, Reader, Uid};
