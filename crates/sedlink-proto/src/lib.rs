//! Wire layer for the TCG Storage Working Group (SWG) interface.
//!
//! Everything that is bit-exact on the wire lives here: the binary syntax
//! (control tokens and atoms), method-call assembly, the nested
//! ComPacket / Packet / SubPacket framing, and the UID and method-status
//! vocabularies shared by every Security Subsystem Class (Opal, Opalite,
//! Pyrite, Enterprise).
//!
//! # Architecture
//!
//! Encoding targets a bounded [`Buffer`]; decoding walks a borrowed
//! [`Reader`], so response data is parsed in place without copying out of
//! the I/O block it arrived in. The host-side session logic that drives
//! this layer lives in `sedlink-core`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod atom;
mod buffer;
mod display;
mod errors;
mod framing;
mod method;
mod reader;
mod status;
mod token;
mod uid;

pub use atom::{
    AtomInfo, TINY_SINT_MAX, TINY_SINT_MIN, TINY_UINT_MAX, encode_atom, encode_bytes,
    encode_half_uid, encode_sint, encode_str, encode_tiny, encode_token, encode_uid, encode_uint,
};
pub use buffer::Buffer;
pub use display::pretty;
pub use errors::{Result, SyntaxError};
pub use framing::{
    BLOCK_SIZE, ComPacketHeader, FrameSizes, PACKET_ALIGN, PacketHeader, SubPacketHeader,
    SwgHeader, frame_sizes,
};
pub use method::{UID_ATOM_LEN, encode_method};
pub use reader::Reader;
pub use status::MethodStatus;
pub use token::Token;
pub use uid::Uid;
