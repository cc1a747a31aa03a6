//! Nested packet framing: ComPacket, Packet, SubPacket.
//!
//! One SWG transmission carries three nested frames:
//!
//! ```text
//! ComPacket { reserved, com_id, com_id_ext, tper_left, min_xfer, length }
//!   Packet { tper_session_id, host_session_id, seq, reserved, ack_type, ack, length }
//!     SubPacket { reserved[6], kind, length } || payload
//! ```
//!
//! All integers are big-endian; fields are stored as raw byte arrays to
//! avoid alignment issues, with accessor pairs doing the byte-order work.
//! Every `length` field is exclusive; it counts the bytes that follow its
//! header within that frame.
//!
//! Sizing rules: the Packet body is padded to a multiple of 4, and the
//! whole transmission is padded to a multiple of the 512-byte transport
//! block. [`frame_sizes`] computes all four figures.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::errors::{Result, SyntaxError};

/// Transport block granularity: transmissions are whole 512-byte blocks.
pub const BLOCK_SIZE: usize = 512;

/// Packet bodies are padded to this alignment.
pub const PACKET_ALIGN: usize = 4;

/// Round `value` up to a multiple of `align`.
const fn pad_to(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

/// ComPacket header: the outermost frame, bound to one ComID (20 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct ComPacketHeader {
    reserved: [u8; 4],
    com_id: [u8; 2],
    com_id_ext: [u8; 2],
    /// Bytes of response data still queued on the TPer
    tper_left: [u8; 4],
    /// Minimum transfer needed to drain `tper_left`
    min_xfer: [u8; 4],
    length: [u8; 4],
}

impl ComPacketHeader {
    /// Serialized size (20 bytes).
    pub const SIZE: usize = 20;

    /// Communication channel identifier.
    #[must_use]
    pub fn com_id(&self) -> u16 {
        u16::from_be_bytes(self.com_id)
    }

    /// Set the communication channel identifier.
    pub fn set_com_id(&mut self, com_id: u16) {
        self.com_id = com_id.to_be_bytes();
    }

    /// Extended ComID (zero on the base channel).
    #[must_use]
    pub fn com_id_ext(&self) -> u16 {
        u16::from_be_bytes(self.com_id_ext)
    }

    /// Bytes of further response data held by the TPer.
    #[must_use]
    pub fn tper_left(&self) -> u32 {
        u32::from_be_bytes(self.tper_left)
    }

    /// Minimum receive size to drain the TPer's queued data.
    #[must_use]
    pub fn min_xfer(&self) -> u32 {
        u32::from_be_bytes(self.min_xfer)
    }

    /// Bytes following this header in the transmission.
    #[must_use]
    pub fn length(&self) -> u32 {
        u32::from_be_bytes(self.length)
    }

    /// Set the byte count following this header.
    pub fn set_length(&mut self, length: u32) {
        self.length = length.to_be_bytes();
    }
}

/// Packet header: binds its contents to a session (24 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct PacketHeader {
    tper_session_id: [u8; 4],
    host_session_id: [u8; 4],
    seq: [u8; 4],
    reserved: [u8; 2],
    ack_type: [u8; 2],
    ack: [u8; 4],
    length: [u8; 4],
}

impl PacketHeader {
    /// Serialized size (24 bytes).
    pub const SIZE: usize = 24;

    /// TPer half of the session id pair.
    #[must_use]
    pub fn tper_session_id(&self) -> u32 {
        u32::from_be_bytes(self.tper_session_id)
    }

    /// Host half of the session id pair.
    #[must_use]
    pub fn host_session_id(&self) -> u32 {
        u32::from_be_bytes(self.host_session_id)
    }

    /// Write both session ids. Session-manager traffic leaves them zero.
    pub fn set_session_ids(&mut self, tper: u32, host: u32) {
        self.tper_session_id = tper.to_be_bytes();
        self.host_session_id = host.to_be_bytes();
    }

    /// Bytes following this header in the transmission.
    #[must_use]
    pub fn length(&self) -> u32 {
        u32::from_be_bytes(self.length)
    }

    /// Set the byte count following this header.
    pub fn set_length(&mut self, length: u32) {
        self.length = length.to_be_bytes();
    }
}

/// SubPacket header: the innermost frame holding the token stream (12 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct SubPacketHeader {
    reserved: [u8; 6],
    kind: [u8; 2],
    length: [u8; 4],
}

impl SubPacketHeader {
    /// Serialized size (12 bytes).
    pub const SIZE: usize = 12;

    /// SubPacket kind carrying a plain token stream.
    pub const KIND_DATA: u16 = 0x0000;

    /// SubPacket kind.
    #[must_use]
    pub fn kind(&self) -> u16 {
        u16::from_be_bytes(self.kind)
    }

    /// Payload bytes following this header, excluding padding.
    #[must_use]
    pub fn length(&self) -> u32 {
        u32::from_be_bytes(self.length)
    }

    /// Set the payload byte count.
    pub fn set_length(&mut self, length: u32) {
        self.length = length.to_be_bytes();
    }
}

/// The three frame headers as they appear at the start of a transmission.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct SwgHeader {
    /// Outermost frame
    pub com: ComPacketHeader,
    /// Session-bound frame
    pub pkt: PacketHeader,
    /// Token-stream frame
    pub sub: SubPacketHeader,
}

impl SwgHeader {
    /// Serialized size of the stacked headers (56 bytes).
    pub const SIZE: usize = ComPacketHeader::SIZE + PacketHeader::SIZE + SubPacketHeader::SIZE;

    /// Borrow the stacked headers from the start of a transmission.
    ///
    /// Zero-copy; any 56-byte prefix is a structurally valid header, so the
    /// only failure is a short buffer.
    ///
    /// # Errors
    ///
    /// - `SyntaxError::BufferEnd` if fewer than 56 bytes are present
    pub fn parse(bytes: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(bytes)
            .map(|(header, _)| header)
            .map_err(|_| SyntaxError::BufferEnd { needed: Self::SIZE, available: bytes.len() })
    }

    /// Serialized header bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }
}

/// The four byte counts of one framed transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSizes {
    /// SubPacket payload (the caller's token stream)
    pub sub: usize,
    /// Packet body: SubPacket header + payload, padded to 4
    pub packet: usize,
    /// ComPacket body: Packet header + Packet body
    pub com: usize,
    /// Whole transmission, padded to the transport block
    pub total: usize,
}

/// Compute the framed sizes for a payload.
#[must_use]
pub fn frame_sizes(payload_len: usize) -> FrameSizes {
    let sub = payload_len;
    let packet = pad_to(sub + SubPacketHeader::SIZE, PACKET_ALIGN);
    let com = packet + PacketHeader::SIZE;
    let total = pad_to(com + ComPacketHeader::SIZE, BLOCK_SIZE);
    FrameSizes { sub, packet, com, total }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_sizes_match_wire_layout() {
        assert_eq!(std::mem::size_of::<ComPacketHeader>(), ComPacketHeader::SIZE);
        assert_eq!(std::mem::size_of::<PacketHeader>(), PacketHeader::SIZE);
        assert_eq!(std::mem::size_of::<SubPacketHeader>(), SubPacketHeader::SIZE);
        assert_eq!(std::mem::size_of::<SwgHeader>(), 56);
    }

    #[test]
    fn fields_are_big_endian() {
        let mut header = SwgHeader::default();
        header.com.set_com_id(0x07FE);
        header.com.set_length(0x0102_0304);
        header.pkt.set_session_ids(0xAABB_CCDD, 0x0000_0001);
        header.sub.set_length(0x11);

        let bytes = header.to_bytes();
        assert_eq!(&bytes[4..6], [0x07, 0xFE]);
        assert_eq!(&bytes[16..20], [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&bytes[20..24], [0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(&bytes[24..28], [0x00, 0x00, 0x00, 0x01]);
        assert_eq!(&bytes[52..56], [0x00, 0x00, 0x00, 0x11]);

        let parsed = SwgHeader::parse(&bytes).unwrap();
        assert_eq!(parsed.com.com_id(), 0x07FE);
        assert_eq!(parsed.pkt.tper_session_id(), 0xAABB_CCDD);
        assert_eq!(parsed.sub.length(), 0x11);
    }

    #[test]
    fn parse_rejects_short_prefix() {
        let err = SwgHeader::parse(&[0u8; 40]).unwrap_err();
        assert_eq!(err, SyntaxError::BufferEnd { needed: 56, available: 40 });
    }

    #[test]
    fn sizes_follow_padding_rules() {
        // Empty payload: 12-byte SubPacket header already aligned
        let empty = frame_sizes(0);
        assert_eq!(empty, FrameSizes { sub: 0, packet: 12, com: 36, total: 512 });

        // One payload byte forces 3 bytes of packet padding
        let one = frame_sizes(1);
        assert_eq!(one.packet, 16);
        assert_eq!(one.com, 40);
        assert_eq!(one.total, 512);

        // Just past one block
        let big = frame_sizes(512 - SwgHeader::SIZE + 1);
        assert_eq!(big.total, 1024);
    }

    #[test]
    fn packet_body_alignment_is_exact() {
        for len in 0..64 {
            let sizes = frame_sizes(len);
            assert_eq!(sizes.packet % PACKET_ALIGN, 0);
            assert!(sizes.packet >= len + SubPacketHeader::SIZE);
            assert!(sizes.packet < len + SubPacketHeader::SIZE + PACKET_ALIGN);
            assert_eq!(sizes.total % BLOCK_SIZE, 0);
        }
    }
}
