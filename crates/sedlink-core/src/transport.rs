//! Block-device transport contract.
//!
//! The core never talks to the OS directly. Concrete transports (SG_IO
//! ATA12 pass-through on Linux, and so on) implement [`Transport`], moving
//! whole 512-byte blocks with the ATA Trusted Send / Trusted Receive
//! commands. Opening, closing, and drive identification are transport
//! concerns and stay outside this crate.

use thiserror::Error;

pub use sedlink_proto::BLOCK_SIZE;

/// Security protocol 0x00: protocol discovery.
pub const PROTO_DISCOVERY: u8 = 0x00;

/// Security protocol 0x01: TCG SWG general comms.
pub const PROTO_COMMS: u8 = 0x01;

/// Security protocol 0x02: TCG SWG stack reset.
pub const PROTO_STACK_RESET: u8 = 0x02;

/// Errors raised by a concrete transport implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Device could not be opened
    #[error("cannot open device: {0}")]
    Open(String),

    /// Device could not be closed
    #[error("cannot close device: {0}")]
    Close(String),

    /// Pass-through ioctl failed
    #[error("ioctl failed: {0}")]
    Ioctl(String),

    /// Drive answered with bad sense data
    #[error("bad sense data: {0}")]
    Sense(String),

    /// Kernel state could not be read
    #[error("sysfs read failed: {0}")]
    Sysfs(String),

    /// Kernel is configured to block trusted commands
    #[error("libata is blocking TPM calls (boot with libata.allow_tpm=1)")]
    LibataBlocked,
}

/// IF-SEND / IF-RECV over a block device.
///
/// `data` buffers must hold exactly `blocks * 512` bytes; implementations
/// transfer whole blocks and never partial ones. Both calls block until the
/// drive completes the command.
pub trait Transport {
    /// ATA Trusted Send: deliver `blocks` blocks to the drive on the given
    /// security protocol and ComID.
    fn if_send(
        &mut self,
        protocol: u8,
        com_id: u16,
        data: &[u8],
        blocks: u8,
    ) -> std::result::Result<(), TransportError>;

    /// ATA Trusted Receive: fetch `blocks` blocks from the drive on the
    /// given security protocol and ComID.
    fn if_recv(
        &mut self,
        protocol: u8,
        com_id: u16,
        data: &mut [u8],
        blocks: u8,
    ) -> std::result::Result<(), TransportError>;
}

/// Human-readable name of a security protocol, for diagnostics.
#[must_use]
pub fn protocol_name(protocol: u8) -> &'static str {
    match protocol {
        0x00 => "Security Protocol Discovery",
        0x01 => "TCG SWG (General Comms)",
        0x02 => "TCG SWG (Proto Reset)",
        0x03..=0x06 => "TCG SWG (Reserved)",
        0x20 | 0xEF => "T10 (Reserved)",
        0xEE => "IEEE P1667",
        0xF0..=0xFF => "Vendor Specific",
        _ => "Reserved",
    }
}
