//! Security-protocol helpers outside the SWG comms channel.
//!
//! Two small exchanges use raw security protocols instead of framed SWG
//! traffic: protocol discovery (protocol 0x00) enumerates what the drive
//! speaks, and the ComID stack reset (protocol 0x02) returns a wedged
//! communication channel to a known state.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use sedlink_proto::BLOCK_SIZE;
use tracing::debug;

use crate::{
    error::{Result, TperError},
    tper::Tper,
    transport::{PROTO_COMMS, PROTO_DISCOVERY, PROTO_STACK_RESET, Transport, protocol_name},
};

/// HANDLE_COMID_REQUEST code for a stack reset.
const STACK_RESET: u32 = 0x02;

/// HANDLE_COMID_REQUEST command block (8 bytes, big-endian).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
struct ComIdRequest {
    com_id: [u8; 2],
    com_id_ext: [u8; 2],
    request_code: [u8; 4],
}

/// HANDLE_COMID_REQUEST response block (16 bytes, big-endian).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
struct ComIdResponse {
    com_id: [u8; 2],
    com_id_ext: [u8; 2],
    request_code: [u8; 4],
    avail_data: [u8; 4],
    failed: [u8; 4],
}

impl<T: Transport> Tper<T> {
    /// Enumerate the drive's security protocols.
    ///
    /// Requires TCG comms (protocol 0x01) to be listed, and records
    /// whether stack resets (protocol 0x02) are available.
    ///
    /// # Errors
    ///
    /// - `TperError::TpmProto` if the drive lists no TCG comms protocol
    pub fn probe_protocols(&mut self) -> Result<()> {
        let mut block = [0u8; BLOCK_SIZE];
        self.transport.if_recv(PROTO_DISCOVERY, 0, &mut block, 1)?;

        // Big-endian protocol count at bytes 6..8, list from byte 8
        let count = u16::from_be_bytes([block[6], block[7]]) as usize;
        let list = &block[8..(8 + count).min(BLOCK_SIZE)];

        let mut has_comms = false;
        for &protocol in list {
            debug!(protocol, name = protocol_name(protocol), "security protocol");
            match protocol {
                PROTO_COMMS => has_comms = true,
                PROTO_STACK_RESET => self.has_reset = true,
                _ => {}
            }
        }

        if !has_comms {
            return Err(TperError::TpmProto);
        }
        Ok(())
    }

    /// Reset the communication stack of this handle's ComID.
    ///
    /// # Errors
    ///
    /// - `TperError::ComIdResetFailed` if the drive rejects the reset
    pub fn stack_reset(&mut self) -> Result<()> {
        debug!(com_id = self.com_id, "resetting ComID stack");

        let mut request = ComIdRequest::default();
        request.com_id = self.com_id.to_be_bytes();
        request.request_code = STACK_RESET.to_be_bytes();

        let mut block = [0u8; BLOCK_SIZE];
        block[..std::mem::size_of::<ComIdRequest>()].copy_from_slice(request.as_bytes());
        self.transport.if_send(PROTO_STACK_RESET, self.com_id, &block, 1)?;

        block.fill(0);
        self.transport.if_recv(PROTO_STACK_RESET, self.com_id, &mut block, 1)?;

        let Ok((response, _)) = ComIdResponse::ref_from_prefix(&block) else {
            return Err(TperError::ComIdResetFailed);
        };
        if u32::from_be_bytes(response.avail_data) != 4 || u32::from_be_bytes(response.failed) != 0
        {
            return Err(TperError::ComIdResetFailed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comid_blocks_match_wire_layout() {
        assert_eq!(std::mem::size_of::<ComIdRequest>(), 8);
        assert_eq!(std::mem::size_of::<ComIdResponse>(), 16);

        let mut request = ComIdRequest::default();
        request.com_id = 0x07FEu16.to_be_bytes();
        request.request_code = STACK_RESET.to_be_bytes();
        assert_eq!(request.as_bytes(), [0x07, 0xFE, 0, 0, 0, 0, 0, 0x02]);
    }
}
