//! Scripted transport for driving a `Tper` without hardware.
//!
//! The mock records every IF-SEND and replays canned IF-RECV blocks in
//! order. An exhausted script answers like a drive that is still thinking:
//! a zero-length ComPacket on the right ComID.

#![allow(dead_code)]

use std::collections::VecDeque;

use sedlink_core::{Transport, TransportError};
use sedlink_proto::{
    Buffer, SwgHeader, Token, Uid, encode_token, encode_uid, encode_uint, frame_sizes,
};

/// One recorded IF-SEND.
pub struct Sent {
    /// Security protocol of the transfer
    pub protocol: u8,
    /// ComID of the transfer
    pub com_id: u16,
    /// Full block data as handed to the transport
    pub data: Vec<u8>,
}

/// Transport double: records sends, replays scripted receives.
#[derive(Default)]
pub struct ScriptedTransport {
    /// Everything the core transmitted, in order
    pub sent: Vec<Sent>,
    responses: VecDeque<Vec<u8>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a canned response for the next IF-RECV.
    pub fn push_response(&mut self, block: Vec<u8>) {
        self.responses.push_back(block);
    }
}

impl Transport for ScriptedTransport {
    fn if_send(
        &mut self,
        protocol: u8,
        com_id: u16,
        data: &[u8],
        _blocks: u8,
    ) -> Result<(), TransportError> {
        self.sent.push(Sent { protocol, com_id, data: data.to_vec() });
        Ok(())
    }

    fn if_recv(
        &mut self,
        _protocol: u8,
        com_id: u16,
        data: &mut [u8],
        _blocks: u8,
    ) -> Result<(), TransportError> {
        data.fill(0);
        match self.responses.pop_front() {
            Some(block) => {
                let n = block.len().min(data.len());
                data[..n].copy_from_slice(&block[..n]);
            }
            None => {
                // Response not ready: valid ComID, zero length
                let mut header = SwgHeader::default();
                header.com.set_com_id(com_id);
                let n = SwgHeader::SIZE.min(data.len());
                data[..n].copy_from_slice(&header.to_bytes()[..n]);
            }
        }
        Ok(())
    }
}

/// Wrap a token stream in valid ComPacket/Packet/SubPacket framing.
pub fn framed(com_id: u16, payload: &[u8]) -> Vec<u8> {
    let sizes = frame_sizes(payload.len());
    let mut block = vec![0u8; sizes.total];

    let mut header = SwgHeader::default();
    header.com.set_com_id(com_id);
    header.com.set_length(sizes.com as u32);
    header.pkt.set_length(sizes.packet as u32);
    header.sub.set_length(sizes.sub as u32);

    block[..SwgHeader::SIZE].copy_from_slice(&header.to_bytes());
    block[SwgHeader::SIZE..SwgHeader::SIZE + payload.len()].copy_from_slice(payload);
    block
}

/// Build a framed method response: result list, EndOfData, status trailer.
///
/// Session-manager responses (`from_session_manager`) carry the Call-token
/// prefix that real drives emit: a call to `SMUID.SyncSession`.
pub fn method_response(
    com_id: u16,
    from_session_manager: bool,
    status: u8,
    results: impl FnOnce(&mut Buffer),
) -> Vec<u8> {
    let mut payload = Buffer::new(4096);

    if from_session_manager {
        encode_token(&mut payload, Token::Call).unwrap();
        encode_uid(&mut payload, Uid::SESSION_MANAGER).unwrap();
        encode_uid(&mut payload, Uid::SYNC_SESSION).unwrap();
    }

    encode_token(&mut payload, Token::StartList).unwrap();
    results(&mut payload);
    encode_token(&mut payload, Token::EndList).unwrap();

    encode_token(&mut payload, Token::EndOfData).unwrap();
    encode_token(&mut payload, Token::StartList).unwrap();
    encode_uint(&mut payload, status as u64).unwrap();
    encode_uint(&mut payload, 0).unwrap();
    encode_uint(&mut payload, 0).unwrap();
    encode_token(&mut payload, Token::EndList).unwrap();

    framed(com_id, payload.as_slice())
}
