//! Transceiver and method invoker.
//!
//! Outbound: frame a token stream in the three SWG headers and hand whole
//! blocks to the transport. Inbound: poll until the TPer has computed its
//! response (a zero-length ComPacket means "not ready yet"), then expose
//! the SubPacket body without copying it. [`Tper::invoke`] ties the two
//! together with method-status extraction.
//!
//! Every response view borrows the handle's I/O block; parse and copy what
//! you need before issuing the next call.

use std::{thread, time::Instant};

use sedlink_proto::{
    BLOCK_SIZE, Buffer, MethodStatus, Reader, SwgHeader, Token, UID_ATOM_LEN, Uid, encode_method,
    frame_sizes, pretty,
};
use tracing::{debug, trace};

use crate::{
    error::{Result, TperError},
    tper::{MAX_IO_BLOCK, Tper},
    transport::{PROTO_COMMS, Transport},
};

/// Leading bytes of a session-manager response: the Call token plus the
/// session-manager and method UID atoms.
const SM_RESPONSE_SKIP: usize = 1 + 2 * UID_ATOM_LEN;

/// Trailing bytes after a method's result list: the list's closing bracket,
/// EndOfData, and the five-byte status list.
const RESPONSE_TRAILER: usize = 7;

impl<T: Transport> Tper<T> {
    /// Frame and transmit a token stream.
    ///
    /// Session-manager traffic is sent with zeroed session ids; everything
    /// else passes `use_session_ids = true` to bind the Packet to the open
    /// session.
    ///
    /// # Errors
    ///
    /// - `TperError::PacketTooLarge` if the framed transmission exceeds the
    ///   negotiated `MaxComPacketSize`
    pub fn send_payload(&mut self, payload: &Buffer, use_session_ids: bool) -> Result<()> {
        let sizes = frame_sizes(payload.len());
        if sizes.total > self.max_com_packet_size {
            return Err(TperError::PacketTooLarge {
                size: sizes.total,
                max: self.max_com_packet_size,
            });
        }

        trace!(
            com_id = self.com_id,
            payload = sizes.sub,
            total = sizes.total,
            use_session_ids,
            "sending com packet"
        );

        self.io_block.fill(0);

        let mut header = SwgHeader::default();
        header.com.set_com_id(self.com_id);
        header.com.set_length(sizes.com as u32);
        header.pkt.set_length(sizes.packet as u32);
        header.sub.set_length(sizes.sub as u32);
        if use_session_ids {
            header.pkt.set_session_ids(self.tper_session_id, self.host_session_id);
        }

        self.io_block[..SwgHeader::SIZE].copy_from_slice(&header.to_bytes());
        self.io_block[SwgHeader::SIZE..SwgHeader::SIZE + payload.len()]
            .copy_from_slice(payload.as_slice());

        self.transport.if_send(
            PROTO_COMMS,
            self.com_id,
            &self.io_block[..sizes.total],
            (sizes.total / BLOCK_SIZE) as u8,
        )?;
        Ok(())
    }

    /// Receive one transmission into the I/O block, polling until the TPer
    /// has data. Returns the SubPacket body as (offset, length).
    pub(crate) fn recv_raw(&mut self) -> Result<(usize, usize)> {
        let read_len = (self.max_com_packet_size / BLOCK_SIZE) * BLOCK_SIZE;
        let blocks = (read_len / BLOCK_SIZE) as u8;

        self.io_block.fill(0);
        let started = Instant::now();

        loop {
            self.transport.if_recv(
                PROTO_COMMS,
                self.com_id,
                &mut self.io_block[..read_len],
                blocks,
            )?;

            let header = SwgHeader::parse(&self.io_block)?;
            let com_id = header.com.com_id();
            if com_id != self.com_id {
                return Err(TperError::BadComId { expected: self.com_id, actual: com_id });
            }

            if header.com.length() != 0 {
                let sub_len = header.sub.length() as usize;
                if SwgHeader::SIZE + sub_len > read_len {
                    return Err(TperError::Malformed("sub-packet length exceeds transmission"));
                }
                trace!(com_id, payload = sub_len, "received com packet");
                return Ok((SwgHeader::SIZE, sub_len));
            }

            // Zero-length ComPacket: response not computed yet
            let elapsed = started.elapsed();
            if elapsed >= self.config.recv_timeout {
                return Err(TperError::Timeout { elapsed });
            }
            thread::sleep(self.config.poll_interval);
        }
    }

    /// Receive one transmission and expose its token stream.
    ///
    /// # Errors
    ///
    /// - `TperError::BadComId` if the response belongs to another channel
    /// - `TperError::Timeout` if the TPer never produces data
    pub fn recv_payload(&mut self) -> Result<Reader<'_>> {
        let (offset, len) = self.recv_raw()?;
        Ok(Reader::new(&self.io_block[offset..offset + len]))
    }

    /// Invoke a method on an object and return its result list.
    ///
    /// The returned [`Reader`] positions at the first result value; it
    /// borrows the handle's I/O block, so the data must be parsed before
    /// the next call on this handle.
    ///
    /// # Errors
    ///
    /// - `TperError::MethodFailed` if the drive reports a nonzero method
    ///   status
    /// - `TperError::Malformed` if the response is not a method response
    pub fn invoke(&mut self, obj: Uid, method: Uid, args: Option<&Buffer>) -> Result<Reader<'_>> {
        debug!(obj = %obj, method = %method, "invoking method");

        // Encode into a fresh region: the I/O block may still back a view
        // from the previous call, and send() will overwrite it
        let mut work = Buffer::new(MAX_IO_BLOCK);
        encode_method(&mut work, obj, method, args)?;

        let use_session_ids = obj != Uid::SESSION_MANAGER;
        self.send_payload(&work, use_session_ids)?;

        let (offset, len) = self.recv_raw()?;
        let mut body = &self.io_block[offset..offset + len];

        // Session-manager methods answer with a call to SMUID.SyncSession;
        // skip the Call token and both 9-byte UID atoms
        if body.first() == Some(&Token::Call.to_u8()) {
            if body.len() < SM_RESPONSE_SKIP {
                return Err(TperError::Malformed("truncated session-manager response"));
            }
            body = &body[SM_RESPONSE_SKIP..];
        }

        let status = status_from_trailer(body)?;
        if !status.is_success() {
            debug!(status = %status, "method failed");
            return Err(TperError::MethodFailed(status));
        }
        trace!(response = %pretty(body), "method response");

        if body.len() < 1 + RESPONSE_TRAILER
            || body[0] != Token::StartList.to_u8()
            || body[body.len() - RESPONSE_TRAILER] != Token::EndList.to_u8()
        {
            return Err(TperError::Malformed("method response carries no result list"));
        }

        Ok(Reader::new(&body[1..body.len() - RESPONSE_TRAILER]))
    }
}

/// Extract the method status from the trailing status list.
///
/// A method response ends with `EndOfData [ status, 0, 0 ]`; the three
/// elements are tiny atoms, so the status is the low six bits of the byte
/// after the list opener.
fn status_from_trailer(body: &[u8]) -> Result<MethodStatus> {
    if body.len() < 6 {
        return Err(TperError::Malformed("method response shorter than status trailer"));
    }

    let trailer = &body[body.len() - 6..];
    if trailer[0] != Token::EndOfData.to_u8()
        || trailer[1] != Token::StartList.to_u8()
        || trailer[5] != Token::EndList.to_u8()
    {
        return Err(TperError::Malformed("method status trailer missing"));
    }

    Ok(MethodStatus::from_u8(trailer[2] & 0x3F))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailer_status_extraction() {
        // [ ] EndOfData [ 2, 0, 0 ]
        let body = [0xF0, 0xF1, 0xF9, 0xF0, 0x02, 0x00, 0x00, 0xF1];
        assert_eq!(status_from_trailer(&body).unwrap(), MethodStatus::Obsolete);

        let ok = [0xF0, 0xF1, 0xF9, 0xF0, 0x00, 0x00, 0x00, 0xF1];
        assert!(status_from_trailer(&ok).unwrap().is_success());
    }

    #[test]
    fn trailer_shape_is_checked() {
        assert!(status_from_trailer(&[0xF9, 0xF0, 0x00]).is_err());
        let wrong = [0xF0, 0xF1, 0xF0, 0xF0, 0x00, 0x00, 0x00, 0xF1];
        assert!(matches!(status_from_trailer(&wrong), Err(TperError::Malformed(_))));
    }
}
