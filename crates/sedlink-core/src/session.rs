//! Session manager: Properties negotiation and session lifecycle.
//!
//! The session manager is the virtual SP at UID `0:ff`. Its methods run
//! outside any session (zeroed session ids) and bootstrap everything else:
//! Properties raises the size limits, StartSession/SyncSession opens a
//! session against a real SP, and the EndSession token closes it.
//!
//! # State Machine
//!
//! ```text
//! ┌────────┐  start_session / SyncSession   ┌──────┐
//! │ Closed │───────────────────────────────>│ Open │──┐ invoke
//! └────────┘                                └──────┘<─┘
//!      ^         end_session / forget_session   │
//!      └────────────────────────────────────────┘
//! ```
//!
//! `negotiate_properties` may run in either state and changes only the
//! negotiated limits.

use sedlink_proto::{
    Buffer, ComPacketHeader, Reader, SwgHeader, Token, Uid, encode_str, encode_token, encode_uid,
    encode_uint,
};
use tracing::debug;

use crate::{
    error::{Result, TperError},
    tper::{DEFAULT_DRIVE_MAX_PACKET, DEFAULT_DRIVE_MAX_TOKEN, SessionState, SscKind, Tper},
    transport::Transport,
};

/// Host session id offered in StartSession. Any nonzero value works; the
/// pair (host id, TPer id) names the session from then on.
const FIRST_HOST_SESSION_ID: u32 = 1;

/// Access mode argument of StartSession: read/write.
const SESSION_READ_WRITE: u64 = 1;

/// Key of the HostProperties named argument.
///
/// The SWG core spec and the Enterprise SSC disagree here: Enterprise
/// names the argument with a string, the Opal family with an unsigned
/// integer index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPropertiesKey {
    /// String key, used by Enterprise
    Name(&'static str),
    /// Integer key, used by the Opal family
    Index(u64),
}

impl HostPropertiesKey {
    /// Key for a drive's SSC.
    ///
    /// # Errors
    ///
    /// - `TperError::NoSsc` if the SSC kind is unknown
    pub fn for_ssc(ssc: SscKind) -> Result<Self> {
        match ssc {
            SscKind::Enterprise => Ok(Self::Name("HostProperties")),
            SscKind::Opal => Ok(Self::Index(0)),
            SscKind::Unknown => Err(TperError::NoSsc),
        }
    }

    fn encode(&self, dst: &mut Buffer) -> sedlink_proto::Result<()> {
        match self {
            Self::Name(name) => encode_str(dst, name),
            Self::Index(index) => encode_uint(dst, *index),
        }
    }
}

impl<T: Transport> Tper<T> {
    /// Exchange communication properties with the TPer.
    ///
    /// Advertises the host limits and records the drive's, keeping the
    /// smaller of each pair. Drives that omit a property are taken at the
    /// spec defaults (1024-byte ComPackets, 968-byte tokens). Runs against
    /// the session manager, so no session is required.
    ///
    /// # Errors
    ///
    /// - `TperError::NoSsc` if the drive's SSC kind is unknown
    pub fn negotiate_properties(&mut self) -> Result<()> {
        let key = HostPropertiesKey::for_ssc(self.ssc)?;

        let host_packet = self.io_block.len();
        let host_token = host_packet - SwgHeader::SIZE;

        let mut args = Buffer::new(256);
        encode_token(&mut args, Token::StartName)?;
        key.encode(&mut args)?;
        encode_token(&mut args, Token::StartList)?;
        for (name, value) in [
            ("MaxComPacketSize", host_packet as u64),
            ("MaxPacketSize", (host_packet - ComPacketHeader::SIZE) as u64),
            ("MaxIndTokenSize", host_token as u64),
            ("MaxAggTokenSize", host_token as u64),
        ] {
            encode_token(&mut args, Token::StartName)?;
            encode_str(&mut args, name)?;
            encode_uint(&mut args, value)?;
            encode_token(&mut args, Token::EndName)?;
        }
        encode_token(&mut args, Token::EndList)?;
        encode_token(&mut args, Token::EndName)?;

        let mut drive_packet = DEFAULT_DRIVE_MAX_PACKET as u64;
        let mut drive_token = DEFAULT_DRIVE_MAX_TOKEN as u64;
        {
            let mut response =
                self.invoke(Uid::SESSION_MANAGER, Uid::HOST_PROPERTIES, Some(&args))?;
            scan_properties(&mut response, &mut drive_packet, &mut drive_token);
        }

        self.max_com_packet_size = host_packet.min(drive_packet as usize);
        self.max_token_size = host_token.min(drive_token as usize);

        debug!(
            max_com_packet_size = self.max_com_packet_size,
            max_token_size = self.max_token_size,
            "properties negotiated"
        );
        Ok(())
    }

    /// Open an anonymous read/write session against an SP.
    ///
    /// # Errors
    ///
    /// - `TperError::Malformed` if SyncSession does not echo our host id
    /// - `TperError::MethodFailed` if the SP refuses the session
    pub fn start_session(&mut self, sp: Uid) -> Result<()> {
        let host_id = FIRST_HOST_SESSION_ID;

        let mut args = Buffer::new(64);
        encode_uint(&mut args, host_id as u64)?;
        encode_uid(&mut args, sp)?;
        encode_uint(&mut args, SESSION_READ_WRITE)?;

        let tper_id = {
            let mut response =
                self.invoke(Uid::SESSION_MANAGER, Uid::START_SESSION, Some(&args))?;

            let echoed = response.read_uint()?;
            if echoed != host_id as u64 {
                return Err(TperError::Malformed("SyncSession echoed a different host id"));
            }

            let tper = response.read_uint()?;
            u32::try_from(tper)
                .map_err(|_| TperError::Malformed("TPer session id exceeds 32 bits"))?
        };

        self.host_session_id = host_id;
        self.tper_session_id = tper_id;
        debug!(sp = %sp, host_id, tper_id, "session open");
        Ok(())
    }

    /// Cleanly terminate the current session.
    ///
    /// Succeeds immediately when no session is open. After a completed
    /// exchange the session ids are forgotten unconditionally, even if
    /// the drive's acknowledgement was malformed, the host no longer
    /// considers the session live. A transport failure before the
    /// exchange completes leaves the ids untouched.
    ///
    /// # Errors
    ///
    /// - `TperError::Malformed` if the drive acknowledges with anything
    ///   but a lone EndSession token
    pub fn end_session(&mut self) -> Result<()> {
        if self.session_state() == SessionState::Closed {
            return Ok(());
        }

        let mut payload = Buffer::new(1);
        encode_token(&mut payload, Token::EndSession)?;
        self.send_payload(&payload, true)?;

        let ack = {
            let (offset, len) = self.recv_raw()?;
            let body = &self.io_block[offset..offset + len];
            if body == [Token::EndSession.to_u8()] {
                Ok(())
            } else {
                Err(TperError::Malformed("expected a lone end-of-session token"))
            }
        };

        self.forget_session();
        debug!("session closed");
        ack
    }
}

/// Permissive scan of the HostProperties response.
///
/// Consumes `StartName, key, value, EndName` groups after the opening list
/// bracket and stops quietly on the first structural mismatch; unknown
/// drives report unknown shapes, and the defaults already in place are the
/// correct fallback.
fn scan_properties(response: &mut Reader<'_>, drive_packet: &mut u64, drive_token: &mut u64) {
    if response.expect_token(Token::StartList).is_err() {
        return;
    }

    loop {
        if response.expect_token(Token::StartName).is_err() {
            return;
        }
        let Ok(key) = response.read_binary() else { return };
        let Ok(value) = response.read_uint() else { return };
        if response.expect_token(Token::EndName).is_err() {
            return;
        }

        match key {
            b"MaxComPacketSize" => *drive_packet = value,
            b"MaxIndTokenSize" => *drive_token = value,
            _ => {}
        }
    }
}
