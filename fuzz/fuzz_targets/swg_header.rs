//! Fuzz target for framing-header parsing.
//!
//! Any 56-byte prefix is a structurally valid header, so the accessors
//! must tolerate every bit pattern without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sedlink_proto::SwgHeader;

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = SwgHeader::parse(data) {
        let _ = header.com.com_id();
        let _ = header.com.length();
        let _ = header.pkt.tper_session_id();
        let _ = header.pkt.host_session_id();
        let _ = header.pkt.length();
        let _ = header.sub.kind();
        let _ = header.sub.length();
        let _ = header.to_bytes();
    }
});
