//! Fuzz target for atom decoding.
//!
//! Feeds arbitrary bytes to every typed decoder to find:
//! - Parser crashes or panics
//! - Integer overflows in length handling
//! - Buffer over-reads on truncated atoms
//!
//! The decoders must NEVER panic; invalid input only returns an error.
//! Every successfully decoded integer must also re-encode cleanly.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sedlink_proto::{AtomInfo, Buffer, Reader, encode_sint, encode_uint};

fuzz_target!(|data: &[u8]| {
    let _ = AtomInfo::classify(data);

    if let Ok(value) = Reader::new(data).read_uint() {
        let mut buf = Buffer::new(16);
        encode_uint(&mut buf, value).unwrap();
    }

    if let Ok(value) = Reader::new(data).read_sint() {
        let mut buf = Buffer::new(16);
        encode_sint(&mut buf, value).unwrap();
    }

    let _ = Reader::new(data).read_binary();
    let _ = Reader::new(data).read_uid();
});
