//! Fuzz target for the token-stream pretty printer.
//!
//! The printer walks arbitrary nested structures; this hunts for panics,
//! unbounded recursion, and non-termination on malformed streams.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sedlink_proto::pretty;

fuzz_target!(|data: &[u8]| {
    let _ = pretty(data);
});
