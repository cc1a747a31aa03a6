//! Security-protocol probe and ComID stack reset.

mod common;

use common::ScriptedTransport;
use sedlink_core::{BLOCK_SIZE, PROTO_STACK_RESET, SscKind, Tper, TperError};

const COM_ID: u16 = 0x07FE;

/// Protocol-discovery block listing the given protocols.
fn discovery_block(protocols: &[u8]) -> Vec<u8> {
    let mut block = vec![0u8; BLOCK_SIZE];
    block[6..8].copy_from_slice(&(protocols.len() as u16).to_be_bytes());
    block[8..8 + protocols.len()].copy_from_slice(protocols);
    block
}

/// HANDLE_COMID_REQUEST response block.
fn comid_response(com_id: u16, avail_data: u32, failed: u32) -> Vec<u8> {
    let mut block = vec![0u8; BLOCK_SIZE];
    block[0..2].copy_from_slice(&com_id.to_be_bytes());
    block[4..8].copy_from_slice(&0x02u32.to_be_bytes());
    block[8..12].copy_from_slice(&avail_data.to_be_bytes());
    block[12..16].copy_from_slice(&failed.to_be_bytes());
    block
}

#[test]
fn probe_records_reset_support() {
    let mut transport = ScriptedTransport::new();
    transport.push_response(discovery_block(&[0x00, 0x01, 0x02]));

    let mut tper = Tper::new(transport, SscKind::Opal, COM_ID);
    tper.probe_protocols().unwrap();
    assert!(tper.has_reset());
}

#[test]
fn probe_without_reset_protocol() {
    let mut transport = ScriptedTransport::new();
    transport.push_response(discovery_block(&[0x00, 0x01]));

    let mut tper = Tper::new(transport, SscKind::Opal, COM_ID);
    tper.probe_protocols().unwrap();
    assert!(!tper.has_reset());
}

#[test]
fn probe_requires_tcg_comms() {
    let mut transport = ScriptedTransport::new();
    transport.push_response(discovery_block(&[0x00, 0xEE]));

    let mut tper = Tper::new(transport, SscKind::Opal, COM_ID);
    assert_eq!(tper.probe_protocols().unwrap_err(), TperError::TpmProto);
}

#[test]
fn stack_reset_round_trip() {
    let mut transport = ScriptedTransport::new();
    transport.push_response(comid_response(COM_ID, 4, 0));

    let mut tper = Tper::new(transport, SscKind::Opal, COM_ID);
    tper.stack_reset().unwrap();

    let transport = tper.into_transport();
    let sent = &transport.sent[0];
    assert_eq!(sent.protocol, PROTO_STACK_RESET);
    assert_eq!(sent.com_id, COM_ID);
    assert_eq!(sent.data.len(), BLOCK_SIZE);
    // Request block: ComID, zero extension, request code 0x02
    assert_eq!(&sent.data[..8], [0x07, 0xFE, 0, 0, 0, 0, 0, 0x02]);
}

#[test]
fn stack_reset_failure_is_reported() {
    let mut transport = ScriptedTransport::new();
    transport.push_response(comid_response(COM_ID, 4, 1));

    let mut tper = Tper::new(transport, SscKind::Opal, COM_ID);
    assert_eq!(tper.stack_reset().unwrap_err(), TperError::ComIdResetFailed);

    let mut transport = ScriptedTransport::new();
    transport.push_response(comid_response(COM_ID, 0, 0));

    let mut tper = Tper::new(transport, SscKind::Opal, COM_ID);
    assert_eq!(tper.stack_reset().unwrap_err(), TperError::ComIdResetFailed);
}
