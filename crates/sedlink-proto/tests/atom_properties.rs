//! Property-based tests for the binary syntax codec.
//!
//! These verify the codec laws for ALL values, not just the boundary table:
//! round-trips are identity, and every integer is emitted in its minimum
//! encoding.

use proptest::prelude::*;
use sedlink_proto::{AtomInfo, Buffer, Reader, encode_bytes, encode_sint, encode_uint};

/// Smallest number of data bytes that can carry `value` as an unsigned atom.
fn min_uint_bytes(value: u64) -> usize {
    (8 - value.leading_zeros() as usize / 8).max(1)
}

/// Smallest number of data bytes that can carry `value` as a signed atom.
fn min_sint_bytes(value: i64) -> usize {
    for bytes in 1..8 {
        let bits = 8 * bytes - 1;
        if value >= -(1i64 << bits) && value < (1i64 << bits) {
            return bytes;
        }
    }
    8
}

proptest! {
    #[test]
    fn uint_round_trip(value in any::<u64>()) {
        let mut buf = Buffer::new(16);
        encode_uint(&mut buf, value).unwrap();

        let mut reader = Reader::new(buf.as_slice());
        prop_assert_eq!(reader.read_uint().unwrap(), value);
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn sint_round_trip(value in any::<i64>()) {
        let mut buf = Buffer::new(16);
        encode_sint(&mut buf, value).unwrap();

        let mut reader = Reader::new(buf.as_slice());
        prop_assert_eq!(reader.read_sint().unwrap(), value);
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn binary_round_trip(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        let mut buf = Buffer::new(8192);
        encode_bytes(&mut buf, &data).unwrap();

        let mut reader = Reader::new(buf.as_slice());
        prop_assert_eq!(reader.read_binary().unwrap(), &data[..]);
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn uint_encoding_is_minimal(value in any::<u64>()) {
        let mut buf = Buffer::new(16);
        encode_uint(&mut buf, value).unwrap();

        // Tiny atoms are one byte; larger values get a one-byte short-atom
        // header plus exactly the bytes the value needs
        let expected = if value < 0x40 { 1 } else { 1 + min_uint_bytes(value) };
        prop_assert_eq!(buf.len(), expected);
    }

    #[test]
    fn sint_encoding_is_minimal(value in any::<i64>()) {
        let mut buf = Buffer::new(16);
        encode_sint(&mut buf, value).unwrap();

        let expected = if (-0x20..0x20).contains(&value) { 1 } else { 1 + min_sint_bytes(value) };
        prop_assert_eq!(buf.len(), expected);
    }

    #[test]
    fn atom_header_accounts_for_every_byte(data in prop::collection::vec(any::<u8>(), 0..2049)) {
        let mut buf = Buffer::new(4096);
        encode_bytes(&mut buf, &data).unwrap();

        let info = AtomInfo::classify(buf.as_slice()).unwrap();
        prop_assert_eq!(info.data_bytes, data.len());
        prop_assert_eq!(info.total_bytes(), buf.len());
        prop_assert!(info.is_binary);
    }

    #[test]
    fn trims_expose_the_middle_of_the_view(
        data in prop::collection::vec(any::<u8>(), 1..256),
        cuts in (0usize..128, 0usize..128),
    ) {
        let (left, right) = cuts;
        prop_assume!(left + right <= data.len());

        let mut buf = Buffer::new(data.len());
        buf.append(&data).unwrap();
        buf.trim_left(left).unwrap();
        buf.trim_right(right).unwrap();

        prop_assert_eq!(buf.as_slice(), &data[left..data.len() - right]);
    }
}
