//! Method-call assembly.
//!
//! A call is one Call token, the object and method UIDs, the argument list,
//! and the mandatory trailer: EndOfData followed by the reserved
//! `[0, 0, 0]` call-out status triplet.

use crate::{
    atom::{encode_token, encode_uid, encode_uint},
    buffer::Buffer,
    errors::Result,
    token::Token,
    uid::Uid,
};

/// Encoded size of a UID atom (one short-atom header plus eight bytes).
pub const UID_ATOM_LEN: usize = 9;

/// Append a full method invocation to `dst`.
///
/// `args`, when present, must already hold an encoded argument sequence; it
/// is copied verbatim between the argument list brackets.
///
/// # Errors
///
/// - `SyntaxError::NoSpace` if the call does not fit in `dst`
pub fn encode_method(dst: &mut Buffer, obj: Uid, method: Uid, args: Option<&Buffer>) -> Result<()> {
    encode_token(dst, Token::Call)?;
    encode_uid(dst, obj)?;
    encode_uid(dst, method)?;

    encode_token(dst, Token::StartList)?;
    if let Some(args) = args {
        dst.append_buffer(args)?;
    }
    encode_token(dst, Token::EndList)?;

    // Status trailer: every call reserves a [0, 0, 0] call-out status list
    encode_token(dst, Token::EndOfData)?;
    encode_token(dst, Token::StartList)?;
    for _ in 0..3 {
        encode_uint(dst, 0)?;
    }
    encode_token(dst, Token::EndList)
}
