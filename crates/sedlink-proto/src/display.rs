//! Human-readable rendering of token streams.
//!
//! Diagnostics only; nothing on the wire depends on this. Atoms render as
//! decimals, quoted strings, `high:low` UIDs, or hex blobs; lists, named
//! pairs and calls render recursively:
//!
//! ```text
//! 0:ff.0:ff02 [ 1, 205:1, 1 ] EndOfData [ 0, 0, 0 ]
//! ```

use crate::{errors::Result, reader::Reader, token::Token};

/// Nesting limit; deeper streams are cut off rather than recursed into.
const MAX_DEPTH: usize = 64;

/// Render a token stream for logging.
///
/// Malformed input is rendered up to the offending byte, then `?`.
#[must_use]
pub fn pretty(bytes: &[u8]) -> String {
    let mut reader = Reader::new(bytes);
    let mut out = String::new();

    let mut first = true;
    while !reader.is_empty() {
        if !first {
            out.push(' ');
        }
        first = false;

        if render_value(&mut reader, &mut out, 0).is_err() {
            out.push('?');
            break;
        }
    }
    out
}

fn render_value(reader: &mut Reader<'_>, out: &mut String, depth: usize) -> Result<()> {
    if depth >= MAX_DEPTH {
        reader.skip(reader.len())?;
        out.push_str("...");
        return Ok(());
    }

    let byte = reader.peek()?;
    match Token::from_u8(byte) {
        Some(Token::StartList) => render_list(reader, out, depth),
        Some(Token::StartName) => {
            reader.expect_token(Token::StartName)?;
            render_value(reader, out, depth + 1)?;
            out.push_str(" = ");
            render_value(reader, out, depth + 1)?;
            reader.expect_token(Token::EndName)
        }
        Some(Token::Call) => {
            reader.expect_token(Token::Call)?;
            let obj = reader.read_uid()?;
            let method = reader.read_uid()?;
            out.push_str(&format!("{obj}.{method}"));
            Ok(())
        }
        Some(token) => {
            reader.skip(1)?;
            out.push_str(match token {
                Token::EndOfData => "EndOfData",
                Token::EndSession => "EndSession",
                Token::StartTransaction => "StartTransaction",
                Token::EndTransaction => "EndTransaction",
                // Unmatched closers surface as-is
                _ => "?",
            });
            Ok(())
        }
        None => render_atom(reader, out),
    }
}

fn render_list(reader: &mut Reader<'_>, out: &mut String, depth: usize) -> Result<()> {
    reader.expect_token(Token::StartList)?;
    out.push_str("[ ");

    while reader.peek()? != Token::EndList.to_u8() {
        render_value(reader, out, depth + 1)?;
        if reader.peek()? != Token::EndList.to_u8() {
            out.push_str(", ");
        } else {
            out.push(' ');
        }
    }

    reader.expect_token(Token::EndList)?;
    out.push(']');
    Ok(())
}

fn render_atom(reader: &mut Reader<'_>, out: &mut String) -> Result<()> {
    let info = reader.atom_header()?;

    if !info.is_binary {
        if info.is_signed {
            out.push_str(&reader.read_sint()?.to_string());
        } else {
            out.push_str(&reader.read_uint()?.to_string());
        }
        return Ok(());
    }

    // Canonical 8-byte blobs read best as UIDs; fall back to the raw blob
    if let Ok(uid) = reader.read_uid() {
        out.push_str(&uid.to_string());
        return Ok(());
    }

    let data = reader.read_binary()?;
    if !data.is_empty() && data.iter().all(|&b| (0x20..0x7F).contains(&b)) {
        out.push('\'');
        out.push_str(&String::from_utf8_lossy(data));
        out.push('\'');
    } else {
        out.push('{');
        for (i, byte) in data.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&format!("{byte:02x}"));
        }
        out.push('}');
    }
    Ok(())
}
