//! Zero-copy parse cursor over a token stream.
//!
//! Responses are parsed in place: a [`Reader`] borrows the bytes it walks,
//! so a response view handed out by the transceiver keeps borrowing the
//! handle's I/O block and the borrow checker forbids further I/O while the
//! view is alive.

use crate::{
    atom::AtomInfo,
    errors::{Result, SyntaxError},
    token::Token,
    uid::Uid,
};

/// Read cursor over encoded SWG data.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Create a cursor at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Number of bytes not yet consumed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True if the cursor reached the end.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Byte at the cursor, without advancing.
    ///
    /// # Errors
    ///
    /// - `SyntaxError::BufferEnd` at end of data
    pub fn peek(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(SyntaxError::BufferEnd { needed: 1, available: 0 })
    }

    /// Advance the cursor by `count` bytes.
    ///
    /// # Errors
    ///
    /// - `SyntaxError::BufferEnd` if fewer than `count` bytes remain
    pub fn skip(&mut self, count: usize) -> Result<()> {
        if count > self.len() {
            return Err(SyntaxError::BufferEnd { needed: count, available: self.len() });
        }
        self.pos += count;
        Ok(())
    }

    /// Consume one byte that must be the given control token.
    ///
    /// Does not advance on mismatch.
    ///
    /// # Errors
    ///
    /// - `SyntaxError::BadSyntax` if the byte differs
    /// - `SyntaxError::BufferEnd` at end of data
    pub fn expect_token(&mut self, token: Token) -> Result<()> {
        let found = self.peek()?;
        if found != token.to_u8() {
            return Err(SyntaxError::BadSyntax { expected: token.to_u8(), found });
        }
        self.pos += 1;
        Ok(())
    }

    /// Classify the atom at the cursor without consuming it.
    ///
    /// # Errors
    ///
    /// - `SyntaxError::BadDatatype` if the cursor is on a control token
    /// - `SyntaxError::BufferEnd` if the atom is incomplete
    pub fn atom_header(&self) -> Result<AtomInfo> {
        AtomInfo::classify(self.remaining())
    }

    /// Decode an unsigned integer atom and advance past it.
    ///
    /// # Errors
    ///
    /// - `SyntaxError::BadDatatype` if the atom is binary, signed, or wider
    ///   than 8 data bytes
    pub fn read_uint(&mut self) -> Result<u64> {
        let info = self.atom_header()?;
        let first = self.peek()?;

        if info.is_binary || info.is_signed {
            return Err(SyntaxError::BadDatatype { found: first });
        }

        if info.header_bytes == 0 {
            self.pos += 1;
            return Ok((first & 0x3F) as u64);
        }

        if info.data_bytes == 0 || info.data_bytes > 8 {
            return Err(SyntaxError::BadDatatype { found: first });
        }

        let data = &self.remaining()[info.header_bytes..info.total_bytes()];
        self.pos += info.total_bytes();
        Ok(data.iter().fold(0u64, |acc, &b| acc << 8 | b as u64))
    }

    /// Decode a signed integer atom and advance past it.
    ///
    /// Tiny atoms sign-extend from bit 5 of the data byte; wider atoms from
    /// the most significant bit of the first data byte.
    ///
    /// # Errors
    ///
    /// - `SyntaxError::BadDatatype` if the atom is binary, unsigned, or
    ///   wider than 8 data bytes
    pub fn read_sint(&mut self) -> Result<i64> {
        let info = self.atom_header()?;
        let first = self.peek()?;

        if info.is_binary || !info.is_signed {
            return Err(SyntaxError::BadDatatype { found: first });
        }

        if info.header_bytes == 0 {
            let data = (first & 0x3F) as i64;
            self.pos += 1;
            return Ok(if first & 0x20 != 0 { data - 0x40 } else { data });
        }

        if info.data_bytes == 0 || info.data_bytes > 8 {
            return Err(SyntaxError::BadDatatype { found: first });
        }

        let data = &self.remaining()[info.header_bytes..info.total_bytes()];
        self.pos += info.total_bytes();

        let mut value: i64 = if data[0] & 0x80 != 0 { -1 } else { 0 };
        for &byte in data {
            value = value << 8 | byte as i64;
        }
        Ok(value)
    }

    /// Decode a binary blob atom and advance past it.
    ///
    /// Returns a zero-copy view of the payload bytes.
    ///
    /// # Errors
    ///
    /// - `SyntaxError::BadDatatype` if the atom is not an unsigned blob
    pub fn read_binary(&mut self) -> Result<&'a [u8]> {
        let info = self.atom_header()?;
        let first = self.peek()?;

        if !info.is_binary || info.is_signed {
            return Err(SyntaxError::BadDatatype { found: first });
        }

        let start = self.pos + info.header_bytes;
        let data = &self.data[start..start + info.data_bytes];
        self.pos += info.total_bytes();
        Ok(data)
    }

    /// Decode a UID stored as the canonical 8-byte blob.
    ///
    /// On shape mismatch the cursor is restored so the caller can retry the
    /// bytes as something else.
    ///
    /// # Errors
    ///
    /// - `SyntaxError::BadDatatype` if the atom is not a blob or not the
    ///   canonical UID shape
    pub fn read_uid(&mut self) -> Result<Uid> {
        let saved = self.pos;
        let first = self.peek()?;
        let bytes = self.read_binary()?;

        if !Uid::is_canonical_bytes(bytes) {
            self.pos = saved;
            return Err(SyntaxError::BadDatatype { found: first });
        }

        Ok(Uid::from_raw(bytes.iter().fold(0u64, |acc, &b| acc << 8 | b as u64)))
    }
}
