//! Fixed-width big-endian reads and writes.
//!
//! Decoding goes through [`Reader`], a forward-only cursor over a byte slice.
//! Every read either consumes exactly the bytes it reports or fails without
//! moving the cursor, so a failed decode never leaves a half-read value that
//! callers could mistake for a complete one.
//!
//! [`Encode`] and [`Decode`] are the two traits every wire type implements.
//! `Decode::from_bytes_at` is the chaining form: it returns the value and the
//! offset just past it.

use super::error::CodecError;

/// Reads a big-endian `u32` at `offset`, returning the value and the new offset.
pub fn read_u32_be(buf: &[u8], offset: usize) -> Result<(u32, usize), CodecError> {
    let mut r = Reader::at(buf, offset);
    let v = r.read_u32()?;
    Ok((v, r.offset()))
}

/// Reads a big-endian `u16` at `offset`, returning the value and the new offset.
pub fn read_u16_be(buf: &[u8], offset: usize) -> Result<(u16, usize), CodecError> {
    let mut r = Reader::at(buf, offset);
    let v = r.read_u16()?;
    Ok((v, r.offset()))
}

/// Appends `v` as four big-endian bytes.
pub fn write_u32_be(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Appends `v` as two big-endian bytes.
pub fn write_u16_be(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Appends `v` as eight big-endian bytes.
pub fn write_u64_be(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Copies `buf[start..end]`, failing instead of panicking on a bad range.
pub fn copy_range(buf: &[u8], start: usize, end: usize) -> Result<Vec<u8>, CodecError> {
    if start > end || end > buf.len() {
        return Err(CodecError::Range {
            start,
            end,
            len: buf.len(),
        });
    }
    Ok(buf[start..end].to_vec())
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Forward-only cursor over an encoded buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Starts reading at `offset` (clamped reads fail with `Truncated`).
    pub fn at(buf: &'a [u8], offset: usize) -> Self {
        Self { buf, offset }
    }

    /// Current position in the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrows the next `n` bytes and advances past them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let available = self.remaining();
        if n > available {
            return Err(CodecError::Truncated {
                offset: self.offset,
                needed: n,
                available,
            });
        }
        let start = self.offset;
        self.offset += n;
        Ok(&self.buf[start..start + n])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, CodecError> {
        Ok(self.take(n)?.to_vec())
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Reads a `u32` element count followed by that many `T`s.
    ///
    /// Capacity is bounded by the bytes left so a hostile count cannot force
    /// a huge allocation before the reads start failing.
    pub fn read_vec<T: Decode>(&mut self) -> Result<Vec<T>, CodecError> {
        let count = self.read_u32()? as usize;
        self.read_n(count, T::decode)
    }

    /// Reads exactly `count` items with `f`.
    pub fn read_n<T, F>(&mut self, count: usize, mut f: F) -> Result<Vec<T>, CodecError>
    where
        F: FnMut(&mut Self) -> Result<T, CodecError>,
    {
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(f(self)?);
        }
        Ok(items)
    }

    /// Reads a `u32` length prefix followed by that many raw bytes.
    pub fn read_len_prefixed(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }
}

// ---------------------------------------------------------------------------
// Encode / Decode
// ---------------------------------------------------------------------------

/// Canonical binary encoding.
pub trait Encode {
    /// Appends the canonical bytes of `self` to `out`.
    fn encode(&self, out: &mut Vec<u8>);

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

/// Canonical binary decoding.
pub trait Decode: Sized {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError>;

    /// Decodes one value starting at `offset`, returning it with the offset
    /// just past its last byte.
    fn from_bytes_at(buf: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let mut r = Reader::at(buf, offset);
        let value = Self::decode(&mut r)?;
        Ok((value, r.offset()))
    }

    /// Decodes a value that must span the whole buffer.
    fn from_bytes(buf: &[u8]) -> Result<Self, CodecError> {
        let (value, consumed) = Self::from_bytes_at(buf, 0)?;
        if consumed != buf.len() {
            return Err(CodecError::TrailingBytes {
                consumed,
                total: buf.len(),
            });
        }
        Ok(value)
    }
}

/// Writes a `u32` count followed by each item's encoding.
pub fn encode_vec<T: Encode>(items: &[T], out: &mut Vec<u8>) {
    write_u32_be(out, items.len() as u32);
    for item in items {
        item.encode(out);
    }
}

/// Writes a `u32` length prefix followed by the raw bytes.
pub fn encode_len_prefixed(bytes: &[u8], out: &mut Vec<u8>) {
    write_u32_be(out, bytes.len() as u32);
    out.extend_from_slice(bytes);
}
