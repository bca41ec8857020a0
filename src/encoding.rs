//! Wire encodings shared by the SSH-1 and SSH-2 key formats: a generic
//! append-only binary sink, the two mpint flavours, and a reader cursor
//! for length-prefixed blobs.
//!
//! An SSH-1 mpint is a 16-bit big-endian bit count followed by the
//! magnitude bytes; an SSH-2 mpint is a 32-bit big-endian byte count
//! followed by the two's-complement magnitude, with a leading zero byte
//! whenever the top bit of a positive value would otherwise be set.

use digest::DynDigest;
use num_bigint::BigUint;

use crate::errors::{Error, Result};

/// An append-only byte sink used by the serialization routines.
///
/// Implemented for `Vec<u8>`; [`DigestSink`] adapts any hash state so
/// that the same routines can feed data straight into a digest.
pub trait BinarySink {
    /// Append raw bytes.
    fn put_data(&mut self, data: &[u8]);

    /// Append a single byte.
    fn put_byte(&mut self, v: u8) {
        self.put_data(&[v]);
    }

    /// Append a big-endian 32-bit unsigned integer.
    fn put_u32(&mut self, v: u32) {
        self.put_data(&v.to_be_bytes());
    }

    /// Append a length-prefixed string.
    fn put_string(&mut self, s: &[u8]) {
        self.put_u32(s.len() as u32);
        self.put_data(s);
    }

    /// Append an SSH-1 mpint.
    fn put_mp_ssh1(&mut self, n: &BigUint) {
        let bits = n.bits();
        self.put_data(&(bits as u16).to_be_bytes());
        if bits > 0 {
            self.put_data(&n.to_bytes_be());
        }
    }

    /// Append an SSH-2 mpint.
    fn put_mp_ssh2(&mut self, n: &BigUint) {
        // bits/8 + 1 gives the magnitude length plus a leading zero byte
        // exactly when the top bit of the top magnitude byte is set.
        let len = n.bits() / 8 + 1;
        self.put_u32(len as u32);
        let mag = n.to_bytes_be();
        if len > mag.len() {
            self.put_byte(0);
        }
        self.put_data(&mag);
    }
}

impl BinarySink for Vec<u8> {
    fn put_data(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }
}

/// Adapter exposing the absorbing end of a hash state as a [`BinarySink`].
pub struct DigestSink<'a>(pub &'a mut dyn DynDigest);

impl BinarySink for DigestSink<'_> {
    fn put_data(&mut self, data: &[u8]) {
        self.0.update(data);
    }
}

/// Read one SSH-1 mpint from the front of `data`, returning the value and
/// the number of bytes consumed.
pub fn ssh1_read_bignum(data: &[u8]) -> Result<(BigUint, usize)> {
    if data.len() < 2 {
        return Err(Error::Truncated);
    }
    let bits = u16::from_be_bytes([data[0], data[1]]) as usize;
    let bytes = (bits + 7) / 8;
    if data.len() < 2 + bytes {
        return Err(Error::Truncated);
    }
    Ok((BigUint::from_bytes_be(&data[2..2 + bytes]), 2 + bytes))
}

/// Cursor over a byte slice for parsing SSH-2 blobs.
pub struct SshReader<'a> {
    data: &'a [u8],
}

impl<'a> SshReader<'a> {
    /// Start reading at the front of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        SshReader { data }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }

    /// Read a big-endian 32-bit unsigned integer.
    pub fn get_u32(&mut self) -> Result<u32> {
        if self.data.len() < 4 {
            return Err(Error::Truncated);
        }
        let v = u32::from_be_bytes([self.data[0], self.data[1], self.data[2], self.data[3]]);
        self.data = &self.data[4..];
        Ok(v)
    }

    /// Read a length-prefixed string. Length words with the top bit set
    /// are rejected rather than treated as huge.
    pub fn get_string(&mut self) -> Result<&'a [u8]> {
        let len = self.get_u32()?;
        if len > i32::MAX as u32 {
            return Err(Error::BadLength);
        }
        let len = len as usize;
        if self.data.len() < len {
            return Err(Error::Truncated);
        }
        let (s, rest) = self.data.split_at(len);
        self.data = rest;
        Ok(s)
    }

    /// Read an SSH-2 mpint as an unsigned value.
    pub fn get_mp_ssh2(&mut self) -> Result<BigUint> {
        Ok(BigUint::from_bytes_be(self.get_string()?))
    }
}
