//! The RSA key record and its wire formats.

use md5::Md5;
use num_bigint::{BigUint, IntoBigUint, ModInverse};
use num_traits::One;
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::algorithms::pkcs1v15::pkcs1v15_sha1_encode;
use crate::encoding::{ssh1_read_bignum, BinarySink, DigestSink, SshReader};
use crate::errors::{Error, Result};
use crate::internals::{left_pad, rsa_privkey_op, rsa_public_op};

/// Order of the exponent and modulus mpints in an SSH-1 public blob.
///
/// The SSH-1 protocol and its key file format disagree about which comes
/// first, so the caller has to say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaSsh1Order {
    /// Exponent, then modulus (the key file order).
    ExponentFirst,
    /// Modulus, then exponent (the protocol order).
    ModulusFirst,
}

/// An RSA key, public or private.
///
/// A key is private when `private_exponent` is set; `p`, `q` and `iqmp`
/// are additionally needed for the CRT-accelerated private operation.
/// Imported private keys must pass [`RsaKey::verify`] before use, which
/// also canonicalizes the prime order to p > q.
#[derive(Clone)]
pub struct RsaKey {
    /// The modulus n.
    pub modulus: BigUint,
    /// The public exponent e.
    pub exponent: BigUint,
    /// Nominal bit length, as recorded in the SSH-1 length word. May
    /// exceed the true bit count of the modulus.
    pub bits: u32,
    /// Byte length used for SSH-1 PKCS#1 v1.5 padding: the encoded length
    /// of the modulus mpint minus its two-byte length prefix.
    pub bytes: usize,
    /// The private exponent d.
    pub private_exponent: Option<BigUint>,
    /// The larger prime factor (after verification).
    pub p: Option<BigUint>,
    /// The smaller prime factor (after verification).
    pub q: Option<BigUint>,
    /// The multiplicative inverse of q mod p.
    pub iqmp: Option<BigUint>,
    /// User label; not cryptographically relevant.
    pub comment: Option<String>,
}

impl Zeroize for RsaKey {
    fn zeroize(&mut self) {
        for secret in [
            &mut self.private_exponent,
            &mut self.p,
            &mut self.q,
            &mut self.iqmp,
        ] {
            if let Some(v) = secret {
                v.zeroize();
            }
        }
    }
}

impl Drop for RsaKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Result of parsing an SSH-1 public blob.
pub struct Ssh1PublicBlob<'a> {
    /// The parsed key, public fields only.
    pub key: RsaKey,
    /// Bytes consumed from the input.
    pub consumed: usize,
    /// The raw modulus magnitude bytes within the input, for callers that
    /// hash the key string.
    pub modulus_bytes: &'a [u8],
}

/// Parse an SSH-1 public key: a 32-bit nominal bit count followed by two
/// SSH-1 mpints in the given order.
pub fn rsa_ssh1_read_public(data: &[u8], order: RsaSsh1Order) -> Result<Ssh1PublicBlob<'_>> {
    if data.len() < 4 {
        return Err(Error::Truncated);
    }
    let bits = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);

    let (exponent, modulus, modulus_off, modulus_len, consumed) = match order {
        RsaSsh1Order::ExponentFirst => {
            let (e, elen) = ssh1_read_bignum(&data[4..])?;
            let (m, mlen) = ssh1_read_bignum(&data[4 + elen..])?;
            (e, m, 4 + elen + 2, mlen - 2, 4 + elen + mlen)
        }
        RsaSsh1Order::ModulusFirst => {
            let (m, mlen) = ssh1_read_bignum(&data[4..])?;
            let (e, elen) = ssh1_read_bignum(&data[4 + mlen..])?;
            (e, m, 4 + 2, mlen - 2, 4 + mlen + elen)
        }
    };
    if modulus.bits() == 0 {
        return Err(Error::InvalidKey);
    }

    Ok(Ssh1PublicBlob {
        key: RsaKey {
            modulus,
            exponent,
            bits,
            bytes: modulus_len,
            private_exponent: None,
            p: None,
            q: None,
            iqmp: None,
            comment: None,
        },
        consumed,
        modulus_bytes: &data[modulus_off..modulus_off + modulus_len],
    })
}

/// Measure an SSH-1 public blob (exponent-first order) without building a
/// key.
pub fn rsa_ssh1_public_blob_len(data: &[u8]) -> Result<usize> {
    if data.len() < 4 {
        return Err(Error::Truncated);
    }
    let mut pos = 4; // length word

    let (_, n) = ssh1_read_bignum(&data[pos..])?; // exponent
    pos += n;
    let (_, n) = ssh1_read_bignum(&data[pos..])?; // modulus
    pos += n;

    Ok(pos)
}

impl RsaKey {
    /// Parse an SSH-2 `ssh-rsa` public blob.
    pub fn from_public_blob(blob: &[u8]) -> Result<RsaKey> {
        let mut r = SshReader::new(blob);
        if r.get_string()? != b"ssh-rsa" {
            return Err(Error::AlgorithmMismatch);
        }
        let exponent = r.get_mp_ssh2()?;
        let modulus = r.get_mp_ssh2()?;
        let bits = modulus.bits();
        Ok(RsaKey {
            bits: bits as u32,
            bytes: (bits + 7) / 8,
            modulus,
            exponent,
            private_exponent: None,
            p: None,
            q: None,
            iqmp: None,
            comment: None,
        })
    }

    /// Create a private key from the SSH-2 public and private wire halves.
    /// The key is verified before being returned.
    pub fn from_blobs(public: &[u8], private: &[u8]) -> Result<RsaKey> {
        let mut key = RsaKey::from_public_blob(public)?;
        let mut r = SshReader::new(private);
        key.private_exponent = Some(r.get_mp_ssh2()?);
        key.p = Some(r.get_mp_ssh2()?);
        key.q = Some(r.get_mp_ssh2()?);
        key.iqmp = Some(r.get_mp_ssh2()?);
        if !key.verify() {
            return Err(Error::InvalidKey);
        }
        Ok(key)
    }

    /// Create a private key from OpenSSH's internal field order
    /// (n, e, d, iqmp, p, q), advancing the reader past the key. The key
    /// is verified before being returned.
    pub fn from_openssh(r: &mut SshReader<'_>) -> Result<RsaKey> {
        let modulus = r.get_mp_ssh2()?;
        let exponent = r.get_mp_ssh2()?;
        let private_exponent = Some(r.get_mp_ssh2()?);
        let iqmp = Some(r.get_mp_ssh2()?);
        let p = Some(r.get_mp_ssh2()?);
        let q = Some(r.get_mp_ssh2()?);

        let bits = modulus.bits();
        let mut key = RsaKey {
            bits: bits as u32,
            bytes: (bits + 7) / 8,
            modulus,
            exponent,
            private_exponent,
            p,
            q,
            iqmp,
            comment: None,
        };
        if !key.verify() {
            return Err(Error::InvalidKey);
        }
        Ok(key)
    }

    /// Write the SSH-1 public blob: nominal bit count, then the two
    /// mpints in the given order.
    pub fn ssh1_public_blob(&self, bs: &mut dyn BinarySink, order: RsaSsh1Order) {
        bs.put_u32(self.modulus.bits() as u32);
        match order {
            RsaSsh1Order::ExponentFirst => {
                bs.put_mp_ssh1(&self.exponent);
                bs.put_mp_ssh1(&self.modulus);
            }
            RsaSsh1Order::ModulusFirst => {
                bs.put_mp_ssh1(&self.modulus);
                bs.put_mp_ssh1(&self.exponent);
            }
        }
    }

    /// Read the SSH-1 private half (a single mpint holding d) into this
    /// key, returning the bytes consumed.
    pub fn ssh1_read_private(&mut self, data: &[u8]) -> Result<usize> {
        let (d, consumed) = ssh1_read_bignum(data)?;
        self.private_exponent = Some(d);
        Ok(consumed)
    }

    /// Write the SSH-2 `ssh-rsa` public blob.
    pub fn public_blob(&self, bs: &mut dyn BinarySink) {
        bs.put_string(b"ssh-rsa");
        bs.put_mp_ssh2(&self.exponent);
        bs.put_mp_ssh2(&self.modulus);
    }

    /// Write the SSH-2 private wire half: d, p, q, iqmp.
    ///
    /// Panics on a public-only key.
    pub fn private_blob(&self, bs: &mut dyn BinarySink) {
        bs.put_mp_ssh2(self.d());
        bs.put_mp_ssh2(self.expect_private(&self.p, "p"));
        bs.put_mp_ssh2(self.expect_private(&self.q, "q"));
        bs.put_mp_ssh2(self.expect_private(&self.iqmp, "iqmp"));
    }

    /// Write the key in OpenSSH's internal order: n, e, d, iqmp, p, q.
    ///
    /// Panics on a public-only key.
    pub fn openssh_blob(&self, bs: &mut dyn BinarySink) {
        bs.put_mp_ssh2(&self.modulus);
        bs.put_mp_ssh2(&self.exponent);
        bs.put_mp_ssh2(self.d());
        bs.put_mp_ssh2(self.expect_private(&self.iqmp, "iqmp"));
        bs.put_mp_ssh2(self.expect_private(&self.p, "p"));
        bs.put_mp_ssh2(self.expect_private(&self.q, "q"));
    }

    /// Parse a public blob and report the modulus bit count.
    pub fn public_bits(blob: &[u8]) -> Result<usize> {
        Ok(RsaKey::from_public_blob(blob)?.modulus.bits())
    }

    /// Verify that the public data matches the private data, and the
    /// private data itself: n = pq, e·d unit mod p−1 and q−1, and iqmp
    /// the inverse of q mod p.
    ///
    /// Key blobs exist in the wild with p < q, so rather than rejecting
    /// those this flips the primes round into the canonical p > q order
    /// and regenerates iqmp. Returns false if any check fails; the caller
    /// should discard the key.
    pub fn verify(&mut self) -> bool {
        let (Some(d), Some(p), Some(q), Some(iqmp)) = (
            self.private_exponent.clone(),
            self.p.clone(),
            self.q.clone(),
            self.iqmp.clone(),
        ) else {
            return false;
        };
        let one = BigUint::one();

        // n must equal pq
        if &p * &q != self.modulus {
            return false;
        }

        // e * d must be congruent to 1, modulo (p-1) and modulo (q-1)
        let ed = &self.exponent * &d;
        if &ed % (&p - 1u32) != one || &ed % (&q - 1u32) != one {
            return false;
        }

        let (p, q, iqmp) = if p <= q {
            match p.clone().mod_inverse(&q).and_then(IntoBigUint::into_biguint) {
                Some(inverse) => (q, p, inverse),
                None => return false,
            }
        } else {
            (p, q, iqmp)
        };

        // iqmp * q must be congruent to 1, modulo p
        if (&iqmp * &q) % &p != one {
            return false;
        }

        self.p = Some(p);
        self.q = Some(q);
        self.iqmp = Some(iqmp);
        true
    }

    /// Sign `data` with RSASSA-PKCS1-v1_5 and SHA-1, writing the
    /// signature blob (`ssh-rsa` string, then the signature integer) to
    /// the sink.
    ///
    /// Panics on a public-only key.
    pub fn sign(&self, data: &[u8], bs: &mut dyn BinarySink) {
        let hash = Sha1::digest(data);

        // one less byte than the modulus, so the encoding is strictly
        // below n
        let nbytes = (self.modulus.bits() - 1) / 8;
        let em = pkcs1v15_sha1_encode(hash.as_slice(), nbytes);

        let sig = rsa_privkey_op(&BigUint::from_bytes_be(&em), self);

        bs.put_string(b"ssh-rsa");
        bs.put_string(&sig.to_bytes_be());
    }

    /// Verify an `ssh-rsa` signature blob over `data` against this key's
    /// public half.
    pub fn verify_signature(&self, sig: &[u8], data: &[u8]) -> Result<()> {
        let mut r = SshReader::new(sig);
        if r.get_string()? != b"ssh-rsa" {
            return Err(Error::AlgorithmMismatch);
        }
        let sig = r.get_mp_ssh2()?;

        let out = rsa_public_op(&sig, self);

        let bytes = (self.modulus.bits() + 7) / 8;
        if bytes < 38 {
            return Err(Error::Verification);
        }
        let em = left_pad(&out.to_bytes_be(), bytes);

        // expected layout: zero, then the same encoding signing produces
        let hash = Sha1::digest(data);
        let mut expected = vec![0u8; bytes];
        expected[1..].copy_from_slice(&pkcs1v15_sha1_encode(hash.as_slice(), bytes - 1));

        // accumulate the comparison over the whole buffer rather than
        // stopping at the first mismatch
        if em.ct_eq(&expected).into() {
            Ok(())
        } else {
            Err(Error::Verification)
        }
    }

    /// MD5 fingerprint in the OpenSSH style: the true modulus bit count,
    /// then sixteen colon-separated hex pairs over the SSH-1 mpint
    /// serialization of modulus and exponent, then the comment if any.
    pub fn fingerprint(&self) -> String {
        let mut md5 = Md5::new();
        let mut sink = DigestSink(&mut md5);
        sink.put_mp_ssh1(&self.modulus);
        sink.put_mp_ssh1(&self.exponent);
        let digest = md5.finalize();

        let mut out = format!("{} ", self.modulus.bits());
        for (i, b) in digest.as_slice().iter().enumerate() {
            if i > 0 {
                out.push(':');
            }
            out.push_str(&format!("{:02x}", b));
        }
        if let Some(comment) = &self.comment {
            out.push(' ');
            out.push_str(comment);
        }
        out
    }

    /// Human-readable form of the public key: `0x<e>,0x<n>` with the
    /// minimum number of hex nibbles for each value.
    pub fn format(&self) -> String {
        fn push_hex(out: &mut String, n: &BigUint) {
            const HEX: &[u8; 16] = b"0123456789abcdef";
            let mag = n.to_bytes_be();
            let nibbles = core::cmp::max(1, (n.bits() + 3) / 4);
            for i in (0..nibbles).rev() {
                let byte = if i / 2 < mag.len() {
                    mag[mag.len() - 1 - i / 2]
                } else {
                    0
                };
                out.push(HEX[((byte >> (4 * (i % 2))) & 0xf) as usize] as char);
            }
        }

        let mdlen = (self.modulus.bits() + 15) / 16;
        let exlen = (self.exponent.bits() + 15) / 16;
        let mut out = String::with_capacity(4 * (mdlen + exlen) + 20);
        out.push_str("0x");
        push_hex(&mut out, &self.exponent);
        out.push_str(",0x");
        push_hex(&mut out, &self.modulus);
        out
    }

    fn d(&self) -> &BigUint {
        self.expect_private(&self.private_exponent, "private exponent")
    }

    fn expect_private<'a>(&self, field: &'a Option<BigUint>, name: &str) -> &'a BigUint {
        match field {
            Some(v) => v,
            None => panic!("operation requires the {name} of a private key"),
        }
    }
}
