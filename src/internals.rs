//! RSA primitive engine: plain modular exponentiation for public
//! operations, and a CRT-accelerated, message-blinded exponentiation for
//! private operations.

use num_bigint::{BigUint, IntoBigUint, ModInverse};
use num_traits::Zero;
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

use crate::encoding::BinarySink;
use crate::key::RsaKey;

/// Raw RSA public operation, `m^e mod n`. All operands are public, so no
/// timing mitigation is applied.
pub(crate) fn rsa_public_op(m: &BigUint, key: &RsaKey) -> BigUint {
    m.modpow(&key.exponent, &key.modulus)
}

/// Compute `base^exp mod n`, provided `n == p * q` with p, q distinct
/// primes and `iqmp` the multiplicative inverse of q mod p. The two
/// half-size exponentiations are much cheaper than one full-size one.
pub(crate) fn crt_modpow(
    base: &BigUint,
    exp: &BigUint,
    n: &BigUint,
    p: &BigUint,
    q: &BigUint,
    iqmp: &BigUint,
) -> BigUint {
    // Reduce the exponent mod phi(p) and phi(q) before exponentiating.
    let pexp = exp % (p - 1u32);
    let qexp = exp % (q - 1u32);

    let mut pres = base.modpow(&pexp, p);
    let qres = base.modpow(&qexp, q);

    // Recombine. iqmp * q is congruent to 1 mod p and 0 mod q, so starting
    // from qres and adding (pres - qres) * (iqmp * q) adjusts the result
    // to be congruent to pres mod p without affecting its value mod q.
    if pres < qres {
        // can't subtract qres from pres without first adding on p
        pres += p;
    }
    let diff = pres - &qres;
    let multiplier = iqmp * q;

    (multiplier * diff + qres) % n
}

/// SHA-512 ratchet behind the deterministic blinding generator.
///
/// Each 64-byte working digest is SHA-512 of a per-sequence seed digest
/// and the operation input; the seed is SHA-512 of a fixed label, the
/// big-endian sequence number and the private exponent. Hashing private
/// key material instead of drawing from a shared entropy pool keeps the
/// operation deterministic.
struct BlindingStream {
    d_mpint: Zeroizing<Vec<u8>>,
    x_mpint: Zeroizing<Vec<u8>>,
    digest: Zeroizing<[u8; 64]>,
    used: usize,
    hashseq: u32,
}

impl BlindingStream {
    fn new(d: &BigUint, x: &BigUint) -> Self {
        let mut d_mpint = Zeroizing::new(Vec::new());
        d_mpint.put_mp_ssh2(d);
        let mut x_mpint = Zeroizing::new(Vec::new());
        x_mpint.put_mp_ssh2(x);
        BlindingStream {
            d_mpint,
            x_mpint,
            digest: Zeroizing::new([0u8; 64]),
            used: 64,
            hashseq: 0,
        }
    }

    fn next_byte(&mut self) -> u8 {
        if self.used >= self.digest.len() {
            let mut h = Sha512::new();
            h.update(b"RSA deterministic blinding");
            h.update(self.hashseq.to_be_bytes());
            h.update(&*self.d_mpint);
            let seed = h.finalize();
            self.hashseq += 1;

            // now hash that digest plus the operation input
            let mut h = Sha512::new();
            h.update(seed);
            h.update(&*self.x_mpint);
            self.digest.copy_from_slice(h.finalize().as_slice());
            self.used = 0;
        }
        let b = self.digest[self.used];
        self.used += 1;
        b
    }
}

/// Draw one blinding candidate with exactly `n.bits()` candidate bit
/// positions, filled from the most significant down, one stream bit per
/// position, least-significant bit of each stream byte first. Any unused
/// bits of the final stream byte are discarded.
fn blinding_candidate(stream: &mut BlindingStream, n: &BigUint) -> BigUint {
    let bits = n.bits();
    let mut buf = Zeroizing::new(vec![0u8; (bits + 7) / 8]);
    let mut byte = 0u8;
    let mut bitsleft = 0u32;
    for bit in (0..bits).rev() {
        if bitsleft == 0 {
            byte = stream.next_byte();
            bitsleft = 8;
        }
        if byte & 1 == 1 {
            let top = buf.len() - 1;
            buf[top - bit / 8] |= 1u8 << (bit % 8);
        }
        byte >>= 1;
        bitsleft -= 1;
    }
    BigUint::from_bytes_be(&buf)
}

/// Derive the blinding pair (r, r^-1 mod n) for a private operation on
/// `x`. Candidates outside (0, n) or without an inverse mod n are
/// rejected and redrawn; the retries leak only information about n,
/// which is public.
fn blinding_pair(x: &BigUint, key: &RsaKey) -> (BigUint, BigUint) {
    let n = &key.modulus;
    let d = key
        .private_exponent
        .as_ref()
        .expect("private operation on a public-only key");
    let mut stream = BlindingStream::new(d, x);
    loop {
        let r = blinding_candidate(&mut stream, n);
        if r.is_zero() || &r >= n {
            continue;
        }
        if let Some(inverse) = r.clone().mod_inverse(n).and_then(IntoBigUint::into_biguint) {
            return (r, inverse);
        }
    }
}

/// RSA private operation, `x^d mod n`, via blinded CRT exponentiation.
///
/// Blinding relies on (xy)^d = (x^d)(y^d) mod n: we invent a pair y, y^d,
/// multiply the input by y, exponentiate, and divide y^d back out, so the
/// timing of the modpow cannot be correlated with the input. The number
/// we draw is used as y^d directly; the public exponent recovers
/// y = (y^d)^e from it far more cheaply than a second private
/// exponentiation would.
pub(crate) fn rsa_privkey_op(input: &BigUint, key: &RsaKey) -> BigUint {
    let n = &key.modulus;
    let d = key
        .private_exponent
        .as_ref()
        .expect("private operation on a public-only key");
    let p = key.p.as_ref().expect("private operation without p");
    let q = key.q.as_ref().expect("private operation without q");
    let iqmp = key.iqmp.as_ref().expect("private operation without iqmp");

    let (random, random_inverse) = blinding_pair(input, key);

    let random_encrypted = crt_modpow(&random, &key.exponent, n, p, q, iqmp);
    let input_blinded = (input * &random_encrypted) % n;
    let ret_blinded = crt_modpow(&input_blinded, d, n, p, q, iqmp);

    (ret_blinded * random_inverse) % n
}

/// Decrypt an SSH-1 session key (or any other integer encrypted to this
/// key's public half).
pub fn rsa_ssh1_decrypt(input: &BigUint, key: &RsaKey) -> BigUint {
    rsa_privkey_op(input, key)
}

/// Left-pad `input` with zero bytes to `padded_len`.
pub(crate) fn left_pad(input: &[u8], padded_len: usize) -> Vec<u8> {
    debug_assert!(input.len() <= padded_len);
    let mut out = vec![0u8; padded_len];
    out[padded_len - input.len()..].copy_from_slice(input);
    out
}

#[cfg(test)]
pub(crate) fn blinding_value(x: &BigUint, key: &RsaKey) -> BigUint {
    blinding_pair(x, key).0
}
