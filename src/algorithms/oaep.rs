//! RSAES-OAEP encryption, as used by the SSH-2 RSA key-exchange methods.
//!
//! Only the encrypting side lives here: in RSA key exchange the client
//! encrypts a secret to the server's transient key, and the server
//! performs the decryption.

use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use crate::algorithms::mgf::mgf1_xor;
use crate::hash::HashAlg;
use crate::internals::{left_pad, rsa_public_op};
use crate::key::RsaKey;

/// The length in bits of the modulus of an RSA key-exchange key, which
/// bounds how much key material can be encrypted to it.
pub fn ssh_rsakex_klen(key: &RsaKey) -> usize {
    key.modulus.bits()
}

/// EME-OAEP encoding with an empty label: leading zero byte, random seed,
/// label hash, zero padding, a 0x01 separator, then the message; DB
/// masked by MGF1 of the seed, then the seed masked by MGF1 of the
/// masked DB.
///
/// Panics unless `0 < input.len() <= k - 2*hash.hash_len - 2`.
pub(crate) fn oaep_encode<R: CryptoRngCore + ?Sized>(
    hash: &HashAlg,
    rng: &mut R,
    input: &[u8],
    k: usize,
) -> Vec<u8> {
    let hlen = hash.hash_len;
    assert!(!input.is_empty());
    assert!(input.len() + 2 * hlen + 2 <= k);

    let mut out = vec![0u8; k];
    rng.fill_bytes(&mut out[1..1 + hlen]);
    out[1 + hlen..1 + 2 * hlen].copy_from_slice(&hash.of(b""));
    out[k - input.len() - 1] = 1;
    out[k - input.len()..].copy_from_slice(input);

    let (seed, db) = out[1..].split_at_mut(hlen);
    let mut mgf = hash.start();
    mgf1_xor(db, mgf.as_mut(), seed);
    mgf1_xor(seed, mgf.as_mut(), db);

    out
}

/// Encrypt key-exchange material with RSAES-OAEP under `hash` and the
/// peer's public key, returning exactly `ceil(bits(n)/8)` bytes.
///
/// Panics if the input is empty or too long for the key; RSA key
/// exchange always sizes its secret to fit.
pub fn ssh_rsakex_encrypt<R: CryptoRngCore + ?Sized>(
    hash: &HashAlg,
    rng: &mut R,
    key: &RsaKey,
    input: &[u8],
) -> Vec<u8> {
    let k = (key.modulus.bits() + 7) / 8;
    let em = oaep_encode(hash, rng, input, k);
    let c = rsa_public_op(&BigUint::from_bytes_be(&em), key);
    left_pad(&c.to_bytes_be(), k)
}
