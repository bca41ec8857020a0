//! PKCS#1 v1.5 paddings as used by SSH: the SSH-1 public-key encryption
//! layout and the SHA-1 DigestInfo encoding behind `ssh-rsa` signatures.

use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use crate::errors::{Error, Result};
use crate::internals::{left_pad, rsa_public_op};
use crate::key::RsaKey;

/// The ASN.1/DER prefix that sits between the string of FF bytes and the
/// SHA-1 hash in a decoded signature:
///
/// ```text
/// 00           -- ends the FFs; not part of the ASN.1 itself
/// 30 21        -- SEQUENCE, length 0x21
///    30 09     -- sub-SEQUENCE, length 9
///       06 05 2B 0E 03 02 1A   -- OID 1.3.14.3.2.26 (id-sha1)
///       05 00  -- NULL
///    04 14     -- OCTET STRING, 0x14 bytes of hash follow
/// ```
pub(crate) const ASN1_SHA1_PREFIX: [u8; 16] = [
    0x00, 0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2B, 0x0E, 0x03, 0x02, 0x1A, 0x05, 0x00, 0x04, 0x14,
];

/// Build the `k`-byte RSASSA-PKCS1-v1_5 encoding of a SHA-1 digest:
/// `01 FF .. FF <prefix> <hash>`. The caller prepends the leading zero
/// byte implicitly by choosing `k` one less than the modulus length.
///
/// Panics if `k` has no room for at least one FF byte.
pub(crate) fn pkcs1v15_sha1_encode(hash: &[u8], k: usize) -> Vec<u8> {
    assert_eq!(hash.len(), 20);
    assert!(k >= hash.len() + ASN1_SHA1_PREFIX.len() + 1);

    let mut em = vec![0xff; k];
    em[0] = 1;
    em[k - 36..k - 20].copy_from_slice(&ASN1_SHA1_PREFIX);
    em[k - 20..].copy_from_slice(hash);
    em
}

/// Fills the provided slice with random values, which are guaranteed
/// to not be zero.
fn non_zero_random_bytes<R: CryptoRngCore + ?Sized>(rng: &mut R, data: &mut [u8]) {
    rng.fill_bytes(data);
    for el in data.iter_mut() {
        while *el == 0 {
            rng.fill_bytes(core::slice::from_mut(el));
        }
    }
}

/// Encrypt `data` to an SSH-1 peer: PKCS#1 v1.5 type-2 padding
/// (`00 02 <nonzero PS> 00 M`) over `key.bytes` bytes, then the public
/// operation. The result is `key.bytes` long.
pub fn rsa_ssh1_encrypt<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    data: &[u8],
    key: &RsaKey,
) -> Result<Vec<u8>> {
    if key.bytes < data.len() + 4 {
        return Err(Error::MessageTooLong);
    }

    let mut buf = vec![0u8; key.bytes];
    buf[1] = 2;
    let pad_end = key.bytes - data.len() - 1;
    non_zero_random_bytes(rng, &mut buf[2..pad_end]);
    buf[pad_end] = 0;
    buf[key.bytes - data.len()..].copy_from_slice(data);

    let m = BigUint::from_bytes_be(&buf);
    let c = rsa_public_op(&m, key);
    Ok(left_pad(&c.to_bytes_be(), key.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::test_keys::rsa1024;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    #[test]
    fn sign_encoding_layout() {
        let hash = [0xabu8; 20];
        let em = pkcs1v15_sha1_encode(&hash, 127);
        assert_eq!(em.len(), 127);
        assert_eq!(em[0], 1);
        assert!(em[1..127 - 36].iter().all(|&b| b == 0xff));
        assert_eq!(em[127 - 36..127 - 20], ASN1_SHA1_PREFIX);
        assert_eq!(em[127 - 20..], hash);
    }

    #[test]
    fn ssh1_encrypt_structure() {
        let key = rsa1024();
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let msg = b"0123456789abcdef0123456789abcdef"; // a 256-bit session key
        let c = rsa_ssh1_encrypt(&mut rng, msg, &key).unwrap();
        assert_eq!(c.len(), key.bytes);

        // undo the public operation with the private exponent and check
        // the type-2 layout
        let d = key.private_exponent.as_ref().unwrap();
        let m = BigUint::from_bytes_be(&c).modpow(d, &key.modulus);
        let em = left_pad(&m.to_bytes_be(), key.bytes);
        assert_eq!(em[0], 0);
        assert_eq!(em[1], 2);
        let pad_end = key.bytes - msg.len() - 1;
        assert!(em[2..pad_end].iter().all(|&b| b != 0));
        assert_eq!(em[pad_end], 0);
        assert_eq!(&em[pad_end + 1..], &msg[..]);
    }

    #[test]
    fn ssh1_encrypt_key_too_short() {
        let key = rsa1024();
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let msg = vec![1u8; key.bytes - 3];
        assert_eq!(
            rsa_ssh1_encrypt(&mut rng, &msg, &key),
            Err(Error::MessageTooLong)
        );
    }
}
