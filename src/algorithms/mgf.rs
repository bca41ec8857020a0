//! Mask generation function used by OAEP padding.

use digest::DynDigest;

/// MGF1: XOR a pseudorandom stream into `out`, derived by hashing the
/// seed concatenated with a big-endian 32-bit block counter.
pub(crate) fn mgf1_xor(out: &mut [u8], digest: &mut dyn DynDigest, seed: &[u8]) {
    let mut counter: u32 = 0;
    let mut i = 0;

    while i < out.len() {
        digest.update(seed);
        digest.update(&counter.to_be_bytes());
        let block = digest.finalize_reset();
        for &b in block.iter() {
            if i >= out.len() {
                break;
            }
            out[i] ^= b;
            i += 1;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash;

    #[test]
    fn xor_twice_is_identity() {
        let mut buf = vec![0xa5u8; 100];
        let orig = buf.clone();
        let mut d = hash::SHA1.start();
        mgf1_xor(&mut buf, d.as_mut(), b"seed");
        assert_ne!(buf, orig);
        mgf1_xor(&mut buf, d.as_mut(), b"seed");
        assert_eq!(buf, orig);
    }

    #[test]
    fn first_block_is_hash_of_seed_and_counter() {
        let mut buf = vec![0u8; 20];
        let mut d = hash::SHA1.start();
        mgf1_xor(&mut buf, d.as_mut(), b"seed");
        let expected = hash::SHA1.of(&[b"seed" as &[u8], &[0, 0, 0, 0]].concat());
        assert_eq!(buf.as_slice(), expected.as_ref());
    }
}
