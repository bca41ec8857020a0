//! Hash-algorithm descriptors.
//!
//! Everything that consumes a hash in this crate (OAEP, HMAC, the key
//! fingerprint) does so through a [`HashAlg`] descriptor, so that new
//! algorithms can be added without touching the consumers. The incremental
//! interface is [`digest::DynDigest`].

use digest::DynDigest;

/// Descriptor for one hash algorithm.
pub struct HashAlg {
    /// Human-readable name, as used in MAC text names.
    pub name: &'static str,
    /// Digest length in bytes.
    pub hash_len: usize,
    /// Input block length in bytes.
    pub block_len: usize,
    new: fn() -> Box<dyn DynDigest>,
}

impl HashAlg {
    /// Begin a new hash computation.
    pub fn start(&self) -> Box<dyn DynDigest> {
        (self.new)()
    }

    /// Hash `data` in one call.
    pub fn of(&self, data: &[u8]) -> Box<[u8]> {
        let mut h = self.start();
        h.update(data);
        h.finalize()
    }
}

fn new_md5() -> Box<dyn DynDigest> {
    Box::new(md5::Md5::default())
}

fn new_sha1() -> Box<dyn DynDigest> {
    Box::new(sha1::Sha1::default())
}

fn new_sha256() -> Box<dyn DynDigest> {
    Box::new(sha2::Sha256::default())
}

fn new_sha512() -> Box<dyn DynDigest> {
    Box::new(sha2::Sha512::default())
}

/// MD5, used for key fingerprints and HMAC-MD5.
pub static MD5: HashAlg = HashAlg {
    name: "MD5",
    hash_len: 16,
    block_len: 64,
    new: new_md5,
};

/// SHA-1, used by `ssh-rsa` signatures and `rsa1024-sha1` key exchange.
pub static SHA1: HashAlg = HashAlg {
    name: "SHA-1",
    hash_len: 20,
    block_len: 64,
    new: new_sha1,
};

/// SHA-256, used by `rsa2048-sha256` key exchange.
pub static SHA256: HashAlg = HashAlg {
    name: "SHA-256",
    hash_len: 32,
    block_len: 64,
    new: new_sha256,
};

/// SHA-512, used by the deterministic blinding generator.
pub static SHA512: HashAlg = HashAlg {
    name: "SHA-512",
    hash_len: 64,
    block_len: 128,
    new: new_sha512,
};
