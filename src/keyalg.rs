//! SSH algorithm descriptors: the `ssh-rsa` public-key method and the
//! two RSA key-exchange methods.

use crate::encoding::{BinarySink, SshReader};
use crate::errors::Result;
use crate::hash::{self, HashAlg};
use crate::key::RsaKey;

/// An SSH public-key method: the set of operations the transport and
/// authentication layers need from a key type. New algorithms register by
/// implementing this trait; the core never needs to change.
pub trait KeyAlgorithm {
    /// Algorithm name as it appears on the wire.
    const NAME: &'static str;
    /// Number of mpints in the OpenSSH private key layout.
    const PRIVATE_COMPONENTS: usize;
    /// The concrete key type.
    type Key;

    /// Parse a public blob.
    fn new_public(blob: &[u8]) -> Result<Self::Key>;
    /// Build and verify a private key from the public and private wire
    /// halves.
    fn from_blobs(public: &[u8], private: &[u8]) -> Result<Self::Key>;
    /// Build and verify a private key from OpenSSH's internal layout,
    /// advancing the reader.
    fn from_openssh(reader: &mut SshReader<'_>) -> Result<Self::Key>;
    /// Write the public blob.
    fn public_blob(key: &Self::Key, sink: &mut dyn BinarySink);
    /// Write the private wire half.
    fn private_blob(key: &Self::Key, sink: &mut dyn BinarySink);
    /// Write the key in OpenSSH's internal layout.
    fn openssh_blob(key: &Self::Key, sink: &mut dyn BinarySink);
    /// Human-readable rendering of the public key.
    fn format(key: &Self::Key) -> String;
    /// Bit count of the key in a public blob.
    fn public_bits(blob: &[u8]) -> Result<usize>;
    /// Verify a signature blob over `data`.
    fn verify_signature(key: &Self::Key, signature: &[u8], data: &[u8]) -> Result<()>;
    /// Sign `data`, writing the signature blob to the sink.
    fn sign(key: &Self::Key, data: &[u8], sink: &mut dyn BinarySink);
}

/// The `ssh-rsa` method.
pub struct SshRsa;

impl KeyAlgorithm for SshRsa {
    const NAME: &'static str = "ssh-rsa";
    const PRIVATE_COMPONENTS: usize = 6; // n, e, d, iqmp, p, q
    type Key = RsaKey;

    fn new_public(blob: &[u8]) -> Result<RsaKey> {
        RsaKey::from_public_blob(blob)
    }

    fn from_blobs(public: &[u8], private: &[u8]) -> Result<RsaKey> {
        RsaKey::from_blobs(public, private)
    }

    fn from_openssh(reader: &mut SshReader<'_>) -> Result<RsaKey> {
        RsaKey::from_openssh(reader)
    }

    fn public_blob(key: &RsaKey, sink: &mut dyn BinarySink) {
        key.public_blob(sink);
    }

    fn private_blob(key: &RsaKey, sink: &mut dyn BinarySink) {
        key.private_blob(sink);
    }

    fn openssh_blob(key: &RsaKey, sink: &mut dyn BinarySink) {
        key.openssh_blob(sink);
    }

    fn format(key: &RsaKey) -> String {
        key.format()
    }

    fn public_bits(blob: &[u8]) -> Result<usize> {
        RsaKey::public_bits(blob)
    }

    fn verify_signature(key: &RsaKey, signature: &[u8], data: &[u8]) -> Result<()> {
        key.verify_signature(signature, data)
    }

    fn sign(key: &RsaKey, data: &[u8], sink: &mut dyn BinarySink) {
        key.sign(data, sink);
    }
}

/// An RSA key-exchange method: a wire name plus the hash its OAEP
/// encryption and exchange hash use.
pub struct KexAlgorithm {
    /// Method name as it appears in the kex negotiation.
    pub name: &'static str,
    /// The hash backing OAEP and the exchange hash.
    pub hash: &'static HashAlg,
}

/// `rsa1024-sha1` key exchange.
pub static RSA1024_SHA1: KexAlgorithm = KexAlgorithm {
    name: "rsa1024-sha1",
    hash: &hash::SHA1,
};

/// `rsa2048-sha256` key exchange.
pub static RSA2048_SHA256: KexAlgorithm = KexAlgorithm {
    name: "rsa2048-sha256",
    hash: &hash::SHA256,
};

/// The RSA key-exchange methods, strongest first.
pub static RSA_KEX: [&KexAlgorithm; 2] = [&RSA2048_SHA256, &RSA1024_SHA1];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::test_keys::rsa1024;

    #[test]
    fn descriptor_identity() {
        assert_eq!(SshRsa::NAME, "ssh-rsa");
        assert_eq!(SshRsa::PRIVATE_COMPONENTS, 6);
        assert_eq!(RSA_KEX[0].name, "rsa2048-sha256");
        assert_eq!(RSA_KEX[1].name, "rsa1024-sha1");
        assert_eq!(RSA_KEX[0].hash.hash_len, 32);
        assert_eq!(RSA_KEX[1].hash.hash_len, 20);
    }

    #[test]
    fn trait_round_trip() {
        let key = rsa1024();
        let mut public = Vec::new();
        SshRsa::public_blob(&key, &mut public);
        assert_eq!(SshRsa::public_bits(&public).unwrap(), 1024);

        let mut private = Vec::new();
        SshRsa::private_blob(&key, &mut private);
        let restored = SshRsa::from_blobs(&public, &private).unwrap();

        let mut sig = Vec::new();
        SshRsa::sign(&restored, b"exchange hash", &mut sig);
        let public_half = SshRsa::new_public(&public).unwrap();
        assert!(SshRsa::verify_signature(&public_half, &sig, b"exchange hash").is_ok());
    }
}
