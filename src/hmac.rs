//! HMAC (RFC 2104) in a general form that can wrap any hash descriptor,
//! plus the descriptor table of SSH-2 MAC variants.
//!
//! Two of the variants are deliberately wrong: ancient peers derive and
//! truncate their HMAC-SHA1 keys incorrectly, and interoperating with
//! them requires reproducing the mistake. The bug-compatible descriptors
//! exist for exactly that, and must stay available alongside the correct
//! ones.

use digest::DynDigest;
use zeroize::Zeroizing;

use crate::hash::{self, HashAlg};

const PAD_OUTER: u8 = 0x5c;
const PAD_INNER: u8 = 0x36;

/// Descriptor for one MAC variant.
pub struct MacAlg {
    /// Name on the wire.
    pub name: &'static str,
    /// OpenSSH encrypt-then-MAC alias, where one exists.
    pub etm_name: Option<&'static str>,
    /// The underlying hash.
    pub hash: &'static HashAlg,
    /// Output length in bytes; the full digest is truncated to this.
    pub mac_len: usize,
    /// Length of the key the SSH-2 transport derives for this MAC.
    pub key_len: usize,
    suffix: &'static str,
    bug_compatible: bool,
}

/// HMAC-MD5.
pub static HMAC_MD5: MacAlg = MacAlg {
    name: "hmac-md5",
    etm_name: Some("hmac-md5-etm@openssh.com"),
    hash: &hash::MD5,
    mac_len: 16,
    key_len: 16,
    suffix: "",
    bug_compatible: false,
};

/// HMAC-SHA-1.
pub static HMAC_SHA1: MacAlg = MacAlg {
    name: "hmac-sha1",
    etm_name: Some("hmac-sha1-etm@openssh.com"),
    hash: &hash::SHA1,
    mac_len: 20,
    key_len: 20,
    suffix: "",
    bug_compatible: false,
};

/// HMAC-SHA-1 truncated to 96 bits.
pub static HMAC_SHA1_96: MacAlg = MacAlg {
    name: "hmac-sha1-96",
    etm_name: Some("hmac-sha1-96-etm@openssh.com"),
    hash: &hash::SHA1,
    mac_len: 12,
    key_len: 20,
    suffix: "-96",
    bug_compatible: false,
};

/// HMAC-SHA-256.
pub static HMAC_SHA256: MacAlg = MacAlg {
    name: "hmac-sha2-256",
    etm_name: Some("hmac-sha2-256-etm@openssh.com"),
    hash: &hash::SHA256,
    mac_len: 32,
    key_len: 32,
    suffix: "",
    bug_compatible: false,
};

/// HMAC-SHA-1 with the 16-byte keying quirk of old peers.
pub static HMAC_SHA1_BUGGY: MacAlg = MacAlg {
    name: "hmac-sha1",
    etm_name: None,
    hash: &hash::SHA1,
    mac_len: 16,
    key_len: 16,
    suffix: " (bug-compatible)",
    bug_compatible: true,
};

/// HMAC-SHA-1-96 with the 16-byte keying quirk of old peers.
pub static HMAC_SHA1_96_BUGGY: MacAlg = MacAlg {
    name: "hmac-sha1-96",
    etm_name: None,
    hash: &hash::SHA1,
    mac_len: 12,
    key_len: 16,
    suffix: "-96 (bug-compatible)",
    bug_compatible: true,
};

/// An HMAC computation context.
///
/// After [`set_key`](Hmac::set_key), the context holds two long-lived
/// hash states pre-seeded with the padded key, so per-message cost is two
/// state clones rather than two key absorptions.
pub struct Hmac {
    alg: &'static MacAlg,
    outer: Option<Box<dyn DynDigest>>,
    inner: Option<Box<dyn DynDigest>>,
    live: Option<Box<dyn DynDigest>>,
    digest: Zeroizing<Vec<u8>>,
    text_name: String,
}

impl Hmac {
    /// Create an unkeyed context for the given variant.
    pub fn new(alg: &'static MacAlg) -> Self {
        Hmac {
            alg,
            outer: None,
            inner: None,
            live: None,
            digest: Zeroizing::new(vec![0u8; alg.hash.hash_len]),
            text_name: format!("HMAC-{}{}", alg.hash.name, alg.suffix),
        }
    }

    /// Create a context and key it in one step.
    pub fn with_key(alg: &'static MacAlg, key: &[u8]) -> Self {
        let mut ctx = Hmac::new(alg);
        ctx.set_key(key);
        ctx
    }

    /// The variant this context computes.
    pub fn algorithm(&self) -> &'static MacAlg {
        self.alg
    }

    /// Human-readable name, e.g. `HMAC-SHA-1-96 (bug-compatible)`.
    pub fn text_name(&self) -> &str {
        &self.text_name
    }

    /// (Re)key the context, discarding any message in progress.
    pub fn set_key(&mut self, key: &[u8]) {
        let halg = self.alg.hash;

        // RFC 2104 section 2: a key longer than the block length of the
        // underlying hash is replaced by its hash. The bug-compatible
        // variants keep only the first key_len bytes of that hash.
        let reduced: Option<Zeroizing<Vec<u8>>> = if key.len() > halg.block_len {
            let mut hashed = Zeroizing::new(halg.of(key).into_vec());
            if self.alg.bug_compatible {
                hashed.truncate(self.alg.key_len);
            }
            Some(hashed)
        } else {
            None
        };
        let kp: &[u8] = match &reduced {
            Some(hashed) => hashed,
            None => key,
        };

        let mut block = Zeroizing::new(vec![0u8; halg.block_len]);

        let mut outer = halg.start();
        for (i, b) in block.iter_mut().enumerate() {
            *b = PAD_OUTER ^ kp.get(i).copied().unwrap_or(0);
        }
        outer.update(&block);

        let mut inner = halg.start();
        for (i, b) in block.iter_mut().enumerate() {
            *b = PAD_INNER ^ kp.get(i).copied().unwrap_or(0);
        }
        inner.update(&block);

        self.outer = Some(outer);
        self.inner = Some(inner);
        self.live = None;
    }

    /// Begin a new message by cloning the keyed inner state.
    ///
    /// Panics if no key has been set.
    pub fn start(&mut self) {
        let inner = self.inner.as_ref().expect("hmac used before set_key");
        self.live = Some(inner.box_clone());
    }

    /// Absorb message bytes.
    ///
    /// Panics unless a message has been started.
    pub fn update(&mut self, data: &[u8]) {
        self.live
            .as_mut()
            .expect("hmac absorb without start")
            .update(data);
    }

    /// Finish the message and return the (possibly truncated) MAC.
    ///
    /// Panics unless a message has been started.
    pub fn finalize(&mut self) -> Vec<u8> {
        let live = self.live.take().expect("hmac finalize without start");
        self.digest.copy_from_slice(&live.finalize());

        let mut outer = self
            .outer
            .as_ref()
            .expect("hmac used before set_key")
            .box_clone();
        outer.update(&self.digest);
        self.digest.copy_from_slice(&outer.finalize());

        let out = self.digest[..self.alg.mac_len].to_vec();
        self.digest.iter_mut().for_each(|b| *b = 0);
        out
    }

    /// MAC a complete message in one call.
    pub fn mac(&mut self, data: &[u8]) -> Vec<u8> {
        self.start();
        self.update(data);
        self.finalize()
    }
}
