//! RSA core for an SSH client: key handling, signing, verification,
//! encryption and key exchange as used by the SSH-1 and SSH-2 protocols.
//!
//! The crate provides:
//!
//! - parsing and serialization of RSA keys in the SSH-1 legacy format, the
//!   SSH-2 `ssh-rsa` format and OpenSSH's private-key field order;
//! - RSASSA-PKCS1-v1_5 signing and verification with SHA-1, as required by
//!   the `ssh-rsa` public-key method;
//! - SSH-1 public-key encryption (PKCS#1 v1.5) and RSAES-OAEP encryption
//!   for the SSH-2 RSA key-exchange methods `rsa1024-sha1` and
//!   `rsa2048-sha256`;
//! - a private-key operation combining CRT-accelerated modular
//!   exponentiation with deterministic message blinding;
//! - a generic HMAC construction (RFC 2104) over any of the supported hash
//!   algorithms, including the bug-compatible truncated variants needed
//!   for interop with older peers.
//!
//! Multi-precision arithmetic comes from [`num_bigint`] and hash
//! primitives from the [`digest`] ecosystem; neither is reimplemented
//! here.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod encoding;
pub mod errors;
pub mod hash;
pub mod hmac;
pub mod key;
pub mod keyalg;

mod algorithms;
mod internals;

pub use crate::algorithms::oaep::{ssh_rsakex_encrypt, ssh_rsakex_klen};
pub use crate::algorithms::pkcs1v15::rsa_ssh1_encrypt;
pub use crate::encoding::{ssh1_read_bignum, BinarySink, DigestSink, SshReader};
pub use crate::errors::{Error, Result};
pub use crate::hmac::{Hmac, MacAlg};
pub use crate::internals::rsa_ssh1_decrypt;
pub use crate::key::{
    rsa_ssh1_public_blob_len, rsa_ssh1_read_public, RsaKey, RsaSsh1Order, Ssh1PublicBlob,
};
pub use crate::keyalg::{
    KexAlgorithm, KeyAlgorithm, SshRsa, RSA1024_SHA1, RSA2048_SHA256, RSA_KEX,
};
