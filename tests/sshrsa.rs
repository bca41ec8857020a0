//! End-to-end tests over fixed keys: wire formats, signatures, SSH-1
//! session-key encryption and RSA key exchange.

use digest::DynDigest;
use hex_literal::hex;
use num_bigint::BigUint;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

use ssh_rsa_core::{
    hash, rsa_ssh1_decrypt, rsa_ssh1_encrypt, rsa_ssh1_read_public, ssh_rsakex_encrypt,
    ssh_rsakex_klen, BinarySink, Error, KeyAlgorithm, RsaKey, RsaSsh1Order, SshRsa, RSA1024_SHA1,
    RSA2048_SHA256,
};

const N_1024: &str = "e4f68f1e47b8d1dfae93906e15aad518129eaa462fc9bb55329484f0618fcafeb3c95c8c135e452058c631c0110513f8137dbef3c9b0d1382a918e267fe81b7713492fb813d58bc8a495101a1772658ffbd510c0dcb13ff7838786514589e427eb702a3d2ff0bf2757889eff9bda47ce883d9ea3f88d3229f97931b9af09269f";
const D_1024: &str = "50ee29c65d39a1cd7bcaa30996550cff764d69086809d952930f5632157a1b198e79056269d22f82f07e15c5bafe5d81997a200dd1e3d3001463e0a8111bfce09dcf781725c4ea82a8289b4c90dc3cd3fcb97283c4435cf9832b03a9ec2dbcbe193161e9ca5117189ab1c311e8033a1011abc66a117a8c4a47b1322732031451";
const P_1024: &str = "f9afa64760083c7dad1dd1408b87cfcbf5d46d8127762b7b658141e73ede6f125ab59d10b4a20569e443e6031233f1e03deadc7d1d2e1a2e089934a93d71d059";
const Q_1024: &str = "eac0c22e5d235cab616eb2a9fb09b28d2e778e78671eaa350e8936d8133fee34eb0e37f4d6290f039dca0bdcdd3a68c50fb88164ccc1492712e2992b24380fb7";
const IQMP_1024: &str = "848713c1673c1def66d8503675b849e2ae9c4f23c186965cc035cd5c1d77528076d39e56b5b4d06082d308f930e8344bcba0ac704af37a22949adb151eb25d34";

const N_2048: &str = "d397b84d98a4c26138ed1b695a8106ead91d553bf06041b62d3fdc50a041e222b8f4529689c1b82c5e71554f5dd69fa2f4b6158cf0dbeb57811a0fc327e1f28e74fe74d3bc166c1eabdc1b8b57b934ca8be5b00b4f29975bcc99acaf415b59bb28a6782bb41a2c3c2976b3c18dbadef62f00c6bb226640095096c0cc60d22fe7ef987d75c6a81b10d96bf292028af110dc7cc1bbc43d22adab379a0cd5d8078cc780ff5cd6209dea34c922cf784f7717e428d75b5aec8ff30e5f0141510766e2e0ab8d473c84e8710b2b98227c3db095337ad3452f19e2b9bfbccdd8148abf6776fa552775e6e75956e45229ae5a9c46949bab1e622f0e48f56524a84ed3483b";

/// The signature blob over ASCII "abc" under the 1024-bit key: the
/// string "ssh-rsa" followed by the 128-byte signature integer.
const SIG_ABC: [u8; 143] = hex!(
    "000000077373682d727361"
    "00000080"
    "9aec57105e797f292b641277a0ea2cbbdb9bdde88aedf77fafc54a1f602305d0"
    "0d3253fb8f618b12fcf5345c3c9034f8d76eff47459aad0d05436584423ca457"
    "c58d6cc3ecbb8082590ae1425cbda1e81abb41d3d258888ec3589269e4513734"
    "52285b8c3c53af3377d376a68096c0daa36fefdcd7a6b795ae55c425cf78a425"
);

fn from_hex(s: &str) -> BigUint {
    BigUint::parse_bytes(s.as_bytes(), 16).unwrap()
}

fn rsa1024() -> RsaKey {
    let modulus = from_hex(N_1024);
    RsaKey {
        bits: 1024,
        bytes: 128,
        modulus,
        exponent: BigUint::from(65537u32),
        private_exponent: Some(from_hex(D_1024)),
        p: Some(from_hex(P_1024)),
        q: Some(from_hex(Q_1024)),
        iqmp: Some(from_hex(IQMP_1024)),
        comment: None,
    }
}

fn rsa2048_public() -> RsaKey {
    let modulus = from_hex(N_2048);
    RsaKey {
        bits: 2048,
        bytes: 256,
        modulus,
        exponent: BigUint::from(65537u32),
        private_exponent: None,
        p: None,
        q: None,
        iqmp: None,
        comment: None,
    }
}

#[test]
fn verify_known_signature() {
    let key = rsa1024();
    assert!(key.verify_signature(&SIG_ABC, b"abc").is_ok());

    let mut mutated = SIG_ABC;
    mutated[142] ^= 0x01;
    assert_eq!(
        key.verify_signature(&mutated, b"abc").err(),
        Some(Error::Verification)
    );
    assert_eq!(
        key.verify_signature(&SIG_ABC, b"abd").err(),
        Some(Error::Verification)
    );
}

#[test]
fn signing_is_deterministic_and_matches() {
    let key = rsa1024();
    let mut sig = Vec::new();
    key.sign(b"abc", &mut sig);
    assert_eq!(sig[..], SIG_ABC[..]);

    let mut again = Vec::new();
    key.sign(b"abc", &mut again);
    assert_eq!(sig, again);
}

#[test]
fn ssh1_blob_and_session_key() {
    let key = rsa1024();

    // round-trip the public blob in protocol order
    let mut blob = Vec::new();
    key.ssh1_public_blob(&mut blob, RsaSsh1Order::ModulusFirst);
    let parsed = rsa_ssh1_read_public(&blob, RsaSsh1Order::ModulusFirst).unwrap();
    assert_eq!(parsed.key.modulus, key.modulus);
    assert_eq!(parsed.key.exponent, key.exponent);
    assert_eq!(parsed.key.bytes, 128);

    // encrypt a 32-byte session key to it and decrypt with the private
    // operation
    let session_key = [0x3cu8; 32];
    let mut rng = ChaCha8Rng::from_seed([1; 32]);
    let ciphertext = rsa_ssh1_encrypt(&mut rng, &session_key, &key).unwrap();
    assert_eq!(ciphertext.len(), 128);

    let m = rsa_ssh1_decrypt(&BigUint::from_bytes_be(&ciphertext), &key);
    let em = m.to_bytes_be(); // the leading zero byte is dropped
    assert_eq!(em[0], 2);
    let sep = 1 + em[1..].iter().position(|&b| b == 0).unwrap();
    assert_eq!(&em[sep + 1..], &session_key[..]);
}

#[test]
fn fingerprint_and_format() {
    let mut key = rsa1024();
    key.comment = Some("test-key".into());
    assert_eq!(
        key.fingerprint(),
        "1024 13:da:c9:e7:5e:84:57:75:ae:a5:e9:da:ea:4c:c7:32 test-key"
    );
    assert_eq!(key.format(), format!("0x10001,0x{}", N_1024));
}

#[test]
fn rsa_kex_encrypt_sha256() {
    let key = rsa2048_public();
    assert_eq!(ssh_rsakex_klen(&key), 2048);

    let mut rng = ChaCha8Rng::from_seed([2; 32]);
    let out = ssh_rsakex_encrypt(RSA2048_SHA256.hash, &mut rng, &key, &[0x42; 16]);
    assert_eq!(out.len(), 256);
    assert!(BigUint::from_bytes_be(&out) < key.modulus);
}

#[test]
fn rsa_kex_encrypt_sha1() {
    let key = rsa1024();
    let mut rng = ChaCha8Rng::from_seed([3; 32]);
    let out = ssh_rsakex_encrypt(RSA1024_SHA1.hash, &mut rng, &key, &[0x42; 16]);
    assert_eq!(out.len(), 128);
    assert!(BigUint::from_bytes_be(&out) < key.modulus);
}

#[test]
fn key_algorithm_surface() {
    let key = rsa1024();
    let mut public = Vec::new();
    SshRsa::public_blob(&key, &mut public);

    // blob starts with the length-prefixed algorithm name
    assert_eq!(&public[..11], &hex!("000000077373682d727361")[..]);
    assert_eq!(SshRsa::public_bits(&public).unwrap(), 1024);

    let imported = SshRsa::new_public(&public).unwrap();
    assert!(imported.private_exponent.is_none());
    assert!(imported.verify_signature(&SIG_ABC, b"abc").is_ok());

    let mut openssh = Vec::new();
    SshRsa::openssh_blob(&key, &mut openssh);
    let mut reader = ssh_rsa_core::SshReader::new(&openssh);
    let restored = SshRsa::from_openssh(&mut reader).unwrap();
    assert_eq!(restored.p, key.p);

    // a hash over the blob via the digest sink matches a one-shot hash
    let mut sha = hash::SHA256.start();
    let mut sink = ssh_rsa_core::DigestSink(&mut *sha);
    sink.put_data(&public);
    assert_eq!(sha.finalize(), hash::SHA256.of(&public));
}
