//! Identities, seeds, and the key-derivation capability.
//!
//! An identity is the 60-character public form of a 32-byte public key:
//! four 14-letter base-26 fragments (one per little-endian u64 of the key)
//! followed by a 4-letter checksum taken from K12(public key).
//!
//! # Security
//! - Seed phrases and sub-seeds are zeroized on drop
//! - Neither type implements `Display`; `Debug` is redacted

use serde::Deserialize;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{self, curve::Point};

pub const PUBLIC_KEY_LEN: usize = 32;
pub const IDENTITY_LEN: usize = 60;
pub const SEED_LEN: usize = 55;

const FRAGMENT_LETTERS: usize = 14;
const CHECKSUM_LETTERS: usize = 4;
const CHECKSUM_MASK: u32 = 0x3FFFF;

/// Errors raised while decoding identities or deriving keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("identity must be 60 characters, got {0}")]
    InvalidLength(usize),

    #[error("identity contains non-uppercase character at position {0}")]
    InvalidCharacter(usize),

    #[error("identity fragment {0} does not fit in 64 bits")]
    FragmentOverflow(usize),

    #[error("identity checksum mismatch")]
    ChecksumMismatch,

    #[error("seed must be 55 lowercase letters")]
    InvalidSeed,

    #[error("public key is not a valid curve point")]
    InvalidPublicKey,
}

/// 32-byte public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    pub const fn from_bytes(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

/// 64-byte signature: encoded R followed by s.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; crypto::SIGNATURE_LEN]);

impl Signature {
    pub const fn from_bytes(bytes: [u8; crypto::SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; crypto::SIGNATURE_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

/// Secret seed phrase. Deserializable from config; never serialized.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SeedPhrase(String);

impl SeedPhrase {
    pub fn new(seed: impl Into<String>) -> Self {
        Self(seed.into())
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SeedPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SeedPhrase(***)")
    }
}

/// Secret derived from a seed phrase; input to key derivation and signing.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SubSeed([u8; 32]);

impl SubSeed {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn expose_secret(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SubSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SubSeed(***)")
    }
}

/// Key derivation and address encoding used by the pipeline.
///
/// The ledger fixes these algorithms; the trait exists so a different
/// derivation can be substituted without touching the pipeline.
pub trait IdentityScheme: Send + Sync {
    fn decode_identity(&self, identity: &str) -> Result<PublicKey, IdentityError>;

    fn encode_identity(&self, key: &PublicKey) -> String;

    fn derive_sub_seed(&self, seed: &SeedPhrase) -> Result<SubSeed, IdentityError>;

    fn derive_public_key(&self, sub_seed: &SubSeed) -> PublicKey;

    fn sign(
        &self,
        sub_seed: &SubSeed,
        public_key: &PublicKey,
        digest: &[u8; 32],
    ) -> Result<Signature, IdentityError>;

    fn verify(&self, public_key: &PublicKey, digest: &[u8; 32], signature: &Signature) -> bool;

    /// Seed phrase straight to public key.
    fn public_key_from_seed(&self, seed: &SeedPhrase) -> Result<PublicKey, IdentityError> {
        let sub_seed = self.derive_sub_seed(seed)?;
        Ok(self.derive_public_key(&sub_seed))
    }
}

/// The ledger's scheme: K12 derivation, FourQ keys, SchnorrQ signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct QubicScheme;

impl IdentityScheme for QubicScheme {
    fn decode_identity(&self, identity: &str) -> Result<PublicKey, IdentityError> {
        decode_identity(identity)
    }

    fn encode_identity(&self, key: &PublicKey) -> String {
        encode_identity(key.as_bytes(), false)
    }

    fn derive_sub_seed(&self, seed: &SeedPhrase) -> Result<SubSeed, IdentityError> {
        let raw = seed.expose_secret().as_bytes();
        if raw.len() != SEED_LEN || !raw.iter().all(u8::is_ascii_lowercase) {
            return Err(IdentityError::InvalidSeed);
        }

        let letters: Zeroizing<Vec<u8>> = Zeroizing::new(raw.iter().map(|c| c - b'a').collect());
        Ok(SubSeed(crypto::k12(&[letters.as_slice()])))
    }

    fn derive_public_key(&self, sub_seed: &SubSeed) -> PublicKey {
        let private_key: Zeroizing<[u8; 32]> =
            Zeroizing::new(crypto::k12(&[sub_seed.expose_secret().as_slice()]));
        PublicKey(crypto::public_key_from_private(&private_key))
    }

    fn sign(
        &self,
        sub_seed: &SubSeed,
        public_key: &PublicKey,
        digest: &[u8; 32],
    ) -> Result<Signature, IdentityError> {
        if Point::decode(public_key.as_bytes()).is_none() {
            return Err(IdentityError::InvalidPublicKey);
        }
        Ok(Signature(crypto::sign(
            sub_seed.expose_secret(),
            public_key.as_bytes(),
            digest,
        )))
    }

    fn verify(&self, public_key: &PublicKey, digest: &[u8; 32], signature: &Signature) -> bool {
        crypto::verify(public_key.as_bytes(), digest, signature.as_bytes())
    }
}

/// Encode 32 bytes as an identity. Transaction ids use the lowercase form.
pub fn encode_identity(bytes: &[u8; PUBLIC_KEY_LEN], lowercase: bool) -> String {
    let base = if lowercase { b'a' } else { b'A' };
    let mut out = String::with_capacity(IDENTITY_LEN);

    for chunk in bytes.chunks_exact(8) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        let mut fragment = u64::from_le_bytes(word);
        for _ in 0..FRAGMENT_LETTERS {
            out.push((base + (fragment % 26) as u8) as char);
            fragment /= 26;
        }
    }

    let mut check = checksum(bytes);
    for _ in 0..CHECKSUM_LETTERS {
        out.push((base + (check % 26) as u8) as char);
        check /= 26;
    }
    out
}

/// Decode an uppercase identity, verifying its checksum.
pub fn decode_identity(identity: &str) -> Result<PublicKey, IdentityError> {
    let chars = identity.as_bytes();
    if chars.len() != IDENTITY_LEN {
        return Err(IdentityError::InvalidLength(chars.len()));
    }
    if let Some(pos) = chars.iter().position(|c| !c.is_ascii_uppercase()) {
        return Err(IdentityError::InvalidCharacter(pos));
    }

    let mut key = [0u8; PUBLIC_KEY_LEN];
    for (i, chunk) in key.chunks_exact_mut(8).enumerate() {
        let letters = &chars[i * FRAGMENT_LETTERS..(i + 1) * FRAGMENT_LETTERS];
        let fragment = letters
            .iter()
            .rev()
            .try_fold(0u64, |acc, c| {
                acc.checked_mul(26)?.checked_add(u64::from(c - b'A'))
            })
            .ok_or(IdentityError::FragmentOverflow(i))?;
        chunk.copy_from_slice(&fragment.to_le_bytes());
    }

    let expected = encode_identity(&key, false);
    if expected.as_bytes()[56..] != chars[56..] {
        return Err(IdentityError::ChecksumMismatch);
    }
    Ok(PublicKey(key))
}

fn checksum(bytes: &[u8; PUBLIC_KEY_LEN]) -> u32 {
    let digest: [u8; 3] = crypto::k12(&[bytes.as_slice()]);
    (u32::from(digest[0]) | u32::from(digest[1]) << 8 | u32::from(digest[2]) << 16) & CHECKSUM_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    // Seed and identity pair shipped as the reference service's defaults.
    const SEED: &str = "qxotemickgexwfmrdniukihtuhwmvotnuwtyzfrqmchrqoljndjnetv";
    const IDENTITY: &str = "FDVORCTKJZVEBFYUXRVUHMPXLMADKSQKAOXLEXUASDGNXXGSXDIACIGHPYSF";

    #[test]
    fn test_seed_derives_known_identity() {
        let scheme = QubicScheme;
        let key = scheme.public_key_from_seed(&SeedPhrase::new(SEED)).unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "07b93c842c57bcad9497019de5ecee67aeba5e7dc3862d7f0ca0fd68214c63f9"
        );
        assert_eq!(scheme.encode_identity(&key), IDENTITY);
    }

    #[test]
    fn test_sub_seed_known_value() {
        let sub_seed = QubicScheme.derive_sub_seed(&SeedPhrase::new(SEED)).unwrap();
        assert_eq!(
            hex::encode(sub_seed.expose_secret()),
            "c291d3611f5ffa893e9f59ef5431cb2a3fe2077c0bb3a838e9b58ba96d30610a"
        );
    }

    #[test]
    fn test_decode_round_trip() {
        let key = decode_identity(IDENTITY).unwrap();
        assert_eq!(encode_identity(key.as_bytes(), false), IDENTITY);
    }

    #[test]
    fn test_zero_key_identity() {
        assert_eq!(
            encode_identity(&[0u8; 32], false),
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAFXIB"
        );
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert_eq!(decode_identity("ABC"), Err(IdentityError::InvalidLength(3)));

        let lower = IDENTITY.to_lowercase();
        assert_eq!(decode_identity(&lower), Err(IdentityError::InvalidCharacter(0)));

        let mut wrong_checksum = IDENTITY.to_string();
        wrong_checksum.replace_range(59.., "A");
        assert_eq!(decode_identity(&wrong_checksum), Err(IdentityError::ChecksumMismatch));

        // 14 Z's exceed u64::MAX in base 26.
        let overflow = format!("{}{}", "Z".repeat(14), &IDENTITY[14..]);
        assert_eq!(decode_identity(&overflow), Err(IdentityError::FragmentOverflow(0)));
    }

    #[test]
    fn test_seed_validation() {
        let scheme = QubicScheme;
        assert_eq!(
            scheme.derive_sub_seed(&SeedPhrase::new("short")).unwrap_err(),
            IdentityError::InvalidSeed
        );
        let upper = SEED.to_uppercase();
        assert!(scheme.derive_sub_seed(&SeedPhrase::new(upper)).is_err());
    }

    #[test]
    fn test_secrets_are_redacted() {
        let seed = SeedPhrase::new(SEED);
        assert_eq!(format!("{:?}", seed), "SeedPhrase(***)");
        let sub_seed = QubicScheme.derive_sub_seed(&seed).unwrap();
        assert!(!format!("{:?}", sub_seed).contains("c291"));
    }

    #[test]
    fn test_sign_rejects_off_curve_key() {
        let scheme = QubicScheme;
        let sub_seed = scheme.derive_sub_seed(&SeedPhrase::new(SEED)).unwrap();
        let mut bogus = [0xffu8; 32];
        bogus[31] = 0x7f;
        let result = scheme.sign(&sub_seed, &PublicKey::from_bytes(bogus), &[0u8; 32]);
        assert_eq!(result.unwrap_err(), IdentityError::InvalidPublicKey);
    }
}
