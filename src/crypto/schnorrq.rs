//! SchnorrQ signatures over FourQ with KangarooTwelve as the hash.
//!
//! ```text
//! k = K12(sub_seed, 64)              private key a = k[0..32]
//! r = K12(k[32..64] || digest, 64)   R = r * G
//! h = K12(R || public_key || digest, 64)
//! s = r - h * a (mod N)              signature = R || s
//! ```
//!
//! Only the low 32 bytes of each 64-byte hash are reduced into scalars,
//! which is what the ledger's verifier does.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::crypto::curve::Point;
use crate::crypto::hash::k12;
use crate::crypto::scalar::Scalar;

pub const SIGNATURE_LEN: usize = 64;

/// Public key for a 32-byte private key.
pub fn public_key_from_private(private_key: &[u8; 32]) -> [u8; 32] {
    let a = Zeroizing::new(Scalar::from_bytes_reduced(private_key));
    Point::generator().mul(&a).encode()
}

/// Sign a 32-byte digest. Deterministic: the nonce is derived from the
/// sub-seed and the digest.
pub fn sign(sub_seed: &[u8; 32], public_key: &[u8; 32], digest: &[u8; 32]) -> [u8; SIGNATURE_LEN] {
    let k: Zeroizing<[u8; 64]> = Zeroizing::new(k12(&[sub_seed.as_slice()]));
    let r_wide: Zeroizing<[u8; 64]> = Zeroizing::new(k12(&[&k[32..], digest]));
    let r = Zeroizing::new(Scalar::from_wide_prefix(&r_wide));

    let big_r = Point::generator().mul(&r).encode();
    let h_wide: [u8; 64] = k12(&[big_r.as_slice(), public_key, digest]);
    let h = Scalar::from_wide_prefix(&h_wide);

    let mut a_bytes = Zeroizing::new([0u8; 32]);
    a_bytes.copy_from_slice(&k[..32]);
    let a = Zeroizing::new(Scalar::from_bytes_reduced(&a_bytes));

    let s = r.sub(&h.mul(&a));

    let mut signature = [0u8; SIGNATURE_LEN];
    signature[..32].copy_from_slice(&big_r);
    signature[32..].copy_from_slice(&s.to_bytes());
    signature
}

/// Verify `signature` over `digest` for `public_key`.
pub fn verify(public_key: &[u8; 32], digest: &[u8; 32], signature: &[u8; SIGNATURE_LEN]) -> bool {
    // Same bound checks the ledger applies before any curve work.
    if public_key[15] & 0x80 != 0
        || signature[15] & 0x80 != 0
        || signature[62] & 0xc0 != 0
        || signature[63] != 0
    {
        return false;
    }

    let Some(a) = Point::decode(public_key) else {
        return false;
    };

    let mut big_r = [0u8; 32];
    big_r.copy_from_slice(&signature[..32]);
    let mut s_bytes = [0u8; 32];
    s_bytes.copy_from_slice(&signature[32..]);

    let h_wide: [u8; 64] = k12(&[big_r.as_slice(), public_key, digest]);
    let h = Scalar::from_wide_prefix(&h_wide);
    let s = Scalar::from_bytes_reduced(&s_bytes);

    let expected = Point::double_mul(&s, &h, &a).encode();
    expected[..].ct_eq(&big_r[..]).into()
}
