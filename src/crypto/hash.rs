//! KangarooTwelve helpers.
//!
//! Every hash in the ledger protocol is K12 with an empty customization
//! string; only the output length changes.

use k12::digest::{ExtendableOutput, Update};
use k12::KangarooTwelve;

/// Hash the concatenation of `parts` into `out`, filling it completely.
pub fn k12_into(parts: &[&[u8]], out: &mut [u8]) {
    let mut hasher = KangarooTwelve::default();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize_xof_into(out);
}

/// Hash the concatenation of `parts` into a fixed-size array.
pub fn k12<const N: usize>(parts: &[&[u8]]) -> [u8; N] {
    let mut out = [0u8; N];
    k12_into(parts, &mut out);
    out
}
