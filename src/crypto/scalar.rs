//! Scalars modulo the order of the FourQ prime-order subgroup.

use zeroize::Zeroize;

/// Group order N, little-endian 64-bit limbs. N < 2^246.
pub const ORDER: [u64; 4] = [
    0x2FB2540EC7768CE7,
    0xDFBD004DFE0F7999,
    0xF05397829CBC14E5,
    0x0029CBC14E5E0A72,
];

/// 2^256 / N < 2^11, so eleven shifted subtractions reduce any 256-bit value.
const REDUCTION_SHIFTS: u32 = 11;

/// Integer in `[0, N)`.
#[derive(Clone, Copy, PartialEq, Eq, Default, Zeroize)]
pub struct Scalar([u64; 4]);

impl Scalar {
    pub const ZERO: Scalar = Scalar([0; 4]);

    /// Interpret 32 little-endian bytes and reduce modulo N.
    pub fn from_bytes_reduced(bytes: &[u8; 32]) -> Scalar {
        let mut limbs = [0u64; 4];
        for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            *limb = u64::from_le_bytes(word);
        }

        for shift in (0..REDUCTION_SHIFTS).rev() {
            let modulus = shl(&ORDER, shift);
            let (diff, borrow) = sub_limbs(&limbs, &modulus);
            limbs = select_limbs(&diff, &limbs, borrow);
        }
        Scalar(limbs)
    }

    /// Reduce the low 32 bytes of a wide hash output.
    pub fn from_wide_prefix(bytes: &[u8; 64]) -> Scalar {
        let mut low = [0u8; 32];
        low.copy_from_slice(&bytes[..32]);
        let scalar = Scalar::from_bytes_reduced(&low);
        low.zeroize();
        scalar
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (chunk, limb) in out.chunks_exact_mut(8).zip(self.0.iter()) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        out
    }

    pub fn bit(&self, index: usize) -> bool {
        (self.0[index / 64] >> (index % 64)) & 1 == 1
    }

    pub fn add(&self, rhs: &Scalar) -> Scalar {
        // Both operands are below 2^246, so the sum cannot overflow 256 bits.
        let (sum, _) = add_limbs(&self.0, &rhs.0);
        Scalar(reduce_once(&sum))
    }

    pub fn sub(&self, rhs: &Scalar) -> Scalar {
        let (diff, borrow) = sub_limbs(&self.0, &rhs.0);
        let (wrapped, _) = add_limbs(&diff, &ORDER);
        Scalar(select_limbs(&diff, &wrapped, borrow))
    }

    /// Product modulo N by double-and-add over every bit of `rhs`.
    pub fn mul(&self, rhs: &Scalar) -> Scalar {
        let mut acc = Scalar::ZERO;
        for i in (0..256).rev() {
            acc = acc.add(&acc);
            let with_term = acc.add(self);
            acc = Scalar(select_limbs(&acc.0, &with_term.0, rhs.bit(i)));
        }
        acc
    }
}

impl std::fmt::Debug for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Scalar(..)")
    }
}

fn add_limbs(a: &[u64; 4], b: &[u64; 4]) -> ([u64; 4], bool) {
    let mut out = [0u64; 4];
    let mut carry = false;
    for i in 0..4 {
        let (s1, c1) = a[i].overflowing_add(b[i]);
        let (s2, c2) = s1.overflowing_add(carry as u64);
        out[i] = s2;
        carry = c1 | c2;
    }
    (out, carry)
}

fn sub_limbs(a: &[u64; 4], b: &[u64; 4]) -> ([u64; 4], bool) {
    let mut out = [0u64; 4];
    let mut borrow = false;
    for i in 0..4 {
        let (d1, b1) = a[i].overflowing_sub(b[i]);
        let (d2, b2) = d1.overflowing_sub(borrow as u64);
        out[i] = d2;
        borrow = b1 | b2;
    }
    (out, borrow)
}

fn shl(a: &[u64; 4], shift: u32) -> [u64; 4] {
    if shift == 0 {
        return *a;
    }
    let mut out = [0u64; 4];
    for i in 0..4 {
        out[i] = a[i] << shift;
        if i > 0 {
            out[i] |= a[i - 1] >> (64 - shift);
        }
    }
    out
}

/// `a` when `choice` is false, `b` when true, without branching.
fn select_limbs(a: &[u64; 4], b: &[u64; 4], choice: bool) -> [u64; 4] {
    let mask = 0u64.wrapping_sub(choice as u64);
    let mut out = [0u64; 4];
    for i in 0..4 {
        out[i] = (a[i] & !mask) | (b[i] & mask);
    }
    out
}

fn reduce_once(a: &[u64; 4]) -> [u64; 4] {
    let (diff, borrow) = sub_limbs(a, &ORDER);
    select_limbs(&diff, a, borrow)
}
