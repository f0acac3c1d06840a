//! Arithmetic in GF(p) and GF(p^2) for p = 2^127 - 1.
//!
//! Elements of GF(p) are kept fully reduced in `[0, p)`. GF(p^2) is
//! GF(p)[i] / (i^2 + 1).

use std::ops::{Add, Mul, Neg, Sub};

/// The Mersenne prime 2^127 - 1.
pub const P: u128 = (1u128 << 127) - 1;

/// Element of GF(2^127 - 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fp(u128);

impl Fp {
    pub const ZERO: Fp = Fp(0);
    pub const ONE: Fp = Fp(1);

    /// Build a constant. The value must already be below `p`.
    pub const fn from_canonical(value: u128) -> Fp {
        Fp(value)
    }

    /// Parse 16 little-endian bytes, rejecting values `>= p`.
    pub fn from_bytes(bytes: &[u8; 16]) -> Option<Fp> {
        let value = u128::from_le_bytes(*bytes);
        (value < P).then_some(Fp(value))
    }

    pub fn to_bytes(self) -> [u8; 16] {
        self.0.to_le_bytes()
    }

    /// Reduce any 128-bit value. 2^127 is congruent to 1.
    fn reduce(value: u128) -> Fp {
        let folded = (value & P) + (value >> 127);
        Fp(if folded >= P { folded - P } else { folded })
    }

    pub fn value(self) -> u128 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn bit(self, index: u32) -> bool {
        (self.0 >> index) & 1 == 1
    }

    pub fn square(self) -> Fp {
        self * self
    }

    pub fn pow(self, exponent: u128) -> Fp {
        let mut acc = Fp::ONE;
        for i in (0..128).rev() {
            acc = acc.square();
            if (exponent >> i) & 1 == 1 {
                acc = acc * self;
            }
        }
        acc
    }

    /// Multiplicative inverse; zero maps to zero.
    pub fn invert(self) -> Fp {
        self.pow(P - 2)
    }

    /// Square root, if one exists. p = 3 (mod 4), so a^((p+1)/4) is a candidate.
    pub fn sqrt(self) -> Option<Fp> {
        let candidate = self.pow((P + 1) >> 2);
        (candidate.square() == self).then_some(candidate)
    }

    /// Constant-time select: `a` when `choice` is false, `b` when true.
    pub fn select(a: Fp, b: Fp, choice: bool) -> Fp {
        let mask = 0u128.wrapping_sub(choice as u128);
        Fp((a.0 & !mask) | (b.0 & mask))
    }
}

impl Add for Fp {
    type Output = Fp;

    fn add(self, rhs: Fp) -> Fp {
        // Both operands are below 2^127, so the sum fits in u128.
        Fp::reduce(self.0 + rhs.0)
    }
}

impl Sub for Fp {
    type Output = Fp;

    fn sub(self, rhs: Fp) -> Fp {
        if self.0 >= rhs.0 {
            Fp(self.0 - rhs.0)
        } else {
            Fp(self.0 + P - rhs.0)
        }
    }
}

impl Neg for Fp {
    type Output = Fp;

    fn neg(self) -> Fp {
        if self.0 == 0 {
            self
        } else {
            Fp(P - self.0)
        }
    }
}

impl Mul for Fp {
    type Output = Fp;

    fn mul(self, rhs: Fp) -> Fp {
        let (a0, a1) = (self.0 as u64 as u128, self.0 >> 64);
        let (b0, b1) = (rhs.0 as u64 as u128, rhs.0 >> 64);

        let low = a0 * b0;
        let mid = a0 * b1 + a1 * b0;
        let high = a1 * b1;

        let (lo, carry) = low.overflowing_add(mid << 64);
        let hi = high + (mid >> 64) + carry as u128;

        // product = hi * 2^128 + lo, and 2^128 = 2 (mod p)
        let hi = Fp::reduce(hi);
        Fp::reduce(lo) + hi + hi
    }
}

/// Element of GF(p^2), `a + b*i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fp2 {
    pub a: Fp,
    pub b: Fp,
}

impl Fp2 {
    pub const ZERO: Fp2 = Fp2 { a: Fp::ZERO, b: Fp::ZERO };
    pub const ONE: Fp2 = Fp2 { a: Fp::ONE, b: Fp::ZERO };

    pub const fn new(a: Fp, b: Fp) -> Fp2 {
        Fp2 { a, b }
    }

    pub fn is_zero(self) -> bool {
        self.a.is_zero() && self.b.is_zero()
    }

    pub fn square(self) -> Fp2 {
        self * self
    }

    pub fn double(self) -> Fp2 {
        self + self
    }

    /// Inverse via the norm a^2 + b^2; zero maps to zero.
    pub fn invert(self) -> Fp2 {
        let norm_inv = (self.a.square() + self.b.square()).invert();
        Fp2::new(self.a * norm_inv, -(self.b * norm_inv))
    }

    pub fn sqrt(self) -> Option<Fp2> {
        if self.b.is_zero() {
            // -1 is a non-residue, so exactly one of a, -a has a root.
            return match self.a.sqrt() {
                Some(root) => Some(Fp2::new(root, Fp::ZERO)),
                None => (-self.a).sqrt().map(|root| Fp2::new(Fp::ZERO, root)),
            };
        }

        let norm_root = (self.a.square() + self.b.square()).sqrt()?;
        let half = Fp::from_canonical(2).invert();
        let x0 = ((self.a + norm_root) * half)
            .sqrt()
            .or_else(|| ((self.a - norm_root) * half).sqrt())?;
        let x1 = self.b * (x0 + x0).invert();

        let root = Fp2::new(x0, x1);
        (root.square() == self).then_some(root)
    }

    pub fn select(a: Fp2, b: Fp2, choice: bool) -> Fp2 {
        Fp2::new(Fp::select(a.a, b.a, choice), Fp::select(a.b, b.b, choice))
    }
}

impl Add for Fp2 {
    type Output = Fp2;

    fn add(self, rhs: Fp2) -> Fp2 {
        Fp2::new(self.a + rhs.a, self.b + rhs.b)
    }
}

impl Sub for Fp2 {
    type Output = Fp2;

    fn sub(self, rhs: Fp2) -> Fp2 {
        Fp2::new(self.a - rhs.a, self.b - rhs.b)
    }
}

impl Neg for Fp2 {
    type Output = Fp2;

    fn neg(self) -> Fp2 {
        Fp2::new(-self.a, -self.b)
    }
}

impl Mul for Fp2 {
    type Output = Fp2;

    fn mul(self, rhs: Fp2) -> Fp2 {
        Fp2::new(
            self.a * rhs.a - self.b * rhs.b,
            self.a * rhs.b + self.b * rhs.a,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(v: u128) -> Fp {
        Fp::from_canonical(v)
    }

    #[test]
    fn test_reduction_wraps_at_p() {
        assert_eq!(fp(P - 1) + fp(1), Fp::ZERO);
        assert_eq!(fp(P - 1) + fp(5), fp(4));
        assert_eq!(fp(3) - fp(5), fp(P - 2));
        assert_eq!(-fp(0), Fp::ZERO);
    }

    #[test]
    fn test_mul_matches_small_values() {
        assert_eq!(fp(12345) * fp(67890), fp(12345 * 67890));
        // (p - 1)^2 = 1
        assert_eq!(fp(P - 1) * fp(P - 1), Fp::ONE);
        // 2^126 * 2 = 2^127 = 1
        assert_eq!(fp(1 << 126) * fp(2), Fp::ONE);
    }

    #[test]
    fn test_invert_and_sqrt() {
        let x = fp(0x1234_5678_9abc_def0_1122_3344_5566_7788);
        assert_eq!(x * x.invert(), Fp::ONE);

        let sq = x.square();
        let root = sq.sqrt().unwrap();
        assert!(root == x || root == -x);

        // -1 is not a square when p = 3 mod 4
        assert!((-Fp::ONE).sqrt().is_none());
    }

    #[test]
    fn test_fp2_inverse_and_sqrt() {
        let z = Fp2::new(fp(987_654_321), fp(P - 42));
        assert_eq!(z * z.invert(), Fp2::ONE);

        let sq = z.square();
        let root = sq.sqrt().unwrap();
        assert!(root == z || root == -z);

        // i^2 = -1
        let i = Fp2::new(Fp::ZERO, Fp::ONE);
        assert_eq!(i.square(), -Fp2::ONE);
        assert_eq!((-Fp2::ONE).sqrt().map(|r| r.square()), Some(-Fp2::ONE));
    }

    #[test]
    fn test_select() {
        assert_eq!(Fp::select(fp(1), fp(2), false), fp(1));
        assert_eq!(Fp::select(fp(1), fp(2), true), fp(2));
    }

    #[test]
    fn test_bytes_reject_non_canonical() {
        assert!(Fp::from_bytes(&P.to_le_bytes()).is_none());
        assert_eq!(Fp::from_bytes(&(P - 1).to_le_bytes()), Some(fp(P - 1)));
    }
}
