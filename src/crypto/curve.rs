//! FourQ: the twisted Edwards curve -x^2 + y^2 = 1 + d*x^2*y^2 over GF(p^2).
//!
//! Points are kept in extended coordinates (X : Y : Z : T) with
//! x = X/Z, y = Y/Z, T = XY/Z. `d` is a non-square, so the unified
//! addition law below is complete and also serves as doubling.

use crate::crypto::field::{Fp, Fp2};
use crate::crypto::scalar::Scalar;

/// Encoded point length: y (two 16-byte halves) with the sign of x in the top bit.
pub const ENCODED_LEN: usize = 32;

const D: Fp2 = Fp2::new(
    Fp::from_canonical(0x00000000000000E4_0000000000000142),
    Fp::from_canonical(0x5E472F846657E0FC_B3821488F1FC0C8D),
);

const GENERATOR_X: Fp2 = Fp2::new(
    Fp::from_canonical(0x1A3472237C2FB305_286592AD7B3833AA),
    Fp::from_canonical(0x1E1F553F2878AA9C_96869FB360AC77F6),
);

const GENERATOR_Y: Fp2 = Fp2::new(
    Fp::from_canonical(0x0E3FEE9BA120785A_B924A2462BCBB287),
    Fp::from_canonical(0x6E1C4AF8630E0242_49A7C344844C8B5C),
);

#[derive(Debug, Clone, Copy)]
pub struct Point {
    x: Fp2,
    y: Fp2,
    z: Fp2,
    t: Fp2,
}

impl Point {
    pub const IDENTITY: Point = Point {
        x: Fp2::ZERO,
        y: Fp2::ONE,
        z: Fp2::ONE,
        t: Fp2::ZERO,
    };

    pub fn generator() -> Point {
        Point::from_affine(GENERATOR_X, GENERATOR_Y)
    }

    fn from_affine(x: Fp2, y: Fp2) -> Point {
        Point {
            x,
            y,
            z: Fp2::ONE,
            t: x * y,
        }
    }

    fn to_affine(self) -> (Fp2, Fp2) {
        let z_inv = self.z.invert();
        (self.x * z_inv, self.y * z_inv)
    }

    pub fn add(&self, other: &Point) -> Point {
        let a = (self.y - self.x) * (other.y - other.x);
        let b = (self.y + self.x) * (other.y + other.x);
        let c = self.t * D.double() * other.t;
        let d = self.z.double() * other.z;

        let e = b - a;
        let f = d - c;
        let g = d + c;
        let h = b + a;

        Point {
            x: e * f,
            y: g * h,
            z: f * g,
            t: e * h,
        }
    }

    pub fn double(&self) -> Point {
        self.add(self)
    }

    /// `scalar * self`, touching every bit of the scalar.
    pub fn mul(&self, scalar: &Scalar) -> Point {
        let mut acc = Point::IDENTITY;
        for i in (0..256).rev() {
            acc = acc.double();
            let sum = acc.add(self);
            acc = Point::select(&acc, &sum, scalar.bit(i));
        }
        acc
    }

    /// `a * G + b * other`.
    pub fn double_mul(a: &Scalar, b: &Scalar, other: &Point) -> Point {
        Point::generator().mul(a).add(&other.mul(b))
    }

    fn select(a: &Point, b: &Point, choice: bool) -> Point {
        Point {
            x: Fp2::select(a.x, b.x, choice),
            y: Fp2::select(a.y, b.y, choice),
            z: Fp2::select(a.z, b.z, choice),
            t: Fp2::select(a.t, b.t, choice),
        }
    }

    pub fn is_on_curve(&self) -> bool {
        let (x, y) = self.to_affine();
        let (x2, y2) = (x.square(), y.square());
        y2 - x2 == Fp2::ONE + D * x2 * y2
    }

    pub fn encode(&self) -> [u8; ENCODED_LEN] {
        let (x, y) = self.to_affine();
        let mut out = [0u8; ENCODED_LEN];
        out[..16].copy_from_slice(&y.a.to_bytes());
        out[16..].copy_from_slice(&y.b.to_bytes());
        if x_sign(&x) {
            out[31] |= 0x80;
        }
        out
    }

    /// Recover a point from its encoding. Rejects non-canonical `y`,
    /// `y` values with no matching `x`, and encodings that do not round-trip.
    pub fn decode(bytes: &[u8; ENCODED_LEN]) -> Option<Point> {
        let sign = bytes[31] >> 7 == 1;

        let mut y0 = [0u8; 16];
        let mut y1 = [0u8; 16];
        y0.copy_from_slice(&bytes[..16]);
        y1.copy_from_slice(&bytes[16..]);
        y1[15] &= 0x7f;
        let y = Fp2::new(Fp::from_bytes(&y0)?, Fp::from_bytes(&y1)?);

        let y2 = y.square();
        let u = y2 - Fp2::ONE;
        let v = D * y2 + Fp2::ONE;
        let mut x = (u * v.invert()).sqrt()?;
        if x_sign(&x) != sign {
            x = -x;
        }

        let point = Point::from_affine(x, y);
        (point.encode() == *bytes).then_some(point)
    }
}

/// Sign of x: bit 126 of the real part, or of the imaginary part when the
/// real part is zero.
fn x_sign(x: &Fp2) -> bool {
    if x.a.is_zero() {
        x.b.bit(126)
    } else {
        x.a.bit(126)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(v: u64) -> Scalar {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&v.to_le_bytes());
        Scalar::from_bytes_reduced(&bytes)
    }

    #[test]
    fn test_generator_on_curve() {
        assert!(Point::generator().is_on_curve());
    }

    #[test]
    fn test_order_annihilates_generator() {
        // N * G = O; N reduces to zero, so check (N - 1) * G = -G instead.
        let minus_one = Scalar::ZERO.sub(&scalar(1));
        let neg_g = Point::generator().mul(&minus_one);
        let sum = neg_g.add(&Point::generator());
        assert_eq!(sum.encode(), Point::IDENTITY.encode());
    }

    #[test]
    fn test_scalar_mul_is_repeated_addition() {
        let g = Point::generator();
        let by_add = g.add(&g).add(&g);
        let by_mul = g.mul(&scalar(3));
        assert_eq!(by_add.encode(), by_mul.encode());
        assert_eq!(g.double().add(&g).encode(), by_mul.encode());
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let p = Point::generator().mul(&scalar(0xdead_beef));
        let encoded = p.encode();
        let decoded = Point::decode(&encoded).unwrap();
        assert_eq!(decoded.encode(), encoded);
        assert!(decoded.is_on_curve());
    }

    #[test]
    fn test_decode_rejects_non_canonical_y() {
        let mut bytes = [0xffu8; 32];
        bytes[31] = 0x7f;
        assert!(Point::decode(&bytes).is_none());
    }

    #[test]
    fn test_identity_encoding() {
        let mut expected = [0u8; 32];
        expected[0] = 1;
        assert_eq!(Point::IDENTITY.encode(), expected);
        assert!(Point::decode(&expected).is_some());
    }
}
