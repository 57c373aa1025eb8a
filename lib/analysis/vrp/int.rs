//! Extended integers and the interval lattice.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An arbitrary-precision integer extended with two infinities.
///
/// The derived order is total, with `-∞ < z < +∞` for every finite `z`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Z {
    NegInfinity,
    Integer(BigInt),
    PosInfinity,
}

impl Z {
    /// Create a finite `Z`.
    pub fn new<T: Into<BigInt>>(value: T) -> Z {
        Z::Integer(value.into())
    }

    /// The finite zero.
    pub fn zero() -> Z {
        Z::Integer(BigInt::zero())
    }

    /// Returns true unless this is one of the infinities.
    pub fn is_finite(&self) -> bool {
        matches!(self, Z::Integer(_))
    }

    /// The sign of this value: -1, 0 or 1.
    pub fn sign(&self) -> i8 {
        match *self {
            Z::NegInfinity => -1,
            Z::Integer(ref value) => {
                if value.is_negative() {
                    -1
                } else if value.is_zero() {
                    0
                } else {
                    1
                }
            }
            Z::PosInfinity => 1,
        }
    }

    /// Negation; the infinities swap sign.
    pub fn neg(&self) -> Z {
        match *self {
            Z::NegInfinity => Z::PosInfinity,
            Z::Integer(ref value) => Z::Integer(-value),
            Z::PosInfinity => Z::NegInfinity,
        }
    }

    /// Saturating addition. `None` iff the operands are infinities of
    /// opposite sign; the interval layer maps that case to the unknown
    /// interval.
    pub fn checked_add(&self, other: &Z) -> Option<Z> {
        match (self, other) {
            (Z::NegInfinity, Z::PosInfinity) | (Z::PosInfinity, Z::NegInfinity) => None,
            (Z::NegInfinity, _) | (_, Z::NegInfinity) => Some(Z::NegInfinity),
            (Z::PosInfinity, _) | (_, Z::PosInfinity) => Some(Z::PosInfinity),
            (Z::Integer(a), Z::Integer(b)) => Some(Z::Integer(a + b)),
        }
    }

    /// Saturating subtraction, `self - other`.
    pub fn checked_sub(&self, other: &Z) -> Option<Z> {
        self.checked_add(&other.neg())
    }

    /// Multiplication. An infinite operand resolves by the sign of the
    /// product, with `∞ × 0 = 0`.
    pub fn mul(&self, other: &Z) -> Z {
        if let (Z::Integer(a), Z::Integer(b)) = (self, other) {
            return Z::Integer(a * b);
        }
        match self.sign() * other.sign() {
            0 => Z::zero(),
            sign if sign < 0 => Z::NegInfinity,
            _ => Z::PosInfinity,
        }
    }
}

impl From<i64> for Z {
    fn from(value: i64) -> Z {
        Z::Integer(BigInt::from(value))
    }
}

impl From<BigInt> for Z {
    fn from(value: BigInt) -> Z {
        Z::Integer(value)
    }
}

impl fmt::Display for Z {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Z::NegInfinity => write!(f, "-∞"),
            Z::Integer(ref value) => value.fmt(f),
            Z::PosInfinity => write!(f, "+∞"),
        }
    }
}

/// A closed interval over `Z`, or the distinguished unknown interval `⊥`.
///
/// Every known interval satisfies `lower <= upper`; `new` collapses an
/// empty interval to the unknown interval.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Interval {
    known: bool,
    lower: Z,
    upper: Z,
}

impl Interval {
    /// The unknown interval.
    pub fn unknown() -> Interval {
        Interval {
            known: false,
            lower: Z::zero(),
            upper: Z::zero(),
        }
    }

    /// A known interval `[lower, upper]`.
    pub fn new(lower: Z, upper: Z) -> Interval {
        if lower > upper {
            return Interval::unknown();
        }
        Interval {
            known: true,
            lower,
            upper,
        }
    }

    /// The singleton interval `[value, value]`.
    pub fn singleton(value: Z) -> Interval {
        Interval::new(value.clone(), value)
    }

    /// Returns false only for the unknown interval.
    pub fn is_known(&self) -> bool {
        self.known
    }

    /// The lower bound. Only meaningful on a known interval.
    pub fn lower(&self) -> &Z {
        &self.lower
    }

    /// The upper bound. Only meaningful on a known interval.
    pub fn upper(&self) -> &Z {
        &self.upper
    }

    /// The union of two intervals; the unknown interval is the identity.
    pub fn union(&self, other: &Interval) -> Interval {
        if !self.known {
            return other.clone();
        }
        if !other.known {
            return self.clone();
        }
        Interval::new(
            self.lower.clone().min(other.lower.clone()),
            self.upper.clone().max(other.upper.clone()),
        )
    }

    /// The intersection of two intervals; unknown if either operand is
    /// unknown or the intersection is empty.
    pub fn intersection(&self, other: &Interval) -> Interval {
        if !self.known || !other.known {
            return Interval::unknown();
        }
        Interval::new(
            self.lower.clone().max(other.lower.clone()),
            self.upper.clone().min(other.upper.clone()),
        )
    }

    /// Interval addition.
    pub fn add(&self, other: &Interval) -> Interval {
        if !self.known || !other.known {
            return Interval::unknown();
        }
        match (
            self.lower.checked_add(&other.lower),
            self.upper.checked_add(&other.upper),
        ) {
            (Some(lower), Some(upper)) => Interval::new(lower, upper),
            _ => Interval::unknown(),
        }
    }

    /// Interval subtraction.
    pub fn sub(&self, other: &Interval) -> Interval {
        if !self.known || !other.known {
            return Interval::unknown();
        }
        match (
            self.lower.checked_sub(&other.upper),
            self.upper.checked_sub(&other.lower),
        ) {
            (Some(lower), Some(upper)) => Interval::new(lower, upper),
            _ => Interval::unknown(),
        }
    }

    /// Interval multiplication: the envelope of the four bound products.
    pub fn mul(&self, other: &Interval) -> Interval {
        if !self.known || !other.known {
            return Interval::unknown();
        }
        let products = [
            self.lower.mul(&other.lower),
            self.lower.mul(&other.upper),
            self.upper.mul(&other.lower),
            self.upper.mul(&other.upper),
        ];
        let lower = products.iter().min().unwrap().clone();
        let upper = products.iter().max().unwrap().clone();
        Interval::new(lower, upper)
    }
}

impl Default for Interval {
    fn default() -> Interval {
        Interval::unknown()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.known {
            write!(f, "[{}, {}]", self.lower, self.upper)
        } else {
            write!(f, "⊥")
        }
    }
}

/// The sorted multiset of integer literals appearing in a function, used as
/// widening targets.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct JumpSet {
    constants: Vec<Z>,
}

impl JumpSet {
    /// Build a jump-set from the collected literals. The sort is stable and
    /// duplicates are kept.
    pub fn new(mut constants: Vec<Z>) -> JumpSet {
        constants.sort();
        JumpSet { constants }
    }

    /// The greatest element strictly below `z`, or `-∞` if there is none.
    pub fn greatest_below(&self, z: &Z) -> Z {
        let position = self.constants.partition_point(|constant| constant < z);
        if position == 0 {
            Z::NegInfinity
        } else {
            self.constants[position - 1].clone()
        }
    }

    /// The least element strictly above `z`, or `+∞` if there is none.
    pub fn least_above(&self, z: &Z) -> Z {
        let position = self.constants.partition_point(|constant| constant <= z);
        if position == self.constants.len() {
            Z::PosInfinity
        } else {
            self.constants[position].clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order() {
        assert!(Z::NegInfinity < Z::new(-1000));
        assert!(Z::new(-1000) < Z::new(0));
        assert!(Z::new(0) < Z::new(1000));
        assert!(Z::new(1000) < Z::PosInfinity);
        assert!(Z::NegInfinity < Z::PosInfinity);
    }

    #[test]
    fn test_add_saturates() {
        assert_eq!(
            Z::PosInfinity.checked_add(&Z::new(5)),
            Some(Z::PosInfinity)
        );
        assert_eq!(
            Z::new(5).checked_add(&Z::NegInfinity),
            Some(Z::NegInfinity)
        );
        assert_eq!(Z::new(2).checked_add(&Z::new(3)), Some(Z::new(5)));
        // infinities of opposite sign have no sum
        assert_eq!(Z::PosInfinity.checked_add(&Z::NegInfinity), None);
        assert_eq!(Z::NegInfinity.checked_add(&Z::PosInfinity), None);
    }

    #[test]
    fn test_mul_signs() {
        assert_eq!(Z::PosInfinity.mul(&Z::new(-2)), Z::NegInfinity);
        assert_eq!(Z::NegInfinity.mul(&Z::new(-2)), Z::PosInfinity);
        assert_eq!(Z::PosInfinity.mul(&Z::new(0)), Z::zero());
        assert_eq!(Z::NegInfinity.mul(&Z::NegInfinity), Z::PosInfinity);
        assert_eq!(Z::new(3).mul(&Z::new(-4)), Z::new(-12));
    }

    #[test]
    fn test_union() {
        let a = Interval::new(Z::new(0), Z::new(5));
        let b = Interval::new(Z::new(3), Z::new(10));
        assert_eq!(a.union(&b), Interval::new(Z::new(0), Z::new(10)));

        // the unknown interval is the identity
        assert_eq!(a.union(&Interval::unknown()), a);
        assert_eq!(Interval::unknown().union(&a), a);
        assert!(!Interval::unknown().union(&Interval::unknown()).is_known());
    }

    #[test]
    fn test_intersection() {
        let a = Interval::new(Z::new(0), Z::new(5));
        let b = Interval::new(Z::new(3), Z::PosInfinity);
        assert_eq!(a.intersection(&b), Interval::new(Z::new(3), Z::new(5)));

        // disjoint intervals intersect to unknown
        let c = Interval::new(Z::new(10), Z::new(20));
        assert!(!a.intersection(&c).is_known());
        assert!(!a.intersection(&Interval::unknown()).is_known());
    }

    #[test]
    fn test_arithmetic() {
        let a = Interval::new(Z::new(1), Z::new(2));
        let b = Interval::new(Z::new(10), Z::PosInfinity);
        assert_eq!(a.add(&b), Interval::new(Z::new(11), Z::PosInfinity));
        assert_eq!(a.sub(&b), Interval::new(Z::NegInfinity, Z::new(-8)));
        assert_eq!(
            a.mul(&Interval::new(Z::new(-3), Z::new(4))),
            Interval::new(Z::new(-6), Z::new(8))
        );
        assert!(!a.add(&Interval::unknown()).is_known());
    }

    #[test]
    fn test_mul_with_infinite_bound() {
        let a = Interval::new(Z::new(1), Z::PosInfinity);
        let two = Interval::singleton(Z::new(2));
        assert_eq!(a.mul(&two), Interval::new(Z::new(2), Z::PosInfinity));
    }

    #[test]
    fn test_empty_interval_collapses() {
        assert!(!Interval::new(Z::new(5), Z::new(3)).is_known());
        assert!(Interval::new(Z::new(3), Z::new(3)).is_known());
    }

    #[test]
    fn test_jump_set() {
        let jump_set = JumpSet::new(vec![Z::new(10), Z::new(0), Z::new(1), Z::new(10)]);

        assert_eq!(jump_set.greatest_below(&Z::new(10)), Z::new(1));
        assert_eq!(jump_set.greatest_below(&Z::new(0)), Z::NegInfinity);
        assert_eq!(jump_set.least_above(&Z::new(1)), Z::new(10));
        assert_eq!(jump_set.least_above(&Z::new(10)), Z::PosInfinity);
        assert_eq!(jump_set.least_above(&Z::new(-5)), Z::new(0));

        let empty = JumpSet::new(Vec::new());
        assert_eq!(empty.greatest_below(&Z::new(0)), Z::NegInfinity);
        assert_eq!(empty.least_above(&Z::new(0)), Z::PosInfinity);
    }
}
