//! Exact scalar coefficients.
//!
//! Scalars are complex numbers with arbitrary-size rational real and imaginary
//! parts. They are exact, so two structurally different coefficient paths that
//! produce the same value compare (and hash) equal, which is what the
//! canonicaliser relies on when it merges coefficients.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// An exact complex rational number `re + im·i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scalar {
    re: BigRational,
    im: BigRational,
}

impl Scalar {
    pub fn new(re: BigRational, im: BigRational) -> Self {
        Self { re, im }
    }

    /// A real integer scalar.
    pub fn integer(value: i64) -> Self {
        Self::real(BigRational::from_integer(BigInt::from(value)))
    }

    /// A real rational scalar `numer / denom`.
    ///
    /// # Panics
    ///
    /// Panics if `denom == 0`.
    pub fn ratio(numer: i64, denom: i64) -> Self {
        assert_ne!(denom, 0, "Denominator should not be zero");
        Self::real(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn real(re: BigRational) -> Self {
        Self {
            re,
            im: BigRational::zero(),
        }
    }

    /// The imaginary unit.
    pub fn i() -> Self {
        Self {
            re: BigRational::zero(),
            im: BigRational::one(),
        }
    }

    pub fn re(&self) -> &BigRational {
        &self.re
    }
    pub fn im(&self) -> &BigRational {
        &self.im
    }

    pub fn is_real(&self) -> bool {
        self.im.is_zero()
    }

    /// Complex conjugate.
    pub fn conj(&self) -> Self {
        Self {
            re: self.re.clone(),
            im: -self.im.clone(),
        }
    }

    /// Multiplicative inverse, or `None` for zero.
    pub fn recip(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        // 1 / (a + bi) = (a - bi) / (a^2 + b^2)
        let norm = &self.re * &self.re + &self.im * &self.im;
        Some(Self {
            re: &self.re / &norm,
            im: -(&self.im / &norm),
        })
    }
}

impl Zero for Scalar {
    fn zero() -> Self {
        Self::integer(0)
    }
    fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }
}

impl One for Scalar {
    fn one() -> Self {
        Self::integer(1)
    }
    fn is_one(&self) -> bool {
        self.re.is_one() && self.im.is_zero()
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::integer(value as i64)
    }
}

impl From<BigRational> for Scalar {
    fn from(value: BigRational) -> Self {
        Self::real(value)
    }
}

impl<'a> Add<&'a Scalar> for &'a Scalar {
    type Output = Scalar;

    fn add(self, rhs: &'a Scalar) -> Scalar {
        Scalar {
            re: &self.re + &rhs.re,
            im: &self.im + &rhs.im,
        }
    }
}

impl Add for Scalar {
    type Output = Scalar;

    fn add(self, rhs: Scalar) -> Scalar {
        &self + &rhs
    }
}

impl<'a> Sub<&'a Scalar> for &'a Scalar {
    type Output = Scalar;

    fn sub(self, rhs: &'a Scalar) -> Scalar {
        Scalar {
            re: &self.re - &rhs.re,
            im: &self.im - &rhs.im,
        }
    }
}

impl Sub for Scalar {
    type Output = Scalar;

    fn sub(self, rhs: Scalar) -> Scalar {
        &self - &rhs
    }
}

impl<'a> Mul<&'a Scalar> for &'a Scalar {
    type Output = Scalar;

    fn mul(self, rhs: &'a Scalar) -> Scalar {
        // (a + bi)(c + di) = (ac - bd) + (ad + bc)i
        Scalar {
            re: &self.re * &rhs.re - &self.im * &rhs.im,
            im: &self.re * &rhs.im + &self.im * &rhs.re,
        }
    }
}

impl Mul for Scalar {
    type Output = Scalar;

    fn mul(self, rhs: Scalar) -> Scalar {
        &self * &rhs
    }
}

impl Neg for Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        Scalar {
            re: -self.re,
            im: -self.im,
        }
    }
}

impl Neg for &Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        -self.clone()
    }
}

fn fmt_imag(im: &BigRational, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if im.is_one() {
        write!(f, "i")
    } else if (-im).is_one() {
        write!(f, "-i")
    } else if im.is_integer() {
        write!(f, "{}i", im)
    } else {
        write!(f, "({})i", im)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im.is_zero() {
            write!(f, "{}", self.re)
        } else if self.re.is_zero() {
            fmt_imag(&self.im, f)
        } else {
            write!(f, "({}", self.re)?;
            if self.im.is_negative() {
                write!(f, " - ")?;
                fmt_imag(&-self.im.clone(), f)?;
            } else {
                write!(f, " + ")?;
                fmt_imag(&self.im, f)?;
            }
            write!(f, ")")
        }
    }
}
