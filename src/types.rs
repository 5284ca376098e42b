//! Literals over BDD variables.
//!
//! Variables are plain 1-based `u32` indices (0 is reserved for terminals).
//! A [`Lit`] pairs a variable with a polarity.
use std::fmt;
use std::ops::Neg;

/// A literal: a variable together with its polarity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit {
    var: u32,
    positive: bool,
}

impl Lit {
    /// Creates the positive literal of `var`.
    ///
    /// # Panics
    ///
    /// Panics if `var == 0`.
    pub fn pos(var: u32) -> Self {
        assert_ne!(var, 0, "Variable index should not be zero");
        Lit { var, positive: true }
    }

    /// Creates the negative literal of `var`.
    ///
    /// # Panics
    ///
    /// Panics if `var == 0`.
    pub fn neg(var: u32) -> Self {
        assert_ne!(var, 0, "Variable index should not be zero");
        Lit { var, positive: false }
    }

    /// DIMACS representation (`¬x3` is `-3`).
    pub fn to_dimacs(self) -> i32 {
        if self.positive {
            self.var as i32
        } else {
            -(self.var as i32)
        }
    }

    pub fn var(self) -> u32 {
        self.var
    }

    pub fn is_positive(self) -> bool {
        self.positive
    }
}

impl Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Lit {
            var: self.var,
            positive: !self.positive,
        }
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positive {
            write!(f, "x{}", self.var)
        } else {
            write!(f, "~x{}", self.var)
        }
    }
}
