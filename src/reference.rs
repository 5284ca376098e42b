use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// Signed handle to a BDD node.
///
/// The absolute value is the index of the node in the storage,
/// the sign marks a complemented edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Ref(i32);

impl Ref {
    /// Handle that points nowhere. Index 0 is the storage sentry.
    pub const INVALID: Ref = Ref(0);

    pub const fn positive(index: u32) -> Self {
        Self(index as i32)
    }

    pub const fn is_negated(&self) -> bool {
        self.0 < 0
    }

    pub const fn negate(self) -> Self {
        Self(-self.0)
    }

    /// Return the index of the referenced node.
    pub const fn index(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// Return the reference with the complement bit cleared.
    pub const fn regular(self) -> Self {
        Self(self.0.abs())
    }

    /// Encode the reference as an unsigned literal: `2 * index + negated`.
    pub(crate) const fn as_lit(self) -> u64 {
        ((self.0.unsigned_abs() as u64) << 1) + self.is_negated() as u64
    }
}

impl Default for Ref {
    fn default() -> Self {
        Ref::INVALID
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", if self.is_negated() { "~" } else { "" }, self.index())
    }
}
