//! Propositions: the named Boolean variables automata are built over.
//!
//! A proposition is either a *letter* taken from the formula, or a *fresh*
//! state symbol introduced during translation. Either kind may carry primes,
//! marking next-state copies.

use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Symbol {
    Letter(Rc<str>),
    Fresh(usize),
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Proposition {
    symbol: Symbol,
    primes: u32,
}

impl Proposition {
    pub fn letter(name: &str) -> Self {
        Proposition {
            symbol: Symbol::Letter(name.into()),
            primes: 0,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn primes(&self) -> u32 {
        self.primes
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self.symbol, Symbol::Fresh(_))
    }

    /// Next-state copy. Injective, and never returns `self`.
    pub fn prime(&self) -> Self {
        self.primed(1)
    }

    /// Apply [`prime`][Proposition::prime] `n` times.
    pub fn primed(&self, n: u32) -> Self {
        Proposition {
            symbol: self.symbol.clone(),
            primes: self.primes + n,
        }
    }

    pub fn unprimed(&self) -> Self {
        Proposition {
            symbol: self.symbol.clone(),
            primes: 0,
        }
    }
}

impl From<&str> for Proposition {
    fn from(name: &str) -> Self {
        Proposition::letter(name)
    }
}

impl Display for Proposition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.symbol {
            Symbol::Letter(name) => write!(f, "{}", name)?,
            Symbol::Fresh(id) => write!(f, "_f{}", id)?,
        }
        for _ in 0..self.primes {
            write!(f, "'")?;
        }
        Ok(())
    }
}

/// Source of fresh state propositions.
///
/// One allocator is threaded through a whole translation; every call to
/// [`fresh`][FreshAllocator::fresh] returns a symbol it never returned before.
/// Fresh symbols live in their own namespace and cannot clash with letters.
#[derive(Debug, Default)]
pub struct FreshAllocator {
    next: usize,
}

impl FreshAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> Proposition {
        let id = self.next;
        self.next += 1;
        Proposition {
            symbol: Symbol::Fresh(id),
            primes: 0,
        }
    }

    /// Number of symbols handed out so far.
    pub fn allocated(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prime_is_injective() {
        let p = Proposition::letter("p");
        assert_ne!(p.prime(), p);
        assert_ne!(p.prime(), p.primed(2));
        assert_eq!(p.prime().prime(), p.primed(2));
        assert_eq!(p.primed(3).unprimed(), p);
        assert_eq!(p.primed(3).primes(), 3);
    }

    #[test]
    fn test_fresh_never_repeats() {
        let mut alloc = FreshAllocator::new();
        let a = alloc.fresh();
        let b = alloc.fresh();
        assert_ne!(a, b);
        assert!(a.is_fresh());
        assert_eq!(alloc.allocated(), 2);
        assert!(!Proposition::letter("_f0").is_fresh());
        assert_ne!(a, Proposition::letter("_f0"));
    }

    #[test]
    fn test_display() {
        let mut alloc = FreshAllocator::new();
        let v = alloc.fresh();
        assert_eq!(v.to_string(), "_f0");
        assert_eq!(v.primed(2).to_string(), "_f0''");
        assert_eq!(Proposition::from("req").prime().to_string(), "req'");
    }
}
