//! Temporal formulas accepted by the translator.
//!
//! The enum *is* the supported fragment: propositional connectives plus
//! tomorrow, weak tomorrow, eventually and always.

use std::collections::HashSet;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use crate::alphabet::Proposition;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    /// Constant `True` / `False`
    Boolean(bool),
    /// Atomic proposition
    Atom(Proposition),
    Not(Box<Formula>),
    /// N-ary conjunction; empty is `True`
    And(Vec<Formula>),
    /// N-ary disjunction; empty is `False`
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Iff(Box<Formula>, Box<Formula>),

    // Temporal operators
    /// Tomorrow: X φ (there is a next state, and φ holds there)
    Tomorrow(Box<Formula>),
    /// Weak tomorrow: wX φ (if there is a next state, φ holds there)
    WTomorrow(Box<Formula>),
    /// Eventually: F φ
    Eventually(Box<Formula>),
    /// Always: G φ
    Always(Box<Formula>),
}

impl Formula {
    pub fn atom(name: &str) -> Self {
        Formula::Atom(Proposition::letter(name))
    }

    pub fn top() -> Self {
        Formula::Boolean(true)
    }

    pub fn bottom() -> Self {
        Formula::Boolean(false)
    }

    pub fn implies(self, other: Self) -> Self {
        Formula::Implies(Box::new(self), Box::new(other))
    }

    pub fn iff(self, other: Self) -> Self {
        Formula::Iff(Box::new(self), Box::new(other))
    }

    pub fn tomorrow(self) -> Self {
        Formula::Tomorrow(Box::new(self))
    }

    pub fn weak_tomorrow(self) -> Self {
        Formula::WTomorrow(Box::new(self))
    }

    pub fn eventually(self) -> Self {
        Formula::Eventually(Box::new(self))
    }

    pub fn always(self) -> Self {
        Formula::Always(Box::new(self))
    }

    /// Conjunction of all operands (`True` when there are none).
    pub fn big_and(operands: impl IntoIterator<Item = Formula>) -> Self {
        let mut operands: Vec<_> = operands.into_iter().collect();
        match operands.len() {
            0 => Formula::top(),
            1 => operands.remove(0),
            _ => Formula::And(operands),
        }
    }

    /// Disjunction of all operands (`False` when there are none).
    pub fn big_or(operands: impl IntoIterator<Item = Formula>) -> Self {
        let mut operands: Vec<_> = operands.into_iter().collect();
        match operands.len() {
            0 => Formula::bottom(),
            1 => operands.remove(0),
            _ => Formula::Or(operands),
        }
    }

    /// No temporal operator occurs anywhere in the formula.
    pub fn is_propositional(&self) -> bool {
        match self {
            Formula::Boolean(_) | Formula::Atom(_) => true,
            Formula::Not(arg) => arg.is_propositional(),
            Formula::And(args) | Formula::Or(args) => args.iter().all(Formula::is_propositional),
            Formula::Implies(l, r) | Formula::Iff(l, r) => l.is_propositional() && r.is_propositional(),
            Formula::Tomorrow(_) | Formula::WTomorrow(_) | Formula::Eventually(_) | Formula::Always(_) => false,
        }
    }

    /// Free propositions in order of first occurrence, without duplicates.
    pub fn propositions(&self) -> Vec<Proposition> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        self.collect_propositions(&mut seen, &mut result);
        result
    }

    fn collect_propositions(&self, seen: &mut HashSet<Proposition>, result: &mut Vec<Proposition>) {
        match self {
            Formula::Boolean(_) => {}
            Formula::Atom(p) => {
                if seen.insert(p.clone()) {
                    result.push(p.clone());
                }
            }
            Formula::Not(arg)
            | Formula::Tomorrow(arg)
            | Formula::WTomorrow(arg)
            | Formula::Eventually(arg)
            | Formula::Always(arg) => arg.collect_propositions(seen, result),
            Formula::And(args) | Formula::Or(args) => {
                for arg in args {
                    arg.collect_propositions(seen, result);
                }
            }
            Formula::Implies(l, r) | Formula::Iff(l, r) => {
                l.collect_propositions(seen, result);
                r.collect_propositions(seen, result);
            }
        }
    }
}

impl From<Proposition> for Formula {
    fn from(p: Proposition) -> Self {
        Formula::Atom(p)
    }
}

impl Not for Formula {
    type Output = Formula;

    fn not(self) -> Self::Output {
        Formula::Not(Box::new(self))
    }
}

impl BitAnd for Formula {
    type Output = Formula;

    fn bitand(self, rhs: Self) -> Self::Output {
        let mut operands = match self {
            Formula::And(args) => args,
            other => vec![other],
        };
        match rhs {
            Formula::And(args) => operands.extend(args),
            other => operands.push(other),
        }
        Formula::And(operands)
    }
}

impl BitOr for Formula {
    type Output = Formula;

    fn bitor(self, rhs: Self) -> Self::Output {
        let mut operands = match self {
            Formula::Or(args) => args,
            other => vec![other],
        };
        match rhs {
            Formula::Or(args) => operands.extend(args),
            other => operands.push(other),
        }
        Formula::Or(operands)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, args: &[Formula], sep: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", sep)?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ")")
        }

        match self {
            Formula::Boolean(true) => write!(f, "True"),
            Formula::Boolean(false) => write!(f, "False"),
            Formula::Atom(p) => write!(f, "{}", p),
            Formula::Not(arg) => write!(f, "!{}", arg),
            Formula::And(args) if args.is_empty() => write!(f, "True"),
            Formula::And(args) => join(f, args, "&"),
            Formula::Or(args) if args.is_empty() => write!(f, "False"),
            Formula::Or(args) => join(f, args, "|"),
            Formula::Implies(l, r) => write!(f, "({} -> {})", l, r),
            Formula::Iff(l, r) => write!(f, "({} <-> {})", l, r),
            Formula::Tomorrow(arg) => write!(f, "X {}", arg),
            Formula::WTomorrow(arg) => write!(f, "wX {}", arg),
            Formula::Eventually(arg) => write!(f, "F {}", arg),
            Formula::Always(arg) => write!(f, "G {}", arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_flatten() {
        let p = Formula::atom("p");
        let q = Formula::atom("q");
        let r = Formula::atom("r");

        let f = p.clone() & q.clone() & r.clone();
        assert_eq!(f, Formula::And(vec![p.clone(), q.clone(), r.clone()]));

        let g = (p.clone() | q.clone()) | r.clone();
        assert_eq!(g, Formula::Or(vec![p, q, r]));
    }

    #[test]
    fn test_big_and_or() {
        let p = Formula::atom("p");
        assert_eq!(Formula::big_and([]), Formula::top());
        assert_eq!(Formula::big_or([]), Formula::bottom());
        assert_eq!(Formula::big_and([p.clone()]), p);
    }

    #[test]
    fn test_is_propositional() {
        let p = Formula::atom("p");
        let q = Formula::atom("q");

        assert!((p.clone() & !q.clone()).is_propositional());
        assert!(p.clone().implies(q.clone()).is_propositional());
        assert!(!(p.clone() & q.clone().eventually()).is_propositional());
        assert!(!p.tomorrow().is_propositional());
    }

    #[test]
    fn test_propositions() {
        let p = Formula::atom("p");
        let q = Formula::atom("q");
        let f = (p.clone() & q.clone().eventually()).implies(p.always());

        let props = f.propositions();
        assert_eq!(props, vec![Proposition::letter("p"), Proposition::letter("q")]);
        assert!(Formula::top().propositions().is_empty());
    }

    #[test]
    fn test_display() {
        let i = Formula::atom("i");
        let o = Formula::atom("o");
        let f = i.clone().implies(o.clone()).always();
        assert_eq!(f.to_string(), "G (i -> o)");

        let g = (!i & o.weak_tomorrow()).eventually();
        assert_eq!(g.to_string(), "F (!i & wX o)");
    }
}
