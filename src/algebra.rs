//! Abstract interface to a symbolic Boolean algebra over named propositions.
//!
//! Automata and the game solver only talk to this trait. Nodes are plain
//! values: operations return new nodes and never mutate their operands, and
//! two nodes denoting the same function compare equal.

use std::fmt::Debug;
use std::hash::Hash;

use num_bigint::BigUint;

use crate::alphabet::Proposition;
use crate::formula::Formula;

pub trait BooleanAlgebra {
    type Node: Copy + Eq + Hash + Debug;

    fn top(&self) -> Self::Node;
    fn bottom(&self) -> Self::Node;

    /// The function that is true exactly when `p` is.
    fn variable(&self, p: &Proposition) -> Self::Node;

    fn not(&self, f: Self::Node) -> Self::Node;
    fn and(&self, f: Self::Node, g: Self::Node) -> Self::Node;
    fn or(&self, f: Self::Node, g: Self::Node) -> Self::Node;

    fn implies(&self, f: Self::Node, g: Self::Node) -> Self::Node {
        self.or(self.not(f), g)
    }

    fn iff(&self, f: Self::Node, g: Self::Node) -> Self::Node {
        self.and(self.implies(f, g), self.implies(g, f))
    }

    fn and_many(&self, nodes: impl IntoIterator<Item = Self::Node>) -> Self::Node {
        nodes.into_iter().fold(self.top(), |acc, f| self.and(acc, f))
    }

    fn or_many(&self, nodes: impl IntoIterator<Item = Self::Node>) -> Self::Node {
        nodes.into_iter().fold(self.bottom(), |acc, f| self.or(acc, f))
    }

    /// `∃vars. f`
    fn exists(&self, vars: &[Proposition], f: Self::Node) -> Self::Node;

    /// `∀vars. f`
    fn forall(&self, vars: &[Proposition], f: Self::Node) -> Self::Node {
        self.not(self.exists(vars, self.not(f)))
    }

    /// Relational product: `∃vars. f ∧ g`, without building the conjunction
    /// over the quantified variables where the backend can avoid it.
    fn rel_product(&self, vars: &[Proposition], f: Self::Node, g: Self::Node) -> Self::Node {
        self.exists(vars, self.and(f, g))
    }

    /// Simultaneously replace every `from` by the matching `to`.
    ///
    /// The targets must not occur in `f` unless they are renamed themselves.
    fn rename(&self, f: Self::Node, pairs: &[(Proposition, Proposition)]) -> Self::Node;

    /// Cofactor: `f` with `p` fixed to `value`.
    fn restrict(&self, f: Self::Node, p: &Proposition, value: bool) -> Self::Node;

    fn is_sat(&self, f: Self::Node) -> bool {
        f != self.bottom()
    }

    fn is_valid(&self, f: Self::Node) -> bool {
        f == self.top()
    }

    /// One satisfying partial assignment; unlisted propositions are don't-cares.
    fn model(&self, f: Self::Node) -> Option<Vec<(Proposition, bool)>>;

    /// Propositions `f` actually depends on.
    fn support(&self, f: Self::Node) -> Vec<Proposition>;

    /// Number of assignments to `over` satisfying `f`.
    ///
    /// The support of `f` must be contained in `over`.
    fn count_models(&self, f: Self::Node, over: &[Proposition]) -> BigUint;

    /// Size of the representation of `f`, for diagnostics only.
    fn size(&self, f: Self::Node) -> u64;

    /// Conjunction of literals. Contradictory literals give the bottom.
    fn cube(&self, literals: &[(Proposition, bool)]) -> Self::Node {
        self.and_many(literals.iter().map(|(p, value)| {
            let v = self.variable(p);
            if *value {
                v
            } else {
                self.not(v)
            }
        }))
    }

    /// Whether the backend is running short of storage.
    fn needs_collection(&self) -> bool {
        false
    }

    /// Reclaim storage not reachable from `roots`.
    ///
    /// Every node of this algebra not reachable from `roots` must be treated
    /// as invalid afterwards.
    fn collect_garbage(&self, _roots: &[Self::Node]) {}

    /// Reinterpret a predicate over `vars` as one over their next-state copies.
    fn prime(&self, f: Self::Node, vars: &[Proposition]) -> Self::Node {
        let pairs: Vec<_> = vars.iter().map(|v| (v.clone(), v.prime())).collect();
        self.rename(f, &pairs)
    }

    /// Inverse of [`prime`][BooleanAlgebra::prime] over the same `vars`.
    fn unprime(&self, f: Self::Node, vars: &[Proposition]) -> Self::Node {
        let pairs: Vec<_> = vars.iter().map(|v| (v.prime(), v.clone())).collect();
        self.rename(f, &pairs)
    }

    /// Lift a propositional formula into the algebra.
    ///
    /// # Panics
    ///
    /// Panics if `formula` contains a temporal operator.
    fn to_node(&self, formula: &Formula) -> Self::Node {
        match formula {
            Formula::Boolean(true) => self.top(),
            Formula::Boolean(false) => self.bottom(),
            Formula::Atom(p) => self.variable(p),
            Formula::Not(arg) => self.not(self.to_node(arg)),
            Formula::And(args) => self.and_many(args.iter().map(|arg| self.to_node(arg))),
            Formula::Or(args) => self.or_many(args.iter().map(|arg| self.to_node(arg))),
            Formula::Implies(l, r) => self.implies(self.to_node(l), self.to_node(r)),
            Formula::Iff(l, r) => self.iff(self.to_node(l), self.to_node(r)),
            Formula::Tomorrow(_) | Formula::WTomorrow(_) | Formula::Eventually(_) | Formula::Always(_) => {
                panic!("Not a propositional formula: {}", formula)
            }
        }
    }
}
