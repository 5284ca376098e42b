//! Symbolic automata and their algebra.
//!
//! An automaton reads one valuation of its `letters` per step. Its state is a
//! valuation of `variables`; `trans` relates a letter, the current state and
//! the next state (over the primed variables).
//!
//! Complementation only flips `finals`, which is sound only when `trans` is
//! deterministic. Every automaton therefore carries a [`Determinism`] tag,
//! and [`negation`] and [`sum`] refuse operands that are not deterministic.

use std::rc::Rc;

use log::debug;

use crate::algebra::BooleanAlgebra;
use crate::alphabet::{FreshAllocator, Proposition};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Determinism {
    /// At most one successor per letter and state.
    Deterministic,
    /// Deterministic, except for the guess encoded by `flag`.
    /// [`semideterminize`] turns it into [`Determinism::Deterministic`].
    Guessing { flag: Proposition },
    /// Nothing is known.
    Nondeterministic,
}

#[derive(Debug, Clone)]
pub struct Automaton<N> {
    letters: Rc<[Proposition]>,
    variables: Vec<Proposition>,
    init: N,
    trans: N,
    finals: N,
    determinism: Determinism,
}

impl<N: Copy> Automaton<N> {
    /// Build an automaton from raw parts. Nothing is assumed about `trans`,
    /// so the result cannot be complemented.
    pub fn new(letters: Rc<[Proposition]>, variables: Vec<Proposition>, init: N, trans: N, finals: N) -> Self {
        Self::with_determinism(letters, variables, init, trans, finals, Determinism::Nondeterministic)
    }

    pub(crate) fn with_determinism(
        letters: Rc<[Proposition]>,
        variables: Vec<Proposition>,
        init: N,
        trans: N,
        finals: N,
        determinism: Determinism,
    ) -> Self {
        Self {
            letters,
            variables,
            init,
            trans,
            finals,
            determinism,
        }
    }

    pub fn letters(&self) -> &Rc<[Proposition]> {
        &self.letters
    }
    pub fn variables(&self) -> &[Proposition] {
        &self.variables
    }
    pub fn init(&self) -> N {
        self.init
    }
    pub fn trans(&self) -> N {
        self.trans
    }
    pub fn finals(&self) -> N {
        self.finals
    }
    pub fn determinism(&self) -> &Determinism {
        &self.determinism
    }

    pub fn is_deterministic(&self) -> bool {
        self.determinism == Determinism::Deterministic
    }

    /// Next-state copies of the state variables, in the same order.
    pub fn next_variables(&self) -> Vec<Proposition> {
        self.variables.iter().map(Proposition::prime).collect()
    }
}

/// Complement: same automaton, accepting where `a` rejects.
///
/// # Panics
///
/// Panics if `a` is not [`Determinism::Deterministic`].
pub fn negation<A: BooleanAlgebra>(mgr: &A, a: &Automaton<A::Node>) -> Automaton<A::Node> {
    assert!(
        a.is_deterministic(),
        "Cannot complement an automaton that is not deterministic ({:?})",
        a.determinism
    );
    Automaton {
        finals: mgr.not(a.finals),
        ..a.clone()
    }
}

/// Synchronous product over shared letters.
///
/// State variables are the ordered union of both operands' variables, so
/// operands built on top of each other share the common part.
pub fn product<A: BooleanAlgebra>(mgr: &A, a1: &Automaton<A::Node>, a2: &Automaton<A::Node>) -> Automaton<A::Node> {
    assert_eq!(a1.letters, a2.letters, "Automata over different letters");

    let mut variables = a1.variables.clone();
    for v in &a2.variables {
        if !variables.contains(v) {
            variables.push(v.clone());
        }
    }

    let trans = mgr.and(a1.trans, a2.trans);
    debug!("product: {} variables, trans size {}", variables.len(), mgr.size(trans));

    let determinism = if a1.is_deterministic() && a2.is_deterministic() {
        Determinism::Deterministic
    } else {
        Determinism::Nondeterministic
    };

    Automaton::with_determinism(
        a1.letters.clone(),
        variables,
        mgr.and(a1.init, a2.init),
        trans,
        mgr.and(a1.finals, a2.finals),
        determinism,
    )
}

/// Union by De Morgan: `¬(¬a1 × ¬a2)`.
///
/// # Panics
///
/// Panics unless both operands are deterministic.
pub fn sum<A: BooleanAlgebra>(mgr: &A, a1: &Automaton<A::Node>, a2: &Automaton<A::Node>) -> Automaton<A::Node> {
    negation(mgr, &product(mgr, &negation(mgr, a1), &negation(mgr, a2)))
}

/// Add a monitor variable `m` that is set initially and cleared by the first
/// step, so that only states reached after at least one step can accept.
pub fn not_empty<A: BooleanAlgebra>(
    mgr: &A,
    alloc: &mut FreshAllocator,
    a: &Automaton<A::Node>,
) -> Automaton<A::Node> {
    let m = alloc.fresh();
    let vm = mgr.variable(&m);
    let vm_next = mgr.variable(&m.prime());

    let mut variables = a.variables.clone();
    variables.push(m);

    Automaton::with_determinism(
        a.letters.clone(),
        variables,
        mgr.and(vm, a.init),
        mgr.and(a.trans, mgr.not(vm_next)),
        mgr.and(a.finals, mgr.not(vm)),
        a.determinism.clone(),
    )
}

/// Resolve the guess of a [`Determinism::Guessing`] automaton.
///
/// For every letter, state and successor valuation of the other variables,
/// the successor value of the guess flag `g` is made unique, preferring
/// `g' = 0` (the earliest restart) whenever it is allowed:
///
/// ```text
/// trans' = (¬g' ∧ trans|g'=0) ∨ (g' ∧ trans|g'=1 ∧ ¬trans|g'=0)
/// ```
///
/// # Panics
///
/// Panics if `a` is not [`Determinism::Guessing`].
pub fn semideterminize<A: BooleanAlgebra>(mgr: &A, a: &Automaton<A::Node>) -> Automaton<A::Node> {
    let Determinism::Guessing { flag } = &a.determinism else {
        panic!("Only guessing automata can be semideterminized ({:?})", a.determinism);
    };

    let next_flag = flag.prime();
    let g = mgr.variable(&next_flag);
    let stay = mgr.restrict(a.trans, &next_flag, false);
    let leave = mgr.restrict(a.trans, &next_flag, true);

    let trans = mgr.or(
        mgr.and(mgr.not(g), stay),
        mgr.and_many([g, leave, mgr.not(stay)]),
    );
    debug!(
        "semideterminize: {} variables, trans size {} -> {}",
        a.variables.len(),
        mgr.size(a.trans),
        mgr.size(trans)
    );

    Automaton::with_determinism(
        a.letters.clone(),
        a.variables.clone(),
        a.init,
        trans,
        a.finals,
        Determinism::Deterministic,
    )
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::manager::Manager;
    use crate::reference::Ref;

    /// Latch automaton that becomes accepting once `cond` is seen.
    fn latch(mgr: &Manager, alloc: &mut FreshAllocator, letters: &Rc<[Proposition]>, cond: Ref) -> Automaton<Ref> {
        let v = alloc.fresh();
        let x = mgr.variable(&v);
        let x_next = mgr.variable(&v.prime());
        Automaton::with_determinism(
            letters.clone(),
            vec![v],
            mgr.not(x),
            mgr.iff(x_next, mgr.or(x, cond)),
            x,
            Determinism::Deterministic,
        )
    }

    fn setup() -> (Manager, FreshAllocator, Rc<[Proposition]>) {
        let letters: Rc<[Proposition]> = vec![Proposition::letter("p"), Proposition::letter("q")].into();
        (Manager::new(), FreshAllocator::new(), letters)
    }

    #[test]
    fn test_double_negation() {
        let (mgr, mut alloc, letters) = setup();
        let p = mgr.variable(&letters[0]);
        let a = latch(&mgr, &mut alloc, &letters, p);

        let b = negation(&mgr, &negation(&mgr, &a));
        assert_eq!(b.init(), a.init());
        assert_eq!(b.trans(), a.trans());
        assert_eq!(b.finals(), a.finals());
        assert_eq!(b.variables(), a.variables());
    }

    #[test]
    fn test_product_commutes() {
        let (mgr, mut alloc, letters) = setup();
        let p = mgr.variable(&letters[0]);
        let q = mgr.variable(&letters[1]);
        let a1 = latch(&mgr, &mut alloc, &letters, p);
        let a2 = latch(&mgr, &mut alloc, &letters, q);

        let ab = product(&mgr, &a1, &a2);
        let ba = product(&mgr, &a2, &a1);
        assert_eq!(ab.init(), ba.init());
        assert_eq!(ab.trans(), ba.trans());
        assert_eq!(ab.finals(), ba.finals());
        assert_eq!(ab.variables().len(), 2);
        assert!(ab.is_deterministic());

        // Shared variables are not duplicated.
        let aa = product(&mgr, &ab, &a1);
        assert_eq!(aa.variables().len(), 2);
    }

    #[test]
    fn test_sum_is_de_morgan() {
        let (mgr, mut alloc, letters) = setup();
        let p = mgr.variable(&letters[0]);
        let q = mgr.variable(&letters[1]);
        let a1 = latch(&mgr, &mut alloc, &letters, p);
        let a2 = latch(&mgr, &mut alloc, &letters, q);

        let s = sum(&mgr, &a1, &a2);
        assert_eq!(s.finals(), mgr.or(a1.finals(), a2.finals()));
        assert_eq!(s.init(), mgr.and(a1.init(), a2.init()));
        assert!(s.is_deterministic());
    }

    #[test]
    fn test_not_empty() {
        let (mgr, mut alloc, letters) = setup();

        let never = latch(&mgr, &mut alloc, &letters, mgr.bottom());
        let never = Automaton { finals: mgr.bottom(), ..never };
        let ne = not_empty(&mgr, &mut alloc, &never);
        assert!(!mgr.is_sat(ne.finals()));
        assert_eq!(ne.variables().len(), 2);

        let p = mgr.variable(&letters[0]);
        let a = latch(&mgr, &mut alloc, &letters, p);
        let ne = not_empty(&mgr, &mut alloc, &a);
        assert!(mgr.is_sat(ne.finals()));
        // The monitor is set initially, so no initial state accepts.
        assert!(!mgr.is_sat(mgr.and(ne.init(), ne.finals())));
    }

    #[test]
    fn test_semideterminize() {
        let (mgr, mut alloc, letters) = setup();
        let g = alloc.fresh();
        let vg = mgr.variable(&g);
        let vg_next = mgr.variable(&g.prime());

        // From g the flag may either stay up or drop; from ¬g it stays down.
        let trans = mgr.or(vg, mgr.not(vg_next));
        let a = Automaton::with_determinism(
            letters.clone(),
            vec![g.clone()],
            vg,
            trans,
            mgr.not(vg),
            Determinism::Guessing { flag: g.clone() },
        );

        let d = semideterminize(&mgr, &a);
        assert!(d.is_deterministic());
        // The earliest drop wins: g' is always false.
        assert_eq!(d.trans(), mgr.not(vg_next));
        assert_eq!(d.init(), a.init());
        assert_eq!(d.finals(), a.finals());
    }

    /// `trans` with the value of `p` flipped.
    fn flip(mgr: &Manager, trans: Ref, p: &Proposition) -> Ref {
        let v = mgr.variable(p);
        mgr.or(
            mgr.and(v, mgr.restrict(trans, p, false)),
            mgr.and(mgr.not(v), mgr.restrict(trans, p, true)),
        )
    }

    #[test]
    fn test_semideterminize_eventually() {
        let (mgr, mut alloc, letters) = setup();
        let p = mgr.variable(&letters[0]);
        let q = mgr.variable(&letters[1]);
        let inner = product(
            &mgr,
            &latch(&mgr, &mut alloc, &letters, p),
            &latch(&mgr, &mut alloc, &letters, q),
        );

        // Wait, then guess when to start `inner` from its initial state.
        let g = alloc.fresh();
        let x = mgr.variable(&g);
        let x_next = mgr.variable(&g.prime());
        let restart = mgr.prime(inner.init(), inner.variables());
        let trans = mgr.or_many([
            mgr.and(x, x_next),
            mgr.and_many([mgr.not(x), inner.trans(), mgr.not(x_next)]),
            mgr.and_many([x, mgr.not(x_next), restart]),
        ]);
        let mut variables = inner.variables().to_vec();
        variables.push(g.clone());
        let xf = Automaton::with_determinism(
            letters.clone(),
            variables,
            x,
            trans,
            mgr.and(mgr.not(x), inner.finals()),
            Determinism::Guessing { flag: g.clone() },
        );

        let flag = g.prime();
        // Before: waiting and restarting are both possible towards a restart state.
        assert!(mgr.is_sat(mgr.and(xf.trans(), flip(&mgr, xf.trans(), &flag))));

        let d = semideterminize(&mgr, &xf);
        assert!(d.is_deterministic());
        // After: the flag is fixed by the letter, the state and the other successors.
        assert!(!mgr.is_sat(mgr.and(d.trans(), flip(&mgr, d.trans(), &flag))));
        // No successor over the other variables is lost.
        assert_eq!(
            mgr.exists(&[flag.clone()], d.trans()),
            mgr.exists(&[flag.clone()], xf.trans())
        );
        // Nothing new is allowed either.
        assert!(mgr.is_valid(mgr.implies(d.trans(), xf.trans())));
    }

    #[test]
    #[should_panic(expected = "Cannot complement")]
    fn test_negation_needs_determinism() {
        let (mgr, _, letters) = setup();
        let a = Automaton::new(letters, vec![], mgr.top(), mgr.top(), mgr.top());
        negation(&mgr, &a);
    }

    #[test]
    #[should_panic(expected = "Only guessing automata")]
    fn test_semideterminize_needs_guess() {
        let (mgr, _, letters) = setup();
        let a = Automaton::new(letters, vec![], mgr.top(), mgr.top(), mgr.top());
        semideterminize(&mgr, &a);
    }
}
