//! Translation of temporal formulas into symbolic automata.
//!
//! Every subformula becomes a small deterministic automaton over fresh state
//! variables; connectives and temporal operators combine them with the
//! operations of [`automaton`][crate::automaton].

use std::rc::Rc;

use log::debug;

use crate::algebra::BooleanAlgebra;
use crate::alphabet::{FreshAllocator, Proposition};
use crate::automaton::{negation, not_empty, product, semideterminize, sum, Automaton, Determinism};
use crate::formula::Formula;

pub struct Translator<'a, A: BooleanAlgebra> {
    mgr: &'a A,
    alloc: FreshAllocator,
    letters: Rc<[Proposition]>,
    depth: usize,
    collect_garbage: bool,
    /// Nodes of partial results still needed further up the recursion.
    pinned: Vec<A::Node>,
}

impl<'a, A: BooleanAlgebra> Translator<'a, A> {
    pub fn new(mgr: &'a A) -> Self {
        Self {
            mgr,
            alloc: FreshAllocator::new(),
            letters: Rc::from(Vec::new()),
            depth: 0,
            collect_garbage: true,
            pinned: Vec::new(),
        }
    }

    /// Whether to reclaim storage after products and sums.
    ///
    /// A collection keeps the automaton under construction and invalidates
    /// every other node of the algebra, including ones held by the caller.
    pub fn with_garbage_collection(mut self, collect_garbage: bool) -> Self {
        self.collect_garbage = collect_garbage;
        self
    }

    pub fn letters(&self) -> &Rc<[Proposition]> {
        &self.letters
    }

    /// Number of fresh state variables allocated so far.
    pub fn fresh_count(&self) -> usize {
        self.alloc.allocated()
    }

    /// Add the propositions of `f` to the letters, keeping existing ones first.
    ///
    /// Must happen before any automaton is built, since all automata of one
    /// translation share the same letters.
    pub fn collect_letters(&mut self, f: &Formula) {
        self.add_letters(f.propositions());
    }

    pub fn add_letters(&mut self, props: impl IntoIterator<Item = Proposition>) {
        let mut letters = self.letters.to_vec();
        for p in props {
            assert!(!p.is_fresh(), "Fresh symbol {} cannot be a letter", p);
            if !letters.contains(&p) {
                letters.push(p);
            }
        }
        self.letters = letters.into();
    }

    /// Full translation of `f`, ready for the game solver.
    pub fn encode(&mut self, f: &Formula) -> Automaton<A::Node> {
        self.collect_letters(f);
        debug!("letters: {:?}", self.letters.iter().map(|p| p.to_string()).collect::<Vec<_>>());

        let f = preprocess(f);
        let aut = self.to_automaton(&f);
        not_empty(self.mgr, &mut self.alloc, &aut)
    }

    fn indent(&self) -> String {
        " ".repeat(self.depth * 3)
    }

    fn pin(&mut self, aut: &Automaton<A::Node>) -> usize {
        let mark = self.pinned.len();
        self.pinned.extend([aut.init(), aut.trans(), aut.finals()]);
        mark
    }

    fn unpin(&mut self, mark: usize) {
        self.pinned.truncate(mark);
    }

    fn collect(&self, aut: &Automaton<A::Node>) {
        if !self.collect_garbage || !self.mgr.needs_collection() {
            return;
        }
        let mut roots = self.pinned.clone();
        roots.extend([aut.init(), aut.trans(), aut.finals()]);
        debug!("{}collecting garbage with {} roots", self.indent(), roots.len());
        self.mgr.collect_garbage(&roots);
    }

    fn fresh(&mut self) -> Proposition {
        let v = self.alloc.fresh();
        debug!("{}allocating fresh variable {}", self.indent(), v);
        v
    }

    /// Automaton for `f`, without the final non-emptiness monitor.
    ///
    /// Recurses once per nested operator, so the stack usage grows with the
    /// nesting depth of `f`.
    pub fn to_automaton(&mut self, f: &Formula) -> Automaton<A::Node> {
        debug!("{}translating {}", self.indent(), f);
        self.depth += 1;

        let aut = match f {
            f if f.is_propositional() => self.propositional(f),
            Formula::Boolean(_) | Formula::Atom(_) => unreachable!("constants and atoms are propositional"),
            Formula::Not(arg) => {
                let aut = self.to_automaton(arg);
                negation(self.mgr, &aut)
            }
            Formula::And(args) => self.conjunction(args),
            Formula::Or(args) => {
                let negated = Formula::big_and(args.iter().map(|op| !op.clone()));
                self.to_automaton(&!negated)
            }
            Formula::Implies(l, r) => self.to_automaton(&(!l.as_ref().clone() | r.as_ref().clone())),
            Formula::Iff(l, r) => {
                let l = l.as_ref().clone();
                let r = r.as_ref().clone();
                self.to_automaton(&(l.clone().implies(r.clone()) & r.implies(l)))
            }
            Formula::Eventually(arg) => self.eventually(arg),
            Formula::Always(arg) => self.to_automaton(&!(!arg.as_ref().clone()).eventually()),
            Formula::Tomorrow(arg) => self.tomorrow(arg),
            Formula::WTomorrow(arg) => self.to_automaton(&!(!arg.as_ref().clone()).tomorrow()),
        };

        self.depth -= 1;
        aut
    }

    /// Latch that turns on once `f` has held at some step.
    fn propositional(&mut self, f: &Formula) -> Automaton<A::Node> {
        let mgr = self.mgr;
        let v = self.fresh();
        let x = mgr.variable(&v);
        let x_next = mgr.variable(&v.prime());

        Automaton::with_determinism(
            self.letters.clone(),
            vec![v],
            mgr.not(x),
            mgr.iff(x_next, mgr.or(x, mgr.to_node(f))),
            x,
            Determinism::Deterministic,
        )
    }

    fn conjunction(&mut self, args: &[Formula]) -> Automaton<A::Node> {
        let (boolean, temporal): (Vec<&Formula>, Vec<&Formula>) = args.iter().partition(|op| op.is_propositional());
        debug!("{}found {} boolean subformulas in conjunction", self.indent(), boolean.len());

        let mut aut = self.propositional(&Formula::big_and(boolean.into_iter().cloned()));
        for op in temporal {
            debug!("{}building a product...", self.indent());
            let mark = self.pin(&aut);
            let next = self.to_automaton(op);
            self.unpin(mark);
            aut = product(self.mgr, &aut, &next);
            self.collect(&aut);
        }
        aut
    }

    /// Current automaton `aut` for `arg`, plus a copy that waits and guesses
    /// when to restart `aut` from its initial state.
    fn eventually(&mut self, arg: &Formula) -> Automaton<A::Node> {
        let mgr = self.mgr;
        let aut = self.to_automaton(arg);

        let v = self.fresh();
        let x = mgr.variable(&v);
        let x_next = mgr.variable(&v.prime());
        let restart = mgr.prime(aut.init(), aut.variables());

        let trans = mgr.or_many([
            // still waiting
            mgr.and(x, x_next),
            // running
            mgr.and_many([mgr.not(x), aut.trans(), mgr.not(x_next)]),
            // restart now
            mgr.and_many([x, mgr.not(x_next), restart]),
        ]);

        let mut variables = aut.variables().to_vec();
        variables.push(v.clone());

        let xf = Automaton::with_determinism(
            self.letters.clone(),
            variables,
            x,
            trans,
            mgr.and(mgr.not(x), aut.finals()),
            Determinism::Guessing { flag: v },
        );

        debug!(
            "{}semideterminizing: {} variables, trans size {}",
            self.indent(),
            xf.variables().len(),
            mgr.size(xf.trans())
        );
        let xf = semideterminize(mgr, &xf);
        let aut = sum(mgr, &aut, &xf);
        self.collect(&aut);
        aut
    }

    /// Wait one step, then run the automaton of `arg` from its initial state.
    fn tomorrow(&mut self, arg: &Formula) -> Automaton<A::Node> {
        let mgr = self.mgr;
        let aut = self.to_automaton(arg);

        let v = self.fresh();
        let x = mgr.variable(&v);
        let x_next = mgr.variable(&v.prime());
        let start = mgr.prime(aut.init(), aut.variables());

        let trans = mgr.or(
            mgr.and_many([mgr.not(x), aut.trans(), mgr.not(x_next)]),
            mgr.and_many([x, mgr.not(x_next), start]),
        );

        let mut variables = aut.variables().to_vec();
        variables.push(v);

        Automaton::with_determinism(
            self.letters.clone(),
            variables,
            x,
            trans,
            mgr.and(mgr.not(x), aut.finals()),
            Determinism::Deterministic,
        )
    }
}

/// Translate `f` with a fresh [`Translator`].
pub fn encode<A: BooleanAlgebra>(mgr: &A, f: &Formula) -> Automaton<A::Node> {
    Translator::new(mgr).encode(f)
}

/// Distribute `G` over conjunctions and `F` over disjunctions.
///
/// Meaning-preserving and idempotent.
pub fn preprocess(f: &Formula) -> Formula {
    match f {
        Formula::Boolean(_) | Formula::Atom(_) => f.clone(),
        Formula::Always(arg) => match arg.as_ref() {
            Formula::And(ops) => Formula::big_and(ops.iter().map(|op| preprocess(&op.clone().always()))),
            _ => preprocess(arg).always(),
        },
        Formula::Eventually(arg) => match arg.as_ref() {
            Formula::Or(ops) => Formula::big_or(ops.iter().map(|op| preprocess(&op.clone().eventually()))),
            _ => preprocess(arg).eventually(),
        },
        Formula::Not(arg) => !preprocess(arg),
        Formula::Tomorrow(arg) => preprocess(arg).tomorrow(),
        Formula::WTomorrow(arg) => preprocess(arg).weak_tomorrow(),
        Formula::And(ops) => Formula::And(ops.iter().map(preprocess).collect()),
        Formula::Or(ops) => Formula::Or(ops.iter().map(preprocess).collect()),
        Formula::Implies(l, r) => preprocess(l).implies(preprocess(r)),
        Formula::Iff(l, r) => preprocess(l).iff(preprocess(r)),
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use test_log::test;

    use super::*;
    use crate::bdd::BddConfig;
    use crate::manager::Manager;
    use crate::reference::Ref;

    fn models(mgr: &Manager, aut: &Automaton<Ref>) -> Vec<BigUint> {
        let mut over = aut.letters().to_vec();
        over.extend(aut.variables().iter().cloned());
        over.extend(aut.next_variables());
        [aut.init(), aut.trans(), aut.finals()]
            .into_iter()
            .map(|f| mgr.count_models(f, &over))
            .collect()
    }

    #[test]
    fn test_preprocess_distributes() {
        let p = Formula::atom("p");
        let q = Formula::atom("q");

        let f = (p.clone() & q.clone()).always();
        assert_eq!(preprocess(&f), p.clone().always() & q.clone().always());

        let g = (p.clone() | q.clone()).eventually();
        assert_eq!(preprocess(&g), p.clone().eventually() | q.clone().eventually());

        // Only directly nested operands are distributed.
        let h = (p.clone() | q.clone()).always();
        assert_eq!(preprocess(&h), h);
    }

    #[test]
    fn test_preprocess_idempotent() {
        let p = Formula::atom("p");
        let q = Formula::atom("q");
        let r = Formula::atom("r");

        let f = (p.clone() & (q.clone() & r.clone().eventually()).always()).implies((q | r.tomorrow()).eventually());
        let once = preprocess(&f);
        assert_eq!(preprocess(&once), once);
    }

    #[test]
    fn test_proposition_automaton() {
        let mgr = Manager::new();
        let p = Formula::atom("p");

        let mut translator = Translator::new(&mgr);
        translator.collect_letters(&p);
        let aut = translator.to_automaton(&p);

        assert_eq!(aut.variables().len(), 1);
        let v = &aut.variables()[0];
        assert!(v.is_fresh());
        assert_eq!(aut.init(), mgr.not(mgr.variable(v)));
        assert_eq!(aut.finals(), mgr.variable(v));
        assert!(mgr.is_sat(aut.finals()));
        assert!(aut.is_deterministic());
    }

    #[test]
    fn test_letters_are_shared() {
        let mgr = Manager::new();
        let p = Formula::atom("p");
        let q = Formula::atom("q");
        let f = (p & q.tomorrow()).eventually();

        let mut translator = Translator::new(&mgr);
        let aut = translator.encode(&f);

        assert_eq!(
            aut.letters().as_ref(),
            &[Proposition::letter("p"), Proposition::letter("q")]
        );
        // Fresh variables never clash with letters.
        for v in aut.variables() {
            assert!(v.is_fresh());
        }
        assert_eq!(aut.variables().len(), translator.fresh_count());
    }

    #[test]
    fn test_translated_automata_are_deterministic() {
        let mgr = Manager::new();
        let i = Formula::atom("i");
        let o = Formula::atom("o");
        let formulas = [
            !i.clone(),
            i.clone().eventually(),
            i.clone().implies(o.clone()).always(),
            i.clone().tomorrow() | o.clone().weak_tomorrow(),
            i.clone().iff(o.clone().eventually()),
        ];

        for f in &formulas {
            let mut translator = Translator::new(&mgr);
            translator.collect_letters(f);
            let aut = translator.to_automaton(f);
            assert!(aut.is_deterministic(), "{}", f);

            let double = negation(&mgr, &negation(&mgr, &aut));
            assert_eq!(double.init(), aut.init());
            assert_eq!(double.trans(), aut.trans());
            assert_eq!(double.finals(), aut.finals());
        }
    }

    #[test]
    fn test_collection_keeps_partial_results() {
        let p = Formula::atom("p");
        let q = Formula::atom("q");
        let f = p.tomorrow().eventually() & q.eventually();

        let roomy = Manager::new();
        let expected = models(&roomy, &Translator::new(&roomy).encode(&f));

        let mgr = Manager::with_config(BddConfig::default().with_storage_bits(12));
        let mut junk = mgr.bottom();
        for i in 0.. {
            if mgr.needs_collection() {
                break;
            }
            junk = mgr.not(mgr.iff(junk, mgr.variable(&Proposition::letter(&format!("junk{}", i)))));
        }
        let crowded = mgr.bdd().num_nodes();

        let aut = Translator::new(&mgr).encode(&f);
        assert!(mgr.bdd().num_nodes() < crowded);
        assert_eq!(models(&mgr, &aut), expected);
    }
}
