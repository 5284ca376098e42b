use test_log::test;

use synth_rs::algebra::BooleanAlgebra;
use synth_rs::alphabet::{FreshAllocator, Proposition};
use synth_rs::automaton::not_empty;
use synth_rs::check::{is_satisfiable, satisfying_trace};
use synth_rs::fixpoint::{solve, GameSpec};
use synth_rs::formula::Formula;
use synth_rs::manager::Manager;
use synth_rs::translate::{encode, Translator};

fn p() -> Formula {
    Formula::atom("p")
}

fn q() -> Formula {
    Formula::atom("q")
}

#[test]
fn test_single_proposition() {
    let mgr = Manager::new();

    let mut translator = Translator::new(&mgr);
    translator.collect_letters(&p());
    let aut = translator.to_automaton(&p());

    assert_eq!(aut.variables().len(), 1);
    let v = mgr.variable(&aut.variables()[0]);
    assert_eq!(aut.init(), mgr.not(v));
    assert!(mgr.is_sat(aut.finals()));

    let mut alloc = FreshAllocator::new();
    // The translator's own allocator already used `_f0`; skip past it.
    alloc.fresh();
    let checked = not_empty(&mgr, &mut alloc, &aut);
    assert!(solve(&mgr, &GameSpec::satisfiability(checked)));
}

#[test]
fn test_propositional() {
    let mgr = Manager::new();

    assert!(is_satisfiable(&mgr, &p()));
    assert!(is_satisfiable(&mgr, &!p()));
    assert!(is_satisfiable(&mgr, &(p() & q())));
    assert!(is_satisfiable(&mgr, &Formula::top()));
    assert!(!is_satisfiable(&mgr, &Formula::bottom()));
    assert!(!is_satisfiable(&mgr, &(p() & !p())));
}

#[test]
fn test_eventually() {
    let mgr = Manager::new();

    assert!(is_satisfiable(&mgr, &p().eventually()));
    assert!(is_satisfiable(&mgr, &(p() | q()).eventually()));
    assert!(!is_satisfiable(&mgr, &Formula::bottom().eventually()));
    assert!(!is_satisfiable(&mgr, &(p() & !p()).eventually()));
}

#[test]
fn test_temporal() {
    let mgr = Manager::new();

    assert!(is_satisfiable(&mgr, &p().tomorrow()));
    assert!(is_satisfiable(&mgr, &p().weak_tomorrow()));
    assert!(is_satisfiable(&mgr, &p().always()));
    assert!(is_satisfiable(&mgr, &(p().eventually() & q().eventually())));
    assert!(is_satisfiable(&mgr, &p().implies(q().tomorrow()).always()));
    assert!(!is_satisfiable(&mgr, &Formula::bottom().tomorrow()));
}

#[test]
fn test_trace_satisfies_proposition() {
    let mgr = Manager::new();

    let trace = satisfying_trace(&mgr, &p()).unwrap();
    assert!(!trace.is_empty());
    let p = Proposition::letter("p");
    assert!(trace
        .iter()
        .any(|step| step.iter().any(|(letter, value)| *letter == p && *value)));
}

#[test]
fn test_trace_of_tomorrow_has_room() {
    let mgr = Manager::new();

    // Nothing can be seen before the second position.
    let trace = satisfying_trace(&mgr, &p().tomorrow()).unwrap();
    assert!(trace.len() >= 2);
    let valuation = &trace[1];
    assert!(valuation.contains(&(Proposition::letter("p"), true)));

    assert_eq!(satisfying_trace(&mgr, &(p() & !p())), None);
}

#[test]
fn test_encode_adds_monitor() {
    let mgr = Manager::new();

    let aut = encode(&mgr, &p());
    assert_eq!(aut.variables().len(), 2);
    // The monitor blocks acceptance in the initial states.
    assert!(!mgr.is_sat(mgr.and(aut.init(), aut.finals())));
}
