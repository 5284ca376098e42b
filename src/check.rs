//! One-call entry points: formula in, verdict out.

use log::info;

use crate::algebra::BooleanAlgebra;
use crate::alphabet::Proposition;
use crate::fixpoint::{solve, GameSpec, Solver};
use crate::formula::Formula;
use crate::translate::{encode, Translator};

/// Whether some finite trace satisfies `f`.
pub fn is_satisfiable<A: BooleanAlgebra>(mgr: &A, f: &Formula) -> bool {
    let spec = GameSpec::satisfiability(encode(mgr, f));
    let result = solve(mgr, &spec);
    info!("{} is {}", f, if result { "satisfiable" } else { "unsatisfiable" });
    result
}

/// Whether a controller setting `outputs` can satisfy `f` against any choice of `inputs`.
///
/// Every proposition of `f` must be listed in exactly one of `inputs` and `outputs`.
/// Listed propositions that do not occur in `f` are still part of the game.
pub fn is_realizable<A: BooleanAlgebra>(mgr: &A, f: &Formula, inputs: &[Proposition], outputs: &[Proposition]) -> bool {
    let mut translator = Translator::new(mgr);
    translator.add_letters(inputs.iter().chain(outputs).cloned());
    let automaton = translator.encode(f);

    let spec = GameSpec::new(automaton, inputs.to_vec(), outputs.to_vec());
    let result = solve(mgr, &spec);
    info!("{} is {}", f, if result { "realizable" } else { "unrealizable" });
    result
}

/// A finite trace satisfying `f`, one valuation of its propositions per step.
pub fn satisfying_trace<A: BooleanAlgebra>(mgr: &A, f: &Formula) -> Option<Vec<Vec<(Proposition, bool)>>> {
    let spec = GameSpec::satisfiability(encode(mgr, f));
    let solver = Solver::new(mgr, &spec);
    let outcome = solver.run();
    solver.witness(&outcome)
}
