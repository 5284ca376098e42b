//! Backward fixpoint solver for realizability games over symbolic automata.
//!
//! The environment picks the inputs, then the controller picks the outputs
//! and the successor state. Starting from the accepting states, the solver
//! repeatedly adds the states from which the controller can force a step into
//! the current region, until the region stops growing.

use std::fmt::{Display, Formatter};

use log::{debug, info};

use crate::algebra::BooleanAlgebra;
use crate::alphabet::Proposition;
use crate::automaton::Automaton;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Tribool {
    True,
    False,
    /// The iteration cap was hit before the answer was known.
    Undef,
}

impl From<bool> for Tribool {
    fn from(b: bool) -> Self {
        if b {
            Tribool::True
        } else {
            Tribool::False
        }
    }
}

impl Display for Tribool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Tribool::True => write!(f, "true"),
            Tribool::False => write!(f, "false"),
            Tribool::Undef => write!(f, "undef"),
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct SolverConfig {
    /// Stop after this many iterations; `None` means run to the fixpoint.
    pub max_iterations: Option<usize>,
    /// Reclaim storage between iterations when the algebra runs short of it.
    pub collect_garbage: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: None,
            collect_garbage: true,
        }
    }
}

impl SolverConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_garbage_collection(mut self, collect_garbage: bool) -> Self {
        self.collect_garbage = collect_garbage;
        self
    }
}

/// An automaton together with the split of its letters between the players.
#[derive(Debug, Clone)]
pub struct GameSpec<N> {
    automaton: Automaton<N>,
    inputs: Vec<Proposition>,
    outputs: Vec<Proposition>,
}

impl<N: Copy> GameSpec<N> {
    /// # Panics
    ///
    /// Panics unless `inputs` and `outputs` partition the letters of `automaton`.
    pub fn new(automaton: Automaton<N>, inputs: Vec<Proposition>, outputs: Vec<Proposition>) -> Self {
        for p in &inputs {
            assert!(!outputs.contains(p), "{} is both an input and an output", p);
            assert!(automaton.letters().contains(p), "Input {} is not a letter", p);
        }
        for p in &outputs {
            assert!(automaton.letters().contains(p), "Output {} is not a letter", p);
        }
        for p in automaton.letters().iter() {
            assert!(
                inputs.contains(p) || outputs.contains(p),
                "{} is neither an input nor an output",
                p
            );
        }

        Self {
            automaton,
            inputs,
            outputs,
        }
    }

    /// One-player game: every letter is controlled, so winning means non-emptiness.
    pub fn satisfiability(automaton: Automaton<N>) -> Self {
        let outputs = automaton.letters().to_vec();
        Self::new(automaton, Vec::new(), outputs)
    }

    pub fn automaton(&self) -> &Automaton<N> {
        &self.automaton
    }
    pub fn inputs(&self) -> &[Proposition] {
        &self.inputs
    }
    pub fn outputs(&self) -> &[Proposition] {
        &self.outputs
    }
}

#[derive(Debug, Clone)]
pub struct Outcome<N> {
    pub verdict: Tribool,
    /// Number of steps applied after the initial region.
    pub iterations: usize,
    /// Successive regions; `layers[0]` is `finals`, the last one the winning region.
    pub layers: Vec<N>,
}

impl<N: Copy> Outcome<N> {
    pub fn winning(&self) -> N {
        self.layers[self.layers.len() - 1]
    }
}

pub struct Solver<'a, A: BooleanAlgebra> {
    mgr: &'a A,
    spec: &'a GameSpec<A::Node>,
    config: SolverConfig,
    next_variables: Vec<Proposition>,
}

impl<'a, A: BooleanAlgebra> Solver<'a, A> {
    pub fn new(mgr: &'a A, spec: &'a GameSpec<A::Node>) -> Self {
        Self::with_config(mgr, spec, SolverConfig::default())
    }

    pub fn with_config(mgr: &'a A, spec: &'a GameSpec<A::Node>, config: SolverConfig) -> Self {
        Self {
            mgr,
            spec,
            config,
            next_variables: spec.automaton.next_variables(),
        }
    }

    /// One application of the controllable-predecessor operator.
    ///
    /// ```text
    /// step(None)    = finals
    /// step(Some(p)) = p ∨ ∀inputs. ∃outputs. ∃V'. (trans ∧ p[V ↦ V'])
    /// ```
    pub fn step(&self, previous: Option<A::Node>) -> A::Node {
        let aut = &self.spec.automaton;
        let Some(previous) = previous else {
            return aut.finals();
        };

        let mgr = self.mgr;
        let target = mgr.prime(previous, aut.variables());
        let successor = mgr.rel_product(&self.next_variables, aut.trans(), target);
        let controlled = mgr.forall(&self.spec.inputs, mgr.exists(&self.spec.outputs, successor));
        mgr.or(previous, controlled)
    }

    /// `∀V. (fp → prevfp)`: valid once the region has stopped growing.
    pub fn test(&self, fp: A::Node, prevfp: A::Node) -> A::Node {
        self.mgr.forall(self.spec.automaton.variables(), self.mgr.implies(fp, prevfp))
    }

    /// `∃V. (fp ∧ init)`: valid iff some initial state is winning.
    pub fn win(&self, fp: A::Node) -> A::Node {
        let aut = &self.spec.automaton;
        self.mgr.exists(aut.variables(), self.mgr.and(fp, aut.init()))
    }

    /// Iterate [`step`][Solver::step] until the region stops growing or the
    /// iteration cap is reached.
    ///
    /// With garbage collection enabled, only the automaton and the layers
    /// survive a collection: other nodes of the same algebra held by the
    /// caller may be invalidated.
    pub fn run(&self) -> Outcome<A::Node> {
        info!(
            "Solving the game (fixpoint): {} inputs, {} outputs, {} state variables",
            self.spec.inputs.len(),
            self.spec.outputs.len(),
            self.spec.automaton.variables().len()
        );

        let mut layers = vec![self.step(None)];
        let mut iterations = 0;

        let verdict = loop {
            let prevfp = layers[layers.len() - 1];

            if let Some(max) = self.config.max_iterations {
                if iterations >= max {
                    // Regions only grow, so a winning initial state stays winning.
                    break if self.mgr.is_valid(self.win(prevfp)) {
                        Tribool::True
                    } else {
                        Tribool::Undef
                    };
                }
            }

            let fp = self.step(Some(prevfp));
            iterations += 1;

            if self.mgr.is_valid(self.test(fp, prevfp)) {
                break Tribool::from(self.mgr.is_valid(self.win(prevfp)));
            }

            debug!("k = {}, region size {}", iterations, self.mgr.size(fp));
            layers.push(fp);
            self.collect_garbage(&layers);
        };

        info!("Done after {} iterations: {}", iterations, verdict);
        Outcome {
            verdict,
            iterations,
            layers,
        }
    }

    fn collect_garbage(&self, layers: &[A::Node]) {
        if !self.config.collect_garbage || !self.mgr.needs_collection() {
            return;
        }
        let aut = &self.spec.automaton;
        let mut roots = vec![aut.init(), aut.trans(), aut.finals()];
        roots.extend_from_slice(layers);
        self.mgr.collect_garbage(&roots);
    }

    /// A sequence of letter valuations leading from an initial state into
    /// `finals`, following the layers of a winning `outcome`.
    ///
    /// Returns `None` if the verdict is not [`Tribool::True`].
    ///
    /// # Panics
    ///
    /// Panics if the game has inputs: a witness for those would be a strategy,
    /// not a single trace.
    pub fn witness(&self, outcome: &Outcome<A::Node>) -> Option<Vec<Vec<(Proposition, bool)>>> {
        assert!(
            self.spec.inputs.is_empty(),
            "Witness traces are only defined for games without inputs"
        );
        if outcome.verdict != Tribool::True {
            return None;
        }

        let mgr = self.mgr;
        let aut = &self.spec.automaton;
        let variables = aut.variables();
        let letters = aut.letters();

        let lowest = |state: A::Node| {
            outcome
                .layers
                .iter()
                .position(|&layer| mgr.is_sat(mgr.and(state, layer)))
        };

        let start = mgr.model(mgr.and(aut.init(), outcome.winning()))?;
        let mut state = mgr.cube(&valuation(&start, variables));
        let mut k = lowest(state)?;
        let mut trace = Vec::new();

        while k > 0 {
            let target = mgr.prime(outcome.layers[k - 1], variables);
            let edge = mgr.and_many([state, aut.trans(), target]);
            let model = mgr.model(edge)?;

            trace.push(valuation(&model, letters));
            let next = valuation(&model, &self.next_variables);
            state = mgr.unprime(mgr.cube(&next), variables);

            k = lowest(state)?;
            debug!("witness step {}: layer {}", trace.len(), k);
        }

        Some(trace)
    }
}

/// Complete a partial model over `props`; don't-cares become `false`.
fn valuation(model: &[(Proposition, bool)], props: &[Proposition]) -> Vec<(Proposition, bool)> {
    props
        .iter()
        .map(|p| {
            let value = model.iter().any(|(q, value)| q == p && *value);
            (p.clone(), value)
        })
        .collect()
}

/// Realizability of `spec`, run to the fixpoint.
pub fn solve<A: BooleanAlgebra>(mgr: &A, spec: &GameSpec<A::Node>) -> bool {
    Solver::new(mgr, spec).run().verdict == Tribool::True
}
