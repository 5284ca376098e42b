//! # synth-rs: temporal-logic realizability on symbolic automata
//!
//! **`synth-rs`** decides satisfiability and realizability of temporal formulas
//! over finite traces. A formula is translated into a *symbolic automaton*
//! (states, transitions and acceptance are Boolean functions, not explicit
//! graphs), and a two-player game over that automaton is solved with a
//! backward fixpoint.
//!
//! ## Pipeline
//!
//! 1. [`formula`]: the supported fragment (propositional connectives, `X`, `wX`, `F`, `G`).
//! 2. [`translate`]: formula → [`Automaton`][crate::automaton::Automaton], built from small
//!    latch automata combined with the [`automaton`] algebra (product, sum, negation,
//!    semi-determinization, non-emptiness monitor).
//! 3. [`fixpoint`]: the game solver. The environment picks the inputs, the controller the
//!    outputs; the controller wins if it can force the automaton into an accepting state.
//!
//! All Boolean reasoning goes through the [`BooleanAlgebra`][crate::algebra::BooleanAlgebra]
//! trait. The crate ships one backend, [`Manager`][crate::manager::Manager], built on a
//! reduced ordered BDD with complement edges ([`bdd`]).
//!
//! ## Basic Usage
//!
//! ```rust
//! use synth_rs::alphabet::Proposition;
//! use synth_rs::check::{is_realizable, is_satisfiable};
//! use synth_rs::formula::Formula;
//! use synth_rs::manager::Manager;
//!
//! let mgr = Manager::new();
//!
//! let req = Formula::atom("req");
//! let grant = Formula::atom("grant");
//!
//! // F req is satisfiable.
//! assert!(is_satisfiable(&mgr, &req.clone().eventually()));
//!
//! // G (req -> grant) is realizable when the controller owns `grant`.
//! let f = req.implies(grant).always();
//! let inputs = [Proposition::letter("req")];
//! let outputs = [Proposition::letter("grant")];
//! assert!(is_realizable(&mgr, &f, &inputs, &outputs));
//! ```
//!
//! ## BDD layer
//!
//! The [`bdd`] module can be used on its own:
//!
//! ```rust
//! use synth_rs::bdd::Bdd;
//!
//! let bdd = Bdd::default();
//! let x1 = bdd.mk_var(1);
//! let x2 = bdd.mk_var(2);
//! let f = bdd.apply_and(x1, -x2);
//!
//! assert!(!bdd.is_zero(f));
//! assert!(bdd.is_one(bdd.substitute(bdd.substitute(f, 1, true), 2, false)));
//! ```

pub mod algebra;
pub mod alphabet;
pub mod automaton;
pub mod bdd;
pub mod cache;
pub mod check;
pub mod fixpoint;
pub mod formula;
pub mod manager;
pub mod reference;
pub mod sat;
pub mod table;
pub mod translate;
pub mod types;
pub mod utils;
