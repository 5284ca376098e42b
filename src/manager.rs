use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;

use log::debug;
use num_bigint::BigUint;

use crate::algebra::BooleanAlgebra;
use crate::alphabet::Proposition;
use crate::bdd::{Bdd, BddConfig};
use crate::reference::Ref;

/// [`BooleanAlgebra`] backed by a [`Bdd`].
///
/// Propositions are mapped to BDD variables on first use. Each proposition is
/// placed right next to its next-state copy in the variable order, which keeps
/// transition relations small.
pub struct Manager {
    bdd: Bdd,
    index: RefCell<HashMap<Proposition, u32>>,
    names: RefCell<Vec<Proposition>>,
}

impl Manager {
    pub fn new() -> Self {
        Self::with_config(BddConfig::default())
    }

    pub fn with_config(config: BddConfig) -> Self {
        Self {
            bdd: Bdd::with_config(config),
            index: RefCell::new(HashMap::new()),
            names: RefCell::new(Vec::new()),
        }
    }

    pub fn bdd(&self) -> &Bdd {
        &self.bdd
    }

    /// Number of propositions that have a BDD variable.
    pub fn num_vars(&self) -> usize {
        self.names.borrow().len()
    }

    /// BDD variable of `p`, allocating it (and its primed copies) if needed.
    pub fn var_of(&self, p: &Proposition) -> u32 {
        if let Some(&v) = self.index.borrow().get(p) {
            return v;
        }

        let base = p.unprimed();
        for n in 0..=p.primes().max(1) {
            self.intern(base.primed(n));
        }
        self.index.borrow()[p]
    }

    fn intern(&self, p: Proposition) {
        let mut index = self.index.borrow_mut();
        if index.contains_key(&p) {
            return;
        }
        let mut names = self.names.borrow_mut();
        names.push(p.clone());
        let v = names.len() as u32;
        debug!("variable {} is {}", v, p);
        index.insert(p, v);
    }

    pub fn proposition_of(&self, v: u32) -> Proposition {
        assert_ne!(v, 0, "Variable index should not be zero");
        self.names.borrow()[v as usize - 1].clone()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("bdd", &self.bdd)
            .field("num_vars", &self.num_vars())
            .finish()
    }
}

impl BooleanAlgebra for Manager {
    type Node = Ref;

    fn top(&self) -> Ref {
        self.bdd.one()
    }

    fn bottom(&self) -> Ref {
        self.bdd.zero()
    }

    fn variable(&self, p: &Proposition) -> Ref {
        self.bdd.mk_var(self.var_of(p))
    }

    fn not(&self, f: Ref) -> Ref {
        self.bdd.apply_not(f)
    }

    fn and(&self, f: Ref, g: Ref) -> Ref {
        self.bdd.apply_and(f, g)
    }

    fn or(&self, f: Ref, g: Ref) -> Ref {
        self.bdd.apply_or(f, g)
    }

    fn implies(&self, f: Ref, g: Ref) -> Ref {
        self.bdd.apply_imply(f, g)
    }

    fn iff(&self, f: Ref, g: Ref) -> Ref {
        self.bdd.apply_eq(f, g)
    }

    fn and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        self.bdd.apply_and_many(nodes)
    }

    fn or_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        self.bdd.apply_or_many(nodes)
    }

    fn exists(&self, vars: &[Proposition], f: Ref) -> Ref {
        let vars: Vec<u32> = vars.iter().map(|p| self.var_of(p)).collect();
        self.bdd.exists(f, &vars)
    }

    fn forall(&self, vars: &[Proposition], f: Ref) -> Ref {
        let vars: Vec<u32> = vars.iter().map(|p| self.var_of(p)).collect();
        self.bdd.forall(f, &vars)
    }

    fn rel_product(&self, vars: &[Proposition], f: Ref, g: Ref) -> Ref {
        let vars: Vec<u32> = vars.iter().map(|p| self.var_of(p)).collect();
        self.bdd.rel_product(f, g, &vars)
    }

    fn rename(&self, f: Ref, pairs: &[(Proposition, Proposition)]) -> Ref {
        let perm: HashMap<u32, u32> = pairs
            .iter()
            .map(|(from, to)| (self.var_of(from), self.var_of(to)))
            .collect();
        self.bdd.rename_vars(f, &perm)
    }

    fn restrict(&self, f: Ref, p: &Proposition, value: bool) -> Ref {
        self.bdd.substitute(f, self.var_of(p), value)
    }

    fn model(&self, f: Ref) -> Option<Vec<(Proposition, bool)>> {
        let lits = self.bdd.one_sat(f)?;
        Some(
            lits.into_iter()
                .map(|lit| (self.proposition_of(lit.var()), lit.is_positive()))
                .collect(),
        )
    }

    fn support(&self, f: Ref) -> Vec<Proposition> {
        self.bdd
            .support(f)
            .into_iter()
            .map(|v| self.proposition_of(v))
            .collect()
    }

    fn count_models(&self, f: Ref, over: &[Proposition]) -> BigUint {
        let over: Vec<u32> = over.iter().map(|p| self.var_of(p)).collect();
        for v in self.bdd.support(f) {
            assert!(over.contains(&v), "{} is not among the counted propositions", self.proposition_of(v));
        }

        // Count over every allocated variable, then drop the factor contributed
        // by the variables outside `over`.
        let total = self.num_vars();
        let mut distinct = over.clone();
        distinct.sort_unstable();
        distinct.dedup();
        self.bdd.sat_count(f, total) >> (total - distinct.len())
    }

    fn size(&self, f: Ref) -> u64 {
        self.bdd.size(f)
    }

    fn cube(&self, literals: &[(Proposition, bool)]) -> Ref {
        self.bdd.cube(literals.iter().map(|(p, value)| {
            let v = self.var_of(p) as i32;
            if *value {
                v
            } else {
                -v
            }
        }))
    }

    /// More than half of the node storage is in use.
    fn needs_collection(&self) -> bool {
        2 * self.bdd.num_nodes() > self.bdd.capacity()
    }

    fn collect_garbage(&self, roots: &[Ref]) {
        self.bdd.collect_garbage(roots);
    }
}
