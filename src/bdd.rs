//! Reduced ordered BDDs with complement edges.
//!
//! The manager owns all nodes; users hold lightweight [`Ref`] handles.
//! Variable `v` sits at level `v`, so smaller indices are closer to the root.
//! Terminals carry variable `0`.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use log::{debug, trace};

use crate::cache::Cache;
use crate::reference::Ref;
use crate::table::Table;
use crate::utils::{pairing3, MyHash};

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
struct Node {
    variable: u32,
    low: Ref,
    high: Ref,
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        pairing3(self.variable as u64, self.low.as_lit(), self.high.as_lit())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum OpKey {
    Ite(Ref, Ref, Ref),
}

impl MyHash for OpKey {
    fn hash(&self) -> u64 {
        match self {
            OpKey::Ite(f, g, h) => pairing3(f.as_lit(), g.as_lit(), h.as_lit()),
        }
    }
}

/// Sizing of the node storage and the operation cache.
#[derive(Debug, Copy, Clone)]
pub struct BddConfig {
    /// Node storage holds `2^storage_bits` nodes.
    pub storage_bits: usize,
    /// Computed table holds `2^cache_bits` entries.
    pub cache_bits: usize,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self {
            storage_bits: 20,
            cache_bits: 16,
        }
    }
}

impl BddConfig {
    pub fn with_storage_bits(mut self, storage_bits: usize) -> Self {
        self.storage_bits = storage_bits;
        self
    }

    pub fn with_cache_bits(mut self, cache_bits: usize) -> Self {
        self.cache_bits = cache_bits;
        self
    }
}

pub struct Bdd {
    storage: RefCell<Table<Node>>,
    cache: RefCell<Cache<OpKey, Ref>>,
    zero: Ref,
    one: Ref,
}

impl Bdd {
    pub fn with_config(config: BddConfig) -> Self {
        assert!(
            config.storage_bits <= 31,
            "Storage bits should be in the range 0..=31"
        );

        let mut storage = Table::new(config.storage_bits);

        // Allocate the terminal node:
        let one = storage.add(Node::default());
        assert_eq!(one, 1); // Make sure the terminal node is (1).
        let one = Ref::positive(one as u32);

        Self {
            storage: RefCell::new(storage),
            cache: RefCell::new(Cache::new(config.cache_bits)),
            zero: -one,
            one,
        }
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::with_config(BddConfig::default())
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.borrow();
        let cache = self.cache.borrow();
        f.debug_struct("Bdd")
            .field("capacity", &storage.capacity())
            .field("size", &storage.size())
            .field("cache_hits", &cache.hits())
            .field("cache_misses", &cache.misses())
            .finish()
    }
}

impl Bdd {
    pub fn zero(&self) -> Ref {
        self.zero
    }
    pub fn one(&self) -> Ref {
        self.one
    }

    /// Maximum number of nodes the storage can hold.
    pub fn capacity(&self) -> usize {
        self.storage.borrow().capacity()
    }

    /// Number of nodes currently allocated (including the terminal).
    pub fn num_nodes(&self) -> usize {
        self.storage.borrow().size()
    }

    pub fn variable(&self, index: u32) -> u32 {
        self.storage.borrow()[index as usize].variable
    }
    pub fn low(&self, index: u32) -> Ref {
        self.storage.borrow()[index as usize].low
    }
    pub fn high(&self, index: u32) -> Ref {
        self.storage.borrow()[index as usize].high
    }

    pub fn low_node(&self, node: Ref) -> Ref {
        let low = self.low(node.index());
        if node.is_negated() {
            -low
        } else {
            low
        }
    }
    pub fn high_node(&self, node: Ref) -> Ref {
        let high = self.high(node.index());
        if node.is_negated() {
            -high
        } else {
            high
        }
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == self.zero
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node == self.one
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        self.is_zero(node) || self.is_one(node)
    }

    /// Level of the top variable; terminals sit below every variable.
    fn level(&self, node: Ref) -> u32 {
        if self.is_terminal(node) {
            u32::MAX
        } else {
            self.variable(node.index())
        }
    }

    pub fn mk_node(&self, v: u32, low: Ref, high: Ref) -> Ref {
        trace!("mk(v = {}, low = {}, high = {})", v, low, high);

        assert_ne!(v, 0, "Variable index should not be zero");
        debug_assert!(
            v < self.level(low) && v < self.level(high),
            "Variable order violated"
        );

        // Handle canonicity
        if high.is_negated() {
            return -self.mk_node(v, -low, -high);
        }

        // Handle duplicates
        if low == high {
            return low;
        }

        let i = self.storage.borrow_mut().put(Node {
            variable: v,
            low,
            high,
        });
        Ref::positive(i as u32)
    }

    pub fn mk_var(&self, v: u32) -> Ref {
        assert_ne!(v, 0, "Variable index should not be zero");
        self.mk_node(v, self.zero, self.one)
    }

    /// Build the conjunction of DIMACS-style literals.
    pub fn cube(&self, literals: impl IntoIterator<Item = i32>) -> Ref {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_by_key(|&v| v.unsigned_abs());
        literals.dedup();
        literals.reverse();
        debug!("cube(literals = {:?})", literals);

        let mut current = self.one;
        for lit in literals {
            assert_ne!(lit, 0, "Variable index should not be zero");
            let v = lit.unsigned_abs();
            if self.level(current) == v {
                // Both polarities of the same variable.
                return self.zero;
            }
            current = if lit < 0 {
                self.mk_node(v, current, self.zero)
            } else {
                self.mk_node(v, self.zero, current)
            };
        }
        current
    }

    pub fn top_cofactors(&self, node: Ref, v: u32) -> (Ref, Ref) {
        assert_ne!(v, 0, "Variable index should not be zero");

        if v < self.level(node) {
            return (node, node);
        }
        assert_eq!(v, self.level(node));
        (self.low_node(node), self.high_node(node))
    }

    /// Apply the ITE operation to the arguments.
    ///
    /// ```text
    /// ITE(x, y, z) = (x ∧ y) ∨ (¬x ∧ z)
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use synth_rs::bdd::Bdd;
    ///
    /// let bdd = Bdd::default();
    /// let x = bdd.mk_var(1);
    /// let y = bdd.mk_var(2);
    /// let z = bdd.mk_var(3);
    /// let f = bdd.apply_ite(x, y, z);
    /// let x_and_y = bdd.apply_and(x, y);
    /// let not_x_and_z = bdd.apply_and(-x, z);
    /// assert_eq!(f, bdd.apply_or(x_and_y, not_x_and_z));
    /// ```
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        trace!("apply_ite(f = {}, g = {}, h = {})", f, g, h);

        // Base cases:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        if self.is_one(f) {
            return g;
        }
        if self.is_zero(f) {
            return h;
        }

        // From now on, F is known not to be a constant.

        // More base cases:
        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        //   ite(F,0,1) => ~F
        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,~F,H) => ite(F,0,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,G,~F) => ite(F,G,1)
        if g == f || g == -f || h == f || h == -f {
            let g = if g == f {
                self.one
            } else if g == -f {
                self.zero
            } else {
                g
            };
            let h = if h == f {
                self.zero
            } else if h == -f {
                self.one
            } else {
                h
            };
            return self.apply_ite(f, g, h);
        }

        // ite(~F,G,H) => ite(F,H,G)
        let (f, g, h) = if f.is_negated() { (-f, h, g) } else { (f, g, h) };

        // ite(F,~G,H) => ~ite(F,G,~H)
        let (g, h, n) = if g.is_negated() {
            (-g, -h, true)
        } else {
            (g, h, false)
        };

        let key = OpKey::Ite(f, g, h);
        if let Some(&res) = self.cache.borrow().get(&key) {
            trace!("cache: apply_ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);
            return if n { -res } else { res };
        }

        // Determine the top variable:
        let m = self.level(f).min(self.level(g)).min(self.level(h));
        assert_ne!(m, u32::MAX);

        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);
        let (h0, h1) = self.top_cofactors(h, m);

        let e = self.apply_ite(f0, g0, h0);
        let t = self.apply_ite(f1, g1, h1);

        let res = self.mk_node(m, e, t);
        self.cache.borrow_mut().insert(key, res);

        if n {
            -res
        } else {
            res
        }
    }

    pub fn apply_not(&self, f: Ref) -> Ref {
        -f
    }

    pub fn apply_and(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, self.zero)
    }

    pub fn apply_or(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, self.one, v)
    }

    pub fn apply_eq(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, -v)
    }

    pub fn apply_imply(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, self.one)
    }

    pub fn apply_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.one;
        for node in nodes {
            res = self.apply_and(res, node);
            if self.is_zero(res) {
                break;
            }
        }
        res
    }

    pub fn apply_or_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.zero;
        for node in nodes {
            res = self.apply_or(res, node);
            if self.is_one(res) {
                break;
            }
        }
        res
    }

    // f|v<-b
    pub fn substitute(&self, f: Ref, v: u32, b: bool) -> Ref {
        assert_ne!(v, 0, "Variable index should not be zero");
        let mut cache = HashMap::new();
        self.substitute_(f, v, b, &mut cache)
    }

    fn substitute_(&self, f: Ref, v: u32, b: bool, cache: &mut HashMap<Ref, Ref>) -> Ref {
        let i = self.level(f);

        if v < i {
            // 'f' does not depend on 'v'
            return f;
        }

        if v == i {
            return if b { self.high_node(f) } else { self.low_node(f) };
        }

        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let low = self.substitute_(self.low_node(f), v, b, cache);
        let high = self.substitute_(self.high_node(f), v, b, cache);
        let res = self.mk_node(i, low, high);
        cache.insert(f, res);
        res
    }

    /// Existential quantification: `∃vars. f`.
    pub fn exists(&self, f: Ref, vars: &[u32]) -> Ref {
        debug!("exists(f = {}, vars = {:?})", f, vars);
        let vars: HashSet<u32> = vars.iter().copied().collect();
        let Some(&last) = vars.iter().max() else {
            return f;
        };
        let mut cache = HashMap::new();
        self.exists_(f, &vars, last, &mut cache)
    }

    fn exists_(&self, f: Ref, vars: &HashSet<u32>, last: u32, cache: &mut HashMap<Ref, Ref>) -> Ref {
        let v = self.level(f);
        if v > last {
            // No quantified variable below this node (terminals included).
            return f;
        }

        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let low = self.exists_(self.low_node(f), vars, last, cache);
        let res = if vars.contains(&v) {
            if self.is_one(low) {
                self.one
            } else {
                let high = self.exists_(self.high_node(f), vars, last, cache);
                self.apply_or(low, high)
            }
        } else {
            let high = self.exists_(self.high_node(f), vars, last, cache);
            self.mk_node(v, low, high)
        };
        cache.insert(f, res);
        res
    }

    /// Universal quantification: `∀vars. f = ¬∃vars. ¬f`.
    pub fn forall(&self, f: Ref, vars: &[u32]) -> Ref {
        -self.exists(-f, vars)
    }

    /// Relational product: `∃vars. f ∧ g`.
    pub fn rel_product(&self, f: Ref, g: Ref, vars: &[u32]) -> Ref {
        self.exists(self.apply_and(f, g), vars)
    }

    /// Rename variables according to `perm`; unmapped variables are kept.
    ///
    /// The mapping must be injective on the support of `f`,
    /// but it does not have to respect the variable order.
    pub fn rename_vars(&self, f: Ref, perm: &HashMap<u32, u32>) -> Ref {
        debug!("rename_vars(f = {}, perm = {:?})", f, perm);
        if perm.is_empty() {
            return f;
        }
        let mut cache = HashMap::new();
        self.rename_(f, perm, &mut cache)
    }

    fn rename_(&self, f: Ref, perm: &HashMap<u32, u32>, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if self.is_terminal(f) {
            return f;
        }
        if f.is_negated() {
            return -self.rename_(-f, perm, cache);
        }
        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let v = self.level(f);
        let low = self.rename_(self.low_node(f), perm, cache);
        let high = self.rename_(self.high_node(f), perm, cache);
        let w = perm.get(&v).copied().unwrap_or(v);
        let res = self.apply_ite(self.mk_var(w), high, low);
        cache.insert(f, res);
        res
    }

    /// Variables `f` depends on, in increasing order.
    pub fn support(&self, f: Ref) -> Vec<u32> {
        let mut vars = HashSet::new();
        let mut visited = HashSet::new();
        let mut stack = vec![f.regular()];

        while let Some(node) = stack.pop() {
            if self.is_terminal(node) || !visited.insert(node.index()) {
                continue;
            }
            vars.insert(self.level(node));
            stack.push(self.low(node.index()).regular());
            stack.push(self.high(node.index()).regular());
        }

        let mut vars: Vec<u32> = vars.into_iter().collect();
        vars.sort_unstable();
        vars
    }

    /// Number of distinct nodes reachable from `f`, the terminal included.
    pub fn size(&self, f: Ref) -> u64 {
        self.descendants([f]).len() as u64
    }

    /// Indices of all nodes reachable from `nodes`, the terminal included.
    pub fn descendants(&self, nodes: impl IntoIterator<Item = Ref>) -> HashSet<u32> {
        let mut visited = HashSet::new();
        visited.insert(self.one.index());
        let mut stack: Vec<u32> = nodes.into_iter().map(|node| node.index()).collect();

        while let Some(index) = stack.pop() {
            if !visited.insert(index) {
                continue;
            }
            stack.push(self.low(index).index());
            stack.push(self.high(index).index());
        }

        visited
    }

    /// Free every node not reachable from `roots`.
    ///
    /// Handles to freed nodes become dangling, and their indices are reused
    /// by later allocations. The computed table is cleared.
    pub fn collect_garbage(&self, roots: &[Ref]) {
        let before = self.num_nodes();
        self.cache.borrow_mut().clear();

        let alive = self.descendants(roots.iter().copied());
        let is_alive = |index: usize| alive.contains(&(index as u32));

        let mut storage = self.storage.borrow_mut();
        for bucket_index in 0..storage.num_buckets() {
            // Drop the dead prefix of the chain.
            let mut head = storage.bucket(bucket_index);
            while head != 0 && !is_alive(head) {
                let next = storage.next(head);
                storage.drop(head);
                head = next;
            }
            storage.set_bucket(bucket_index, head);

            // Unlink the dead cells behind each live one.
            let mut prev = head;
            while prev != 0 {
                let mut cur = storage.next(prev);
                while cur != 0 && !is_alive(cur) {
                    let next = storage.next(cur);
                    storage.drop(cur);
                    cur = next;
                }
                storage.set_next(prev, cur);
                prev = cur;
            }
        }

        debug!(
            "collect_garbage: {} roots, {} -> {} nodes",
            roots.len(),
            before,
            storage.size()
        );
    }
}
