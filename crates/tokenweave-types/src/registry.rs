//! Dynamic registry of context types, aliases, and upcast edges
//!
//! The registry tracks an externally populated DAG of opaque type ids.
//! Aliases are merged with union-find, so any number of keys can denote one
//! effective type; inheritance edges carry caller-supplied converters.
//! Chain lookups are memoized (hits are hot, mutation is rare) and the whole
//! cache is invalidated on any graph change.

use crate::id::{CastFn, ContextTypeId, UpcastChain, UpcastStep};
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Shared registry of context types.
///
/// Cloning is cheap; clones observe and mutate the same graph.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    inner: Arc<RwLock<TypeGraph>>,
}

#[derive(Default)]
struct TypeGraph {
    ids: HashMap<String, u32>,
    /// First key registered for each allocated id.
    keys: Vec<String>,
    parent: Vec<u32>,
    rank: Vec<u8>,
    /// Outgoing upcast edges, keyed by the representative of the derived
    /// class; merged into the winning root on every alias union.
    edges: HashMap<u32, Vec<(u32, CastFn)>>,
    /// Memoized (from, to) chains, successes and failures alike.
    chain_cache: HashMap<(u32, u32), Option<UpcastChain>>,
}

impl TypeGraph {
    fn find(&self, mut id: u32) -> u32 {
        while self.parent[id as usize] != id {
            id = self.parent[id as usize];
        }
        id
    }

    fn find_compress(&mut self, id: u32) -> u32 {
        let root = self.find(id);
        let mut current = id;
        while self.parent[current as usize] != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }
        root
    }

    fn ensure(&mut self, key: &str) -> u32 {
        if let Some(&id) = self.ids.get(key) {
            return self.find_compress(id);
        }
        let id = self.parent.len() as u32;
        self.ids.insert(key.to_string(), id);
        self.keys.push(key.to_string());
        self.parent.push(id);
        self.rank.push(0);
        id
    }

    fn union(&mut self, a: u32, b: u32) -> bool {
        let root_a = self.find_compress(a);
        let root_b = self.find_compress(b);
        if root_a == root_b {
            return false;
        }
        let (winner, loser) = match self.rank[root_a as usize].cmp(&self.rank[root_b as usize]) {
            Ordering::Less => (root_b, root_a),
            Ordering::Greater => (root_a, root_b),
            Ordering::Equal => {
                self.rank[root_a as usize] += 1;
                (root_a, root_b)
            }
        };
        self.parent[loser as usize] = winner;
        if let Some(moved) = self.edges.remove(&loser) {
            self.edges.entry(winner).or_default().extend(moved);
        }
        true
    }

    /// Outgoing edges of a representative, targets resolved to their
    /// current representatives.
    fn outgoing(&self, rep: u32) -> impl Iterator<Item = (u32, &CastFn)> {
        self.edges
            .get(&rep)
            .into_iter()
            .flatten()
            .map(|(to, cast)| (self.find(*to), cast))
    }

    fn shortest_chain(&self, from: u32, to: u32) -> Option<UpcastChain> {
        if from == to {
            return Some(UpcastChain::empty());
        }
        let mut prev: HashMap<u32, (u32, CastFn)> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            for (next, cast) in self.outgoing(current) {
                if next == from || prev.contains_key(&next) {
                    continue;
                }
                prev.insert(next, (current, cast.clone()));
                if next == to {
                    return Some(rebuild_chain(from, to, &prev));
                }
                queue.push_back(next);
            }
        }
        None
    }
}

fn rebuild_chain(from: u32, to: u32, prev: &HashMap<u32, (u32, CastFn)>) -> UpcastChain {
    let mut steps: SmallVec<[UpcastStep; 4]> = SmallVec::new();
    let mut current = to;
    while current != from {
        let (parent, cast) = &prev[&current];
        steps.push(UpcastStep::new(
            ContextTypeId(*parent),
            ContextTypeId(current),
            cast.clone(),
        ));
        current = *parent;
    }
    steps.reverse();
    UpcastChain::from_steps(steps)
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Representative id for `key`, allocating a fresh id on first sight.
    ///
    /// Total: never fails, never panics for unseen keys.
    pub fn ensure_type_id(&self, key: &str) -> ContextTypeId {
        {
            let graph = self.inner.read();
            if let Some(&id) = graph.ids.get(key) {
                return ContextTypeId(graph.find(id));
            }
        }
        let mut graph = self.inner.write();
        let id = graph.ensure(key);
        ContextTypeId(id)
    }

    /// Representative id for an already-registered key.
    pub fn resolve(&self, key: &str) -> Option<ContextTypeId> {
        let graph = self.inner.read();
        graph.ids.get(key).map(|&id| ContextTypeId(graph.find(id)))
    }

    /// Current representative of an id.
    pub fn representative(&self, id: ContextTypeId) -> ContextTypeId {
        ContextTypeId(self.inner.read().find(id.0))
    }

    /// First key registered for the id's equivalence class.
    pub fn key_of(&self, id: ContextTypeId) -> Option<String> {
        let graph = self.inner.read();
        let root = graph.find(id.0);
        graph.keys.get(root as usize).cloned()
    }

    /// Add a directed upcast edge `derived -> base` carrying `cast`.
    ///
    /// Unknown keys are allocated. An edge between two keys of the same
    /// equivalence class is dropped (aliases need no conversion).
    pub fn register_inheritance(&self, derived: &str, base: &str, cast: CastFn) {
        let mut graph = self.inner.write();
        let d = graph.ensure(derived);
        let b = graph.ensure(base);
        if d == b {
            return;
        }
        graph.edges.entry(d).or_default().push((b, cast));
        graph.chain_cache.clear();
    }

    /// Merge the equivalence classes of the two keys.
    ///
    /// Transitive: aliasing A to B and then B to C makes A, B, and C one
    /// class with a single representative.
    pub fn register_alias(&self, alias: &str, key: &str) {
        let mut graph = self.inner.write();
        let a = graph.ensure(alias);
        let b = graph.ensure(key);
        if graph.union(a, b) {
            graph.chain_cache.clear();
        }
    }

    /// Shortest upcast chain from `from` to `to`.
    ///
    /// Equal representatives yield the trivial empty chain. `None` is the
    /// explicit no-path result; a downcast is never implied. Both outcomes
    /// are memoized until the next graph mutation.
    pub fn upcast_chain(&self, from: ContextTypeId, to: ContextTypeId) -> Option<UpcastChain> {
        {
            let graph = self.inner.read();
            let f = graph.find(from.0);
            let t = graph.find(to.0);
            if f == t {
                return Some(UpcastChain::empty());
            }
            if let Some(cached) = graph.chain_cache.get(&(f, t)) {
                return cached.clone();
            }
        }
        let mut graph = self.inner.write();
        let f = graph.find_compress(from.0);
        let t = graph.find_compress(to.0);
        if let Some(cached) = graph.chain_cache.get(&(f, t)) {
            return cached.clone();
        }
        let chain = graph.shortest_chain(f, t);
        graph.chain_cache.insert((f, t), chain.clone());
        chain
    }

    /// Every ancestor reachable from `from`, most-derived-first, paired
    /// with the converter chain leading to it.
    ///
    /// The first element is `from` itself with the identity chain. Order is
    /// breadth-first, so nearer (more-derived) ancestors come before more
    /// distant ones.
    pub fn inheritance_chain(&self, from: ContextTypeId) -> Vec<(ContextTypeId, UpcastChain)> {
        let graph = self.inner.read();
        let start = graph.find(from.0);
        let mut out: Vec<(ContextTypeId, UpcastChain)> =
            vec![(ContextTypeId(start), UpcastChain::empty())];
        let mut seen: HashSet<u32> = HashSet::from([start]);
        let mut index = 0;
        while index < out.len() {
            let (current, chain) = out[index].clone();
            for (next, cast) in graph.outgoing(current.0) {
                if seen.insert(next) {
                    let step = UpcastStep::new(current, ContextTypeId(next), cast.clone());
                    out.push((ContextTypeId(next), chain.extended(step)));
                }
            }
            index += 1;
        }
        out
    }
}
