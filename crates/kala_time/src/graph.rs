//! Directed graph of time systems with memoised conversion-path search.
//!
//! Every system declares the conversions it performs *from* itself
//! (outgoing edges) and *into* itself (incoming edges). Converting `A → B`
//! tries, in order:
//!
//! 1. an outgoing edge of `A` that ends at `B`;
//! 2. an incoming edge of `B` that starts at `A`;
//! 3. a single intermediate `X` with `A → X` outgoing and `X → B` incoming;
//! 4. recursively, every outgoing edge `A → X` followed by a search `X → B`,
//!    and every incoming edge `Y → B` preceded by a search `A → Y`.
//!
//! Candidates are ranked by summed cost, then by hop count. Remaining ties
//! keep the first candidate found, scanning edges in declaration order with
//! the outgoing scan before the incoming scan, so the chosen path is
//! deterministic. Results are memoised per `(from, to)` on the source node.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::TimeError;
use crate::instant::Instant;
use crate::system::{
    Conversion, ConversionEdge, ConvertFn, TimeSystemId, TimeSystemInfo, TimeSystemKind,
};

/// Default recursion limit of the path search.
pub const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Which end of an edge declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOwner {
    /// Declared by the source system: "I can convert myself into `to`".
    Source,
    /// Declared by the target system: "I can build myself from `from`".
    Target,
}

/// Configuration identity used to keep one node per configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemKey {
    pub kind: TimeSystemKind,
    pub identity: usize,
}

impl SystemKey {
    /// Key a system by the address of the shared configuration it wraps.
    pub fn of<T: ?Sized>(kind: TimeSystemKind, config: &Arc<T>) -> Self {
        Self {
            kind,
            identity: Arc::as_ptr(config).cast::<()>() as usize,
        }
    }
}

struct SystemNode {
    info: TimeSystemInfo,
    outgoing: Vec<Arc<ConversionEdge>>,
    incoming: Vec<Arc<ConversionEdge>>,
    paths: RwLock<HashMap<TimeSystemId, Arc<Conversion>>>,
}

/// Registry of time systems and the conversions between them.
pub struct TimeGraph {
    nodes: Vec<SystemNode>,
    keyed: HashMap<SystemKey, TimeSystemId>,
    search_depth: usize,
    pub(crate) extras: crate::standard::StandardParts,
}

impl TimeGraph {
    pub(crate) fn empty(search_depth: usize, extras: crate::standard::StandardParts) -> Self {
        Self {
            nodes: Vec::new(),
            keyed: HashMap::new(),
            search_depth,
            extras,
        }
    }

    /// Register a new time system and return its id.
    pub fn add_system(
        &mut self,
        name: impl Into<String>,
        abbreviation: impl Into<String>,
        kind: TimeSystemKind,
    ) -> TimeSystemId {
        let id = TimeSystemId(self.nodes.len() as u32);
        self.nodes.push(SystemNode {
            info: TimeSystemInfo {
                id,
                name: name.into(),
                abbreviation: abbreviation.into(),
                kind,
            },
            outgoing: Vec::new(),
            incoming: Vec::new(),
            paths: RwLock::new(HashMap::new()),
        });
        id
    }

    /// Id of the system registered for `key`, if any.
    pub fn system_for_key(&self, key: SystemKey) -> Option<TimeSystemId> {
        self.keyed.get(&key).copied()
    }

    /// Register a system keyed by its configuration.
    ///
    /// Returns the existing id and `false` when a system with the same key is
    /// already registered.
    pub fn find_or_add_system(
        &mut self,
        key: SystemKey,
        name: impl Into<String>,
        abbreviation: impl Into<String>,
    ) -> (TimeSystemId, bool) {
        if let Some(id) = self.keyed.get(&key) {
            return (*id, false);
        }
        let id = self.add_system(name, abbreviation, key.kind);
        self.keyed.insert(key, id);
        (id, true)
    }

    /// Declare a primitive conversion. `cost` is clamped to at least 1.
    pub fn add_edge<F>(
        &mut self,
        owner: EdgeOwner,
        from: TimeSystemId,
        to: TimeSystemId,
        cost: usize,
        apply: F,
    ) -> Result<(), TimeError>
    where
        F: Fn(&Instant) -> Result<Instant, TimeError> + Send + Sync + 'static,
    {
        self.check(from)?;
        self.check(to)?;
        self.push_edge(owner, from, to, cost, Arc::new(apply));
        Ok(())
    }

    /// Edge insertion for ids already known to be registered.
    pub(crate) fn push_edge(
        &mut self,
        owner: EdgeOwner,
        from: TimeSystemId,
        to: TimeSystemId,
        cost: usize,
        apply: Arc<ConvertFn>,
    ) {
        let edge = Arc::new(ConversionEdge {
            from,
            to,
            cost: cost.max(1),
            apply,
        });
        match owner {
            EdgeOwner::Source => self.nodes[from.index()].outgoing.push(edge),
            EdgeOwner::Target => self.nodes[to.index()].incoming.push(edge),
        }
        for node in &mut self.nodes {
            node.paths.get_mut().clear();
        }
    }

    fn check(&self, id: TimeSystemId) -> Result<(), TimeError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(TimeError::UnknownSystem(id))
        }
    }

    /// Descriptive data of a system.
    pub fn info(&self, id: TimeSystemId) -> Result<&TimeSystemInfo, TimeError> {
        self.check(id)?;
        Ok(&self.nodes[id.index()].info)
    }

    /// All registered systems in id order.
    pub fn systems(&self) -> impl Iterator<Item = &TimeSystemInfo> {
        self.nodes.iter().map(|n| &n.info)
    }

    /// First system with the given abbreviation.
    pub fn find_by_abbreviation(&self, abbreviation: &str) -> Option<TimeSystemId> {
        self.nodes
            .iter()
            .find(|n| n.info.abbreviation == abbreviation)
            .map(|n| n.info.id)
    }

    fn describe(&self, id: TimeSystemId) -> String {
        self.nodes
            .get(id.index())
            .map_or_else(|| id.to_string(), |n| n.info.abbreviation.clone())
    }

    /// Convert an instant into `to`.
    pub fn convert(&self, instant: &Instant, to: TimeSystemId) -> Result<Instant, TimeError> {
        if instant.system() == to {
            return Ok(*instant);
        }
        self.find_conversion(instant.system(), to)?.apply(instant)
    }

    /// Resolve (and memoise) the conversion `from → to`.
    pub fn find_conversion(
        &self,
        from: TimeSystemId,
        to: TimeSystemId,
    ) -> Result<Arc<Conversion>, TimeError> {
        self.check(from)?;
        self.check(to)?;
        if from == to {
            return Ok(Arc::new(Conversion::Identity(from)));
        }
        if let Some(hit) = self.cached(from, to) {
            trace!(from = %self.describe(from), to = %self.describe(to), "conversion cache hit");
            return Ok(hit);
        }

        let mut fixed = vec![from, to];
        let found = self
            .search(from, to, self.search_depth, &mut fixed)
            .ok_or_else(|| TimeError::NoConversion {
                from: self.describe(from),
                to: self.describe(to),
            })?;

        debug!(
            from = %self.describe(from),
            to = %self.describe(to),
            cost = found.cost(),
            hops = found.hops(),
            "resolved time-system conversion"
        );
        // Racing writers store equivalent paths; the first one wins.
        self.nodes[from.index()]
            .paths
            .write()
            .entry(to)
            .or_insert_with(|| Arc::clone(&found));
        Ok(found)
    }

    fn cached(&self, from: TimeSystemId, to: TimeSystemId) -> Option<Arc<Conversion>> {
        self.nodes[from.index()].paths.read().get(&to).cloned()
    }

    fn search(
        &self,
        from: TimeSystemId,
        to: TimeSystemId,
        depth: usize,
        fixed: &mut Vec<TimeSystemId>,
    ) -> Option<Arc<Conversion>> {
        if let Some(hit) = self.cached(from, to) {
            return Some(hit);
        }
        let src = &self.nodes[from.index()];
        let dst = &self.nodes[to.index()];

        let direct = |edges: &mut dyn Iterator<Item = &Arc<ConversionEdge>>| {
            let mut best: Option<Arc<Conversion>> = None;
            for edge in edges {
                let candidate = Arc::new(Conversion::Direct(Arc::clone(edge)));
                keep_better(&mut best, candidate);
            }
            best
        };

        if let Some(hit) = direct(&mut src.outgoing.iter().filter(|e| e.to == to)) {
            return Some(hit);
        }
        if let Some(hit) = direct(&mut dst.incoming.iter().filter(|e| e.from == from)) {
            return Some(hit);
        }

        let mut best: Option<Arc<Conversion>> = None;
        for out in &src.outgoing {
            for inc in dst.incoming.iter().filter(|inc| inc.from == out.to) {
                let candidate = Conversion::compose(
                    Arc::new(Conversion::Direct(Arc::clone(out))),
                    Arc::new(Conversion::Direct(Arc::clone(inc))),
                );
                keep_better(&mut best, Arc::new(candidate));
            }
        }
        if best.is_some() || depth == 0 {
            return best;
        }

        for out in &src.outgoing {
            let via = out.to;
            if fixed.contains(&via) {
                continue;
            }
            fixed.push(via);
            let tail = self.search(via, to, depth - 1, fixed);
            fixed.pop();
            if let Some(tail) = tail {
                let head = Arc::new(Conversion::Direct(Arc::clone(out)));
                keep_better(&mut best, Arc::new(Conversion::compose(head, tail)));
            }
        }
        for inc in &dst.incoming {
            let via = inc.from;
            if fixed.contains(&via) {
                continue;
            }
            fixed.push(via);
            let head = self.search(from, via, depth - 1, fixed);
            fixed.pop();
            if let Some(head) = head {
                let tail = Arc::new(Conversion::Direct(Arc::clone(inc)));
                keep_better(&mut best, Arc::new(Conversion::compose(head, tail)));
            }
        }
        best
    }

    /// Every primitive edge leaving `from`, whichever end declared it.
    pub fn edges_from(&self, from: TimeSystemId) -> Vec<Arc<ConversionEdge>> {
        let Some(node) = self.nodes.get(from.index()) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = node.outgoing.iter().cloned().collect();
        for other in &self.nodes {
            edges.extend(other.incoming.iter().filter(|e| e.from == from).cloned());
        }
        edges
    }

    /// Every simple path `from → to` of at most `max_hops` edges.
    ///
    /// Diagnostic companion to [`TimeGraph::find_conversion`]; no caching.
    pub fn all_paths(
        &self,
        from: TimeSystemId,
        to: TimeSystemId,
        max_hops: usize,
    ) -> Vec<Arc<Conversion>> {
        let mut out = Vec::new();
        let mut visited = vec![from];
        self.collect_paths(None, from, to, max_hops, &mut visited, &mut out);
        out
    }

    fn collect_paths(
        &self,
        prefix: Option<Arc<Conversion>>,
        at: TimeSystemId,
        to: TimeSystemId,
        hops_left: usize,
        visited: &mut Vec<TimeSystemId>,
        out: &mut Vec<Arc<Conversion>>,
    ) {
        if hops_left == 0 {
            return;
        }
        for edge in self.edges_from(at) {
            if visited.contains(&edge.to) {
                continue;
            }
            let step = Arc::new(Conversion::Direct(Arc::clone(&edge)));
            let path = match &prefix {
                Some(p) => Arc::new(Conversion::compose(Arc::clone(p), step)),
                None => step,
            };
            if edge.to == to {
                out.push(path);
                continue;
            }
            visited.push(edge.to);
            self.collect_paths(Some(path), edge.to, to, hops_left - 1, visited, out);
            visited.pop();
        }
    }
}

fn keep_better(best: &mut Option<Arc<Conversion>>, candidate: Arc<Conversion>) {
    let better = match best {
        Some(current) => candidate.rank() < current.rank(),
        None => true,
    };
    if better {
        *best = Some(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::StandardParts;

    fn shift(ms: i64) -> impl Fn(&Instant) -> Result<Instant, TimeError> + Send + Sync {
        move |i: &Instant| Ok(i.plus_millis(ms))
    }

    fn graph_with(n: usize) -> (TimeGraph, Vec<TimeSystemId>) {
        let mut g = TimeGraph::empty(DEFAULT_SEARCH_DEPTH, StandardParts::default());
        let ids = (0..n)
            .map(|i| g.add_system(format!("S{i}"), format!("S{i}"), TimeSystemKind::Atomic))
            .collect();
        (g, ids)
    }

    #[test]
    fn direct_outgoing_edge() {
        let (mut g, s) = graph_with(2);
        g.add_edge(EdgeOwner::Source, s[0], s[1], 1, shift(7)).unwrap();
        let out = g.convert(&Instant::from_millis(s[0], 0), s[1]).unwrap();
        assert_eq!(out.millis(), 7);
        assert_eq!(out.system(), s[1]);
    }

    #[test]
    fn direct_incoming_edge() {
        let (mut g, s) = graph_with(2);
        g.add_edge(EdgeOwner::Target, s[0], s[1], 1, shift(3)).unwrap();
        let c = g.find_conversion(s[0], s[1]).unwrap();
        assert_eq!(c.hops(), 1);
        assert!(g.find_conversion(s[1], s[0]).is_err());
    }

    #[test]
    fn single_intermediate() {
        let (mut g, s) = graph_with(3);
        g.add_edge(EdgeOwner::Source, s[0], s[1], 1, shift(1)).unwrap();
        g.add_edge(EdgeOwner::Target, s[1], s[2], 1, shift(10)).unwrap();
        let c = g.find_conversion(s[0], s[2]).unwrap();
        assert_eq!(c.path(), vec![s[0], s[1], s[2]]);
        assert_eq!(c.apply(&Instant::from_millis(s[0], 0)).unwrap().millis(), 11);
    }

    #[test]
    fn recursive_chain_through_outgoing_edges() {
        let (mut g, s) = graph_with(5);
        for w in s.windows(2) {
            g.add_edge(EdgeOwner::Source, w[0], w[1], 1, shift(1)).unwrap();
        }
        let c = g.find_conversion(s[0], s[4]).unwrap();
        assert_eq!(c.hops(), 4);
        assert_eq!(c.apply(&Instant::from_millis(s[0], 0)).unwrap().millis(), 4);
    }

    #[test]
    fn cheapest_path_wins() {
        let (mut g, s) = graph_with(4);
        // Expensive direct-ish route through S1, cheap route through S2/S3.
        g.add_edge(EdgeOwner::Source, s[0], s[1], 10, shift(100)).unwrap();
        g.add_edge(EdgeOwner::Source, s[1], s[3], 10, shift(100)).unwrap();
        g.add_edge(EdgeOwner::Source, s[0], s[2], 1, shift(1)).unwrap();
        g.add_edge(EdgeOwner::Source, s[2], s[3], 1, shift(1)).unwrap();
        let c = g.find_conversion(s[0], s[3]).unwrap();
        assert_eq!(c.cost(), 2);
        assert_eq!(c.path(), vec![s[0], s[2], s[3]]);
    }

    #[test]
    fn equal_rank_keeps_first_declared() {
        let (mut g, s) = graph_with(4);
        g.add_edge(EdgeOwner::Source, s[0], s[1], 1, shift(1)).unwrap();
        g.add_edge(EdgeOwner::Source, s[0], s[2], 1, shift(2)).unwrap();
        g.add_edge(EdgeOwner::Source, s[1], s[3], 1, shift(0)).unwrap();
        g.add_edge(EdgeOwner::Source, s[2], s[3], 1, shift(0)).unwrap();
        let c = g.find_conversion(s[0], s[3]).unwrap();
        assert_eq!(c.path(), vec![s[0], s[1], s[3]]);
    }

    #[test]
    fn missing_path_reports_names() {
        let (g, s) = graph_with(2);
        match g.find_conversion(s[0], s[1]) {
            Err(TimeError::NoConversion { from, to }) => {
                assert_eq!(from, "S0");
                assert_eq!(to, "S1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cycles_terminate() {
        let (mut g, s) = graph_with(4);
        g.add_edge(EdgeOwner::Source, s[0], s[1], 1, shift(0)).unwrap();
        g.add_edge(EdgeOwner::Source, s[1], s[0], 1, shift(0)).unwrap();
        g.add_edge(EdgeOwner::Source, s[1], s[2], 1, shift(0)).unwrap();
        g.add_edge(EdgeOwner::Source, s[2], s[1], 1, shift(0)).unwrap();
        assert!(g.find_conversion(s[0], s[3]).is_err());
    }

    #[test]
    fn memoised_and_invalidated() {
        let (mut g, s) = graph_with(3);
        g.add_edge(EdgeOwner::Source, s[0], s[1], 5, shift(0)).unwrap();
        g.add_edge(EdgeOwner::Source, s[1], s[2], 5, shift(0)).unwrap();
        let first = g.find_conversion(s[0], s[2]).unwrap();
        let again = g.find_conversion(s[0], s[2]).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        g.add_edge(EdgeOwner::Source, s[0], s[2], 1, shift(0)).unwrap();
        assert_eq!(g.find_conversion(s[0], s[2]).unwrap().hops(), 1);
    }

    #[test]
    fn keyed_systems_are_unique() {
        let (mut g, _) = graph_with(0);
        let config = Arc::new(5_u8);
        let key = SystemKey::of(TimeSystemKind::Civil, &config);
        let (a, created_a) = g.find_or_add_system(key, "Civil", "C");
        let (b, created_b) = g.find_or_add_system(key, "Civil again", "C2");
        assert_eq!(a, b);
        assert!(created_a);
        assert!(!created_b);
    }

    #[test]
    fn enumerates_all_simple_paths() {
        let (mut g, s) = graph_with(3);
        g.add_edge(EdgeOwner::Source, s[0], s[2], 1, shift(0)).unwrap();
        g.add_edge(EdgeOwner::Source, s[0], s[1], 1, shift(0)).unwrap();
        g.add_edge(EdgeOwner::Target, s[1], s[2], 1, shift(0)).unwrap();
        let paths = g.all_paths(s[0], s[2], 4);
        assert_eq!(paths.len(), 2);
    }
}
