//! The pair-orbit strategy (spec §4.6, "P"): maintain the orbit of
//! identified position-pairs under the attached semigroup's left/right
//! Cayley graphs, via an incremental union-find. Cheap when the number of
//! non-trivial classes is small relative to the semigroup's size, since it
//! never has to build a coset table at all — it just closes the
//! already-enumerated element set under the generating pairs.
//!
//! Used both directly (attached to a user's own semigroup) and as the
//! second half of `KBP` (attached to the [`super::kb::KbWord`] quotient
//! semigroup built from a completed rewriting system).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::element::Element;
use crate::froidure_pin::FroidurePin;
use crate::todd_coxeter::CongruenceType;
use crate::word::Word;
use crate::DetHashMap;

use super::strategy::CongruenceStrategy;

pub struct PairOrbitStrategy<E: Element> {
    fp: FroidurePin<E>,
    cong_type: CongruenceType,
    nr_gens: usize,
    parent: Vec<usize>,
    rank: Vec<usize>,
    queue: VecDeque<(usize, usize)>,
    done: bool,
    cancelled: Arc<AtomicBool>,
    class_cache: Option<DetHashMap<usize, usize>>,
}

impl<E: Element> PairOrbitStrategy<E> {
    /// Build the strategy over an already-enumerated (or enumerable)
    /// semigroup, seeding the union-find with the `extra` generating
    /// pairs. The semigroup's own defining relations need no separate
    /// seeding: they're already baked into `fp`'s Cayley graphs, which is
    /// exactly what lets this strategy skip building a coset table.
    pub fn new(
        mut fp: FroidurePin<E>,
        cong_type: CongruenceType,
        nr_gens: usize,
        extra: Vec<(Word, Word)>,
    ) -> crate::froidure_pin::Result<Self> {
        fp.ensure_enumerated();
        let n = fp.current_size();
        let mut strat = PairOrbitStrategy {
            fp,
            cong_type,
            nr_gens,
            parent: (0..n).collect(),
            rank: vec![0; n],
            queue: VecDeque::new(),
            done: false,
            cancelled: Arc::new(AtomicBool::new(false)),
            class_cache: None,
        };
        for (u, v) in &extra {
            let pu = strat
                .fp
                .word_to_pos(u.letters())?
                .expect("non-empty word always has a position once enumerated");
            let pv = strat
                .fp
                .word_to_pos(v.letters())?
                .expect("non-empty word always has a position once enumerated");
            strat.union(pu, pv);
        }
        Ok(strat)
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let (small, big) = if self.rank[ra] < self.rank[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        if self.rank[ra] == self.rank[rb] {
            self.rank[big] += 1;
        }
        self.queue.push_back((small, big));
        self.class_cache = None;
    }

    /// Pop one pending pair and push the unions its images force under
    /// every generator. Returns `false` once the orbit has closed.
    fn step(&mut self) -> bool {
        let (a, b) = match self.queue.pop_front() {
            Some(pair) => pair,
            None => return false,
        };
        for g in 0..self.nr_gens {
            match self.cong_type {
                CongruenceType::Right => {
                    let ra = *self.fp.right.get(a, g);
                    let rb = *self.fp.right.get(b, g);
                    self.union(ra, rb);
                }
                CongruenceType::Left => {
                    let la = *self.fp.left.get(a, g);
                    let lb = *self.fp.left.get(b, g);
                    self.union(la, lb);
                }
                CongruenceType::TwoSided => {
                    let ra = *self.fp.right.get(a, g);
                    let rb = *self.fp.right.get(b, g);
                    self.union(ra, rb);
                    let la = *self.fp.left.get(a, g);
                    let lb = *self.fp.left.get(b, g);
                    self.union(la, lb);
                }
            }
        }
        true
    }

    fn build_class_cache(&mut self) {
        if self.class_cache.is_some() {
            return;
        }
        let n = self.fp.current_size();
        let mut map = DetHashMap::default();
        for p in 0..n {
            let r = self.find(p);
            if !map.contains_key(&r) {
                let idx = map.len();
                map.insert(r, idx);
            }
        }
        self.class_cache = Some(map);
    }
}

impl<E: Element + Send> CongruenceStrategy for PairOrbitStrategy<E> {
    fn run_steps(&mut self, steps: usize) {
        let mut count = 0;
        while !self.cancelled.load(Ordering::SeqCst) {
            if steps != crate::config::LIMIT_MAX && count >= steps {
                return;
            }
            if !self.step() {
                self.done = true;
                return;
            }
            count += 1;
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn kill(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn nr_classes(&mut self) -> usize {
        self.run_steps(crate::config::LIMIT_MAX);
        self.build_class_cache();
        self.class_cache.as_ref().unwrap().len()
    }

    fn word_to_class_index(&mut self, word: &[usize]) -> Option<usize> {
        self.run_steps(crate::config::LIMIT_MAX);
        let pos = self.fp.word_to_pos(word).ok().flatten()?;
        let root = self.find(pos);
        self.build_class_cache();
        self.class_cache.as_ref().unwrap().get(&root).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::transformation::Transformation;
    use crate::froidure_pin::FroidurePin;

    #[test]
    fn pair_orbit_agrees_with_todd_coxeter_on_a_small_congruence() {
        let f = Transformation::from_vec(3, vec![1, 2, 0]).unwrap();
        let fp = FroidurePin::new(vec![f]).unwrap();
        let extra = vec![(Word::from_letters(vec![0, 0]), Word::from_letters(vec![0]))];
        let mut strat =
            PairOrbitStrategy::new(fp, CongruenceType::TwoSided, 1, extra).unwrap();
        strat.run_steps(crate::config::LIMIT_MAX);
        assert!(strat.is_done());
        // Identifying f^2 with f collapses the 3-cycle's whole orbit into
        // a single class.
        assert_eq!(strat.nr_classes(), 1);
    }
}
