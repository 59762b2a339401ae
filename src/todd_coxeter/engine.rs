//! Coincidence propagation, tracing, the outer run loop and `compress`
//! (spec §4.5). See [`super`] for the table layout this operates on.

use crate::utils::UNDEFINED;
use crate::word::Word;
use crate::DetHashMap;

use super::{error, CosetLink, CosetT, Result, ToddCoxeter};

impl ToddCoxeter {
    /// Define a new coset `d := c . a`, recycling a freed coset if one is
    /// available.
    fn new_coset(&mut self, c: CosetT, a: usize) -> Result<CosetT> {
        let d = if self.next != UNDEFINED {
            let d = self.next;
            self.next = self.fwd[d];
            for gen in 0..self.nr_gens {
                self.table.set(d, gen, UNDEFINED);
                self.preim_init.set(d, gen, UNDEFINED);
            }
            self.link_tail(d)?;
            d
        } else {
            self.new_active_coset()?
        };
        self.table.set(c, a, d);
        self.preim_init.set(d, a, c);
        self.preim_next.set(c, a, UNDEFINED);
        Ok(d)
    }

    fn unlink_active(&mut self, c: CosetT) {
        let prev = match self.bwd[c] {
            CosetLink::Active(p) => p,
            CosetLink::Forwarded(_) => unreachable!("unlinking a coset that is already forwarded"),
        };
        let nxt = self.fwd[c];
        if prev != UNDEFINED {
            self.fwd[prev] = nxt;
        }
        if nxt != UNDEFINED {
            self.bwd[nxt] = CosetLink::Active(prev);
        }
        if self.last == c {
            self.last = prev;
        }
        if self.current == c {
            self.current = prev;
        }
        if self.current_no_add == c {
            self.current_no_add = prev;
        }
    }

    fn splice_preimage_front(&mut self, target: CosetT, a: usize, v: CosetT) {
        let old_head = *self.preim_init.get(target, a);
        self.preim_next.set(v, a, old_head);
        self.preim_init.set(target, a, v);
    }

    fn unlink_preimage(&mut self, target: CosetT, a: usize, v: CosetT) {
        let mut cur = *self.preim_init.get(target, a);
        if cur == v {
            let next = *self.preim_next.get(v, a);
            self.preim_init.set(target, a, next);
            return;
        }
        while cur != UNDEFINED {
            let nxt = *self.preim_next.get(cur, a);
            if nxt == v {
                let after = *self.preim_next.get(v, a);
                self.preim_next.set(cur, a, after);
                return;
            }
            cur = nxt;
        }
    }

    /// Merge `lhs` and `rhs` (and whatever coincidences that forces),
    /// propagating through every preimage (spec §4.5).
    pub(crate) fn identify_cosets(&mut self, lhs: CosetT, rhs: CosetT) {
        self.lhs_stack.push(lhs);
        self.rhs_stack.push(rhs);
        while let (Some(l0), Some(r0)) = (self.lhs_stack.pop(), self.rhs_stack.pop()) {
            let mut lhs = self.rep(l0);
            let mut rhs = self.rep(r0);
            if lhs == rhs {
                continue;
            }
            if lhs > rhs {
                std::mem::swap(&mut lhs, &mut rhs);
            }

            self.unlink_active(rhs);
            self.fwd[rhs] = self.next;
            self.next = rhs;
            self.bwd[rhs] = CosetLink::Forwarded(lhs);
            self.active -= 1;
            self.cosets_killed += 1;

            for a in 0..self.nr_gens {
                let mut v = *self.preim_init.get(rhs, a);
                while v != UNDEFINED {
                    let v_next = *self.preim_next.get(v, a);
                    self.table.set(v, a, lhs);
                    self.splice_preimage_front(lhs, a, v);
                    v = v_next;
                }

                let w = *self.table.get(rhs, a);
                if w != UNDEFINED {
                    self.unlink_preimage(w, a, rhs);
                    let u = *self.table.get(lhs, a);
                    if u == UNDEFINED {
                        self.table.set(lhs, a, w);
                        self.splice_preimage_front(w, a, lhs);
                    } else if u != w {
                        let (mn, mx) = if u < w { (u, w) } else { (w, u) };
                        self.lhs_stack.push(mn);
                        self.rhs_stack.push(mx);
                    }
                }
            }
        }
    }

    /// Walk all but the last letter of a relation side. `Ok(None)` means the
    /// walk ran off the edge of the table with `allow_new == false`.
    fn walk(&mut self, mut c: CosetT, letters: &[usize], allow_new: bool) -> Result<Option<CosetT>> {
        for &a in letters {
            let d = *self.table.get(c, a);
            c = if d == UNDEFINED {
                if !allow_new {
                    return Ok(None);
                }
                self.new_coset(c, a)?
            } else {
                d
            };
        }
        Ok(Some(c))
    }

    /// Apply one defining relation to coset `c` (spec §4.5, four-case
    /// table). When `allow_new` is false (the packing/lookahead phase) an
    /// incomplete trace is simply abandoned rather than defining a coset.
    pub(crate) fn trace(&mut self, c: CosetT, rel: &(Word, Word), allow_new: bool) -> Result<()> {
        let w1 = rel.0.letters();
        let w2 = rel.1.letters();
        let lhs_prefix = match self.walk(c, &w1[..w1.len() - 1], allow_new)? {
            Some(x) => x,
            None => return Ok(()),
        };
        let rhs_prefix = match self.walk(c, &w2[..w2.len() - 1], allow_new)? {
            Some(x) => x,
            None => return Ok(()),
        };
        let a = w1[w1.len() - 1];
        let b = w2[w2.len() - 1];
        let u = *self.table.get(lhs_prefix, a);
        let v = *self.table.get(rhs_prefix, b);

        match (u == UNDEFINED, v == UNDEFINED) {
            (true, true) => {
                if !allow_new {
                    return Ok(());
                }
                let d = self.new_coset(lhs_prefix, a)?;
                if !(lhs_prefix == rhs_prefix && a == b) {
                    self.table.set(rhs_prefix, b, d);
                    self.splice_preimage_front(d, b, rhs_prefix);
                }
            }
            (false, true) => {
                self.table.set(rhs_prefix, b, u);
                self.splice_preimage_front(u, b, rhs_prefix);
            }
            (true, false) => {
                self.table.set(lhs_prefix, a, v);
                self.splice_preimage_front(v, a, lhs_prefix);
            }
            (false, false) => {
                if u != v {
                    let (mn, mx) = if u < v { (u, v) } else { (v, u) };
                    self.identify_cosets(mn, mx);
                }
            }
        }
        Ok(())
    }

    /// Enumerate to completion.
    pub fn run(&mut self) -> Result<()> {
        self.run_steps(crate::config::LIMIT_MAX)
    }

    /// Perform at most `steps` relation traces (spec §4.5: "a unit is one
    /// relation-trace on one coset") and return, resumable on the next call.
    /// [`crate::config::LIMIT_MAX`] runs to completion.
    pub fn run_steps(&mut self, steps: usize) -> Result<()> {
        if self.done {
            return Ok(());
        }
        if !self.started {
            self.started = true;
            let extra = std::mem::take(&mut self.extra);
            for rel in &extra {
                self.trace(0, rel, true)?;
            }
            self.extra = extra;
            if self.relations.is_empty() {
                self.done = true;
                return Ok(());
            }
        }

        let relations = self.relations.clone();
        let mut step_count = 0usize;
        while self.current != UNDEFINED {
            if self.is_cancelled() {
                return Ok(());
            }
            for rel in &relations {
                self.trace(self.current, rel, true)?;
                step_count += 1;
                if self.current == UNDEFINED {
                    break;
                }
                // `current` is unchanged, so resuming simply re-traces the
                // rest of this coset's relation list; `trace` is a no-op on
                // edges already resolved, so this is wasted work, not wrong
                // work.
                if steps != crate::config::LIMIT_MAX && step_count >= steps {
                    return Ok(());
                }
            }
            if self.current == UNDEFINED {
                break;
            }
            if self.active > self.pack {
                self.run_packing_phase()?;
                if self.current == UNDEFINED {
                    break;
                }
            }
            if self.config.report && self.defined >= self.next_report {
                log::info!(
                    "todd-coxeter: {} active, {} defined, {} killed",
                    self.active,
                    self.defined,
                    self.cosets_killed
                );
                self.next_report += 4_000_000;
            }
            self.current = self.fwd[self.current];
        }
        self.done = true;
        Ok(())
    }

    fn run_packing_phase(&mut self) -> Result<()> {
        self.stop_packing = false;
        let relations = self.relations.clone();
        self.current_no_add = self.fwd[self.current];
        let active_before = self.active;
        while self.current_no_add != UNDEFINED && !self.stop_packing {
            if self.is_cancelled() {
                return Ok(());
            }
            for rel in &relations {
                self.trace(self.current_no_add, rel, false)?;
                if self.current_no_add == UNDEFINED {
                    break;
                }
            }
            if self.current_no_add == UNDEFINED {
                break;
            }
            self.current_no_add = self.fwd[self.current_no_add];
        }
        let kills = active_before.saturating_sub(self.active);
        if kills < 100 {
            self.stop_packing = true;
        }
        self.pack += self.pack / 10 + 1;
        Ok(())
    }

    pub(crate) fn ensure_done(&mut self) -> Result<()> {
        self.run()
    }

    /// Trace `word` from coset 0 through the completed table and return the
    /// representative of the class it lands in.
    pub fn word_to_class_index(&mut self, word: &[usize]) -> Result<usize> {
        self.ensure_done()?;
        for &letter in word {
            if letter >= self.nr_gens {
                return error::InvalidLetterSnafu {
                    letter,
                    nr_gens: self.nr_gens,
                }
                .fail();
            }
        }
        let mut letters = word.to_vec();
        if self.cong_type == super::CongruenceType::Left {
            letters.reverse();
        }
        let mut c = 0;
        for a in letters {
            let d = *self.table.get(c, a);
            if d == UNDEFINED {
                return error::IncompleteSnafu.fail();
            }
            c = d;
        }
        // After `compress`, `table` has been renumbered to dense
        // representatives directly (every cell already went through `rep`
        // when the new table was built) and `fwd`/`bwd`/`last`/`next` keep
        // their pre-compress, now-stale meaning — `rep(c)` would walk the
        // old `bwd` chain under the new numbering and can conflate two
        // distinct classes. So `c` itself is already the answer once
        // compressed; only the uncompressed table still needs `rep` to
        // resolve a coset that was identified away but not yet renumbered.
        Ok(if self.compressed { c } else { self.rep(c) })
    }

    /// Renumber cosets densely as `0..active` in reachability order from
    /// the identity coset, so query results become stable small integers.
    pub fn compress(&mut self) -> Result<()> {
        self.ensure_done()?;
        if self.compressed {
            return Ok(());
        }
        let mut mapping: DetHashMap<CosetT, CosetT> = DetHashMap::default();
        mapping.insert(0, 0);
        let mut frontier = std::collections::VecDeque::new();
        frontier.push_back(0usize);
        while let Some(c) = frontier.pop_front() {
            for a in 0..self.nr_gens {
                let d = *self.table.get(c, a);
                if d == UNDEFINED {
                    continue;
                }
                let d = self.rep(d);
                if !mapping.contains_key(&d) {
                    let idx = mapping.len();
                    mapping.insert(d, idx);
                    frontier.push_back(d);
                }
            }
        }

        let n = mapping.len();
        let mut new_table = crate::utils::PackedTable::new(self.nr_gens, n);
        for (&old, &new_idx) in mapping.iter() {
            for a in 0..self.nr_gens {
                let d = *self.table.get(old, a);
                let mapped = if d == UNDEFINED {
                    UNDEFINED
                } else {
                    let rep = self.rep(d);
                    *mapping.get(&rep).expect("reachable coset must be mapped")
                };
                new_table.set(new_idx, a, mapped);
            }
        }
        self.table = new_table;
        self.active = n;
        self.compressed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::todd_coxeter::{CongruenceType, ToddCoxeter};
    use crate::word::Word;

    fn w(letters: &[usize]) -> Word {
        Word::from_letters(letters.to_vec())
    }

    /// Two-sided congruence on the free monoid of rank 2 generated by
    /// `{(aaa, a), (a, bb)}`, no extra pairs.
    fn free_monoid_rank_2() -> ToddCoxeter {
        let relations = vec![
            (w(&[0, 0, 0]), w(&[0])),
            (w(&[0]), w(&[1, 1])),
        ];
        ToddCoxeter::new(CongruenceType::TwoSided, 2, relations, Vec::new()).unwrap()
    }

    #[test]
    fn nr_classes_matches_known_presentation() {
        let mut tc = free_monoid_rank_2();
        assert_eq!(tc.nr_classes().unwrap(), 5);
    }

    #[test]
    fn word_to_class_index_matches_known_presentation() {
        let mut tc = free_monoid_rank_2();
        tc.compress().unwrap();
        assert_eq!(tc.word_to_class_index(&[0, 0, 1]).unwrap(), 4);
        assert_eq!(tc.word_to_class_index(&[0, 0, 0]).unwrap(), 0);
        assert_eq!(tc.word_to_class_index(&[1]).unwrap(), 1);
    }

    /// Builds cosets and a coincidence by hand (no relation-tracing needed)
    /// to force the exact collision `compress` must not mishandle: a dense
    /// post-compress index landing on the numeric id of a coset that was
    /// identified away pre-compress, whose `bwd` slot is now stale.
    #[test]
    fn word_to_class_index_after_compress_ignores_stale_bwd() {
        let mut tc = ToddCoxeter::new(CongruenceType::TwoSided, 1, Vec::new(), Vec::new()).unwrap();
        for _ in 0..4 {
            tc.new_active_coset().unwrap();
        }
        // Merge coset 2 into coset 1, leaving {0, 1, 3, 4} active; coset 2's
        // `bwd` slot becomes `Forwarded(1)` and is never touched again.
        tc.identify_cosets(1, 2);
        assert_eq!(tc.active_cosets(), 4);

        // A path 0 -a-> 1 -a-> 3 -a-> 4 that never touches coset 2.
        tc.table.set(0, 0, 1);
        tc.table.set(1, 0, 3);
        tc.table.set(3, 0, 4);

        tc.compress().unwrap();
        // Reachability order assigns dense index 2 to old coset 3, which
        // numerically collides with the old coset 2 forwarded above. Tracing
        // "aa" must land on that dense index directly, not on whatever
        // `rep(2)` would resolve to under the stale pre-compress `bwd`.
        assert_eq!(tc.word_to_class_index(&[0, 0]).unwrap(), 2);
        assert_eq!(tc.word_to_class_index(&[0]).unwrap(), 1);
        assert_eq!(tc.word_to_class_index(&[]).unwrap(), 0);
    }

    #[test]
    fn run_steps_is_resumable() {
        let mut one_shot = free_monoid_rank_2();
        one_shot.run().unwrap();

        let mut resumed = free_monoid_rank_2();
        while !resumed.is_done() {
            resumed.run_steps(1).unwrap();
        }
        assert_eq!(one_shot.active_cosets(), resumed.active_cosets());
    }

    #[test]
    fn kill_stops_enumeration_cooperatively() {
        let tc = free_monoid_rank_2();
        let token = tc.cancellation_token();
        token.store(true, std::sync::atomic::Ordering::SeqCst);
        let mut tc = tc;
        tc.run().unwrap();
        assert!(!tc.is_done());
    }

    #[test]
    fn prefilled_table_round_trips_through_compress() {
        use crate::utils::PackedTable;

        let mut table = PackedTable::new(1, 2);
        table.set(0, 0, 1);
        table.set(1, 0, 1);
        let mut tc = ToddCoxeter::with_prefilled_table(
            CongruenceType::TwoSided,
            1,
            Vec::new(),
            table,
            Config::default(),
        )
        .unwrap();
        tc.run().unwrap();
        assert_eq!(tc.nr_classes().unwrap(), 1);
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use crate::todd_coxeter::{CongruenceType, ToddCoxeter};
    use crate::word::Word;

    const NR_GENS: usize = 2;
    /// Bounded so genuinely non-terminating presentations give up instead of
    /// hanging the test; `prop_assume!` then discards those cases.
    const STEP_BUDGET: usize = 10_000;

    fn small_word() -> impl Strategy<Value = Word> {
        proptest::collection::vec(0..NR_GENS, 1..=3).prop_map(|letters| Word::from_letters(letters))
    }

    proptest! {
        /// Property 6: for every completed Todd-Coxeter instance,
        /// `nr_classes == active - 1`, `word_to_class_index` is
        /// deterministic, every class index is in range, and equal words
        /// land in the same class.
        #[test]
        fn completed_presentation_gives_a_consistent_partition(
            relations in proptest::collection::vec((small_word(), small_word()), 0..=2),
            w1 in small_word(),
            w2 in small_word(),
        ) {
            let mut tc = ToddCoxeter::new(CongruenceType::TwoSided, NR_GENS, relations, Vec::new()).unwrap();
            tc.run_steps(STEP_BUDGET).unwrap();
            prop_assume!(tc.is_done());

            let nr_classes = tc.nr_classes().unwrap();
            prop_assert_eq!(nr_classes, tc.active_cosets() - 1);

            let i1 = tc.word_to_class_index(w1.letters()).unwrap();
            let i2 = tc.word_to_class_index(w2.letters()).unwrap();
            prop_assert!(i1 < tc.active_cosets());
            prop_assert!(i2 < tc.active_cosets());
            prop_assert_eq!(i1, tc.word_to_class_index(w1.letters()).unwrap());
            if w1 == w2 {
                prop_assert_eq!(i1, i2);
            }
        }
    }
}
