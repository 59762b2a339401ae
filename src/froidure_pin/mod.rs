//! The Froidure-Pin enumeration engine (spec §4.3). Grounded in the
//! teacher's `froidure_pin_impl.rs`, generalised from its single-pass
//! `run()` into a restartable, limit-bounded, closure-capable engine and
//! corrected to index the Cayley graphs `(element, letter) -> element`
//! (spec's `right[p][a]`) rather than the teacher's `(element, element) ->
//! letter`, which required an `O(n)` scan to answer "what does `p`
//! multiply to under `a`".

pub mod closure;
pub mod error;
pub mod idempotents;
pub mod query;
pub mod relations;
pub mod sorted;

#[cfg(test)]
mod scenarios;

use crate::config::Config;
use crate::element::Element;
use crate::utils::{PackedTable, UNDEFINED};
use crate::DetHashMap;

pub use error::{FroidurePinError, Result};
pub use relations::Relation;

/// An element's position in enumeration (BFS-by-word-length) order.
pub type PosT = usize;
/// A generator's index among the (possibly duplicated) original generator
/// list supplied to [`FroidurePin::new`].
pub type LetterT = usize;

/// Incremental breadth-first enumeration of a finitely generated semigroup,
/// together with its left/right Cayley graphs, word-length table and
/// reduced (Schreier) flags.
#[derive(Clone)]
pub struct FroidurePin<E: Element> {
    pub(crate) config: Config,

    // Original generators, letter_t-indexed, including duplicates.
    pub(crate) gens: Vec<E>,
    // letter -> pos_t of the element equal to that generator.
    pub(crate) letter_to_pos: Vec<PosT>,
    // (letter, first_letter) pairs: gens[letter] == gens[first_letter].
    pub(crate) duplicate_gens: Vec<(LetterT, LetterT)>,

    pub(crate) elements: Vec<E>,
    pub(crate) map: DetHashMap<E, PosT>,

    pub(crate) right: PackedTable<PosT>,
    pub(crate) left: PackedTable<PosT>,
    pub(crate) reduced: PackedTable<bool>,

    pub(crate) first: Vec<LetterT>,
    pub(crate) final_letter: Vec<LetterT>,
    pub(crate) prefix: Vec<PosT>,
    pub(crate) suffix: Vec<PosT>,
    pub(crate) length: Vec<usize>,

    // Traversal order. Always the identity permutation in this
    // implementation (elements are never reordered after insertion) but
    // kept as an explicit field for parity with the state model in spec
    // §3, and as the natural extension point if a future variant needed to
    // reorder.
    pub(crate) index: Vec<PosT>,
    pub(crate) len_index: Vec<usize>,

    pub(crate) pos: usize,
    pub(crate) wordlen: usize,
    pub(crate) phase_one_done: bool,

    pub(crate) found_one: bool,
    pub(crate) pos_one: PosT,

    pub(crate) nr_rules_cache: Option<usize>,

    pub(crate) is_idempotent: Vec<bool>,
    pub(crate) idempotents: Vec<PosT>,
    pub(crate) idempotents_start: PosT,

    pub(crate) sorted_cache: Option<(Vec<PosT>, Vec<PosT>)>,

    pub(crate) relation_cursor: relations::Cursor,

    pub(crate) tmp_product: E,

    pub(crate) cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl<E: Element> FroidurePin<E> {
    /// Build a new engine from a non-empty list of generators of equal
    /// degree, with default [`Config`].
    pub fn new(gens: Vec<E>) -> Result<Self> {
        Self::with_config(gens, Config::default())
    }

    pub fn with_config(gens: Vec<E>, config: Config) -> Result<Self> {
        if gens.is_empty() {
            return error::NoGeneratorsSnafu.fail();
        }
        let degree = gens[0].degree();
        for g in &gens {
            if g.degree() != degree {
                return error::MismatchingDegreeSnafu {
                    degree1: degree,
                    degree2: g.degree(),
                }
                .fail();
            }
        }

        let mut elements = Vec::new();
        let mut map = DetHashMap::default();
        let mut letter_to_pos = Vec::with_capacity(gens.len());
        let mut duplicate_gens = Vec::new();
        let mut first = Vec::new();
        let mut final_letter = Vec::new();
        let mut prefix = Vec::new();
        let mut suffix = Vec::new();
        let mut length = Vec::new();
        let mut found_one = false;
        let mut pos_one = UNDEFINED;

        for (letter, g) in gens.iter().enumerate() {
            if let Some(&existing) = map.get(g) {
                letter_to_pos.push(existing);
                let first_letter = (0..letter)
                    .find(|&l| letter_to_pos[l] == existing)
                    .expect("a prior letter must have introduced this element");
                duplicate_gens.push((letter, first_letter));
            } else {
                let pos = elements.len();
                elements.push(g.clone());
                map.insert(g.clone(), pos);
                letter_to_pos.push(pos);
                first.push(letter);
                final_letter.push(letter);
                prefix.push(UNDEFINED);
                suffix.push(UNDEFINED);
                length.push(1);
                if !found_one && *g == g.identity_of() {
                    found_one = true;
                    pos_one = pos;
                }
            }
        }

        let nr_gens = gens.len();
        let nr_distinct = elements.len();
        let right = PackedTable::new(nr_gens, nr_distinct);
        let left = PackedTable::new(nr_gens, nr_distinct);
        let reduced = PackedTable::new(nr_gens, nr_distinct);
        let index = (0..nr_distinct).collect();
        let tmp_product = elements[0].clone();

        Ok(FroidurePin {
            config,
            gens,
            letter_to_pos,
            duplicate_gens,
            elements,
            map,
            right,
            left,
            reduced,
            first,
            final_letter,
            prefix,
            suffix,
            length,
            index,
            len_index: vec![0, nr_distinct],
            pos: 0,
            wordlen: 1,
            phase_one_done: false,
            found_one,
            pos_one,
            nr_rules_cache: None,
            is_idempotent: Vec::new(),
            idempotents: Vec::new(),
            idempotents_start: 0,
            sorted_cache: None,
            relation_cursor: relations::Cursor::default(),
            tmp_product,
            cancelled: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
        })
    }

    pub fn degree(&self) -> usize {
        self.gens[0].degree()
    }

    pub fn nr_gens(&self) -> usize {
        self.gens.len()
    }

    pub fn current_size(&self) -> usize {
        self.elements.len()
    }

    pub fn is_done(&self) -> bool {
        self.phase_one_done && self.pos == self.elements.len()
    }

    /// Cooperative cancellation flag, shared with anything racing this
    /// engine (spec §4.7/§5).
    pub fn cancellation_token(&self) -> std::sync::Arc<std::sync::atomic::AtomicBool> {
        self.cancelled.clone()
    }

    pub fn kill(&self) {
        self.cancelled
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn set_batch_size(&mut self, n: usize) {
        self.config.batch_size = n;
    }

    pub fn set_max_threads(&mut self, n: usize) {
        self.config = self.config.with_max_threads(n);
    }

    pub fn reserve(&mut self, n: usize) {
        self.elements.reserve(n);
        self.map.reserve(n);
        self.first.reserve(n);
        self.final_letter.reserve(n);
        self.prefix.reserve(n);
        self.suffix.reserve(n);
        self.length.reserve(n);
        self.index.reserve(n);
    }

    /// Run the enumeration until at most `limit` new elements have been
    /// produced, or the semigroup is fully enumerated, or the cancellation
    /// flag is observed. Pass [`crate::config::LIMIT_MAX`] for full
    /// enumeration. Safe to call repeatedly; state is resumable.
    pub fn enumerate(&mut self, limit: usize) {
        if !self.phase_one_done {
            self.run_length_one_phase();
            self.phase_one_done = true;
            if self.config.report {
                log::info!(
                    "froidure-pin: length-one phase done, {} elements so far",
                    self.elements.len()
                );
            }
        }

        let start_len = self.elements.len();
        while self.pos < self.elements.len() {
            if self.is_cancelled() {
                return;
            }
            if limit != crate::config::LIMIT_MAX && self.elements.len() - start_len >= limit {
                return;
            }
            self.process_position(self.pos);
            self.pos += 1;
            if self.pos == *self.len_index.last().unwrap() {
                let layer_start = *self.len_index.last().unwrap();
                let layer_end = self.elements.len();
                self.len_index.push(layer_end);
                self.fill_left_layer(layer_start, layer_end);
                self.wordlen += 1;
                if self.config.report {
                    log::info!(
                        "froidure-pin: word length {} complete, {} elements",
                        self.wordlen - 1,
                        layer_end
                    );
                }
            }
        }
    }

    pub(crate) fn ensure_enumerated(&mut self) {
        self.enumerate(crate::config::LIMIT_MAX);
    }

    fn run_length_one_phase(&mut self) {
        let nr_distinct = self.elements.len();
        let nr_gens = self.gens.len();
        for p in 0..nr_distinct {
            for a in 0..nr_gens {
                let g = self.letter_to_pos[a];
                let mut tmp = self.elements[p].clone();
                E::product_into(&mut tmp, &self.elements[p], &self.elements[g], 0);
                if let Some(&q) = self.map.get(&tmp) {
                    self.right.set(p, a, q);
                    self.reduced.set(p, a, false);
                } else {
                    let new_pos = self.elements.len();
                    self.elements.push(tmp.clone());
                    if !self.found_one && tmp == tmp.identity_of() {
                        self.found_one = true;
                        self.pos_one = new_pos;
                    }
                    self.map.insert(tmp, new_pos);
                    self.first.push(self.first[p]);
                    self.final_letter.push(a);
                    self.prefix.push(p);
                    self.suffix.push(g);
                    self.length.push(2);
                    self.index.push(new_pos);
                    self.grow_rows_by_one();
                    self.right.set(p, a, new_pos);
                    self.reduced.set(p, a, true);
                }
            }
        }
        // Fill the left table for the generator rows themselves.
        for i in 0..nr_distinct {
            for j in 0..nr_gens {
                let val = *self.right.get(self.letter_to_pos[j], self.final_letter[i]);
                self.left.set(i, j, val);
            }
        }
        self.len_index.push(self.elements.len());
        self.fill_left_layer(nr_distinct, self.elements.len());
        self.wordlen = 2;
        self.pos = nr_distinct;
    }

    fn process_position(&mut self, p: usize) {
        let s = self.suffix[p];
        let b = self.first[p];
        let nr_gens = self.gens.len();
        for a in 0..nr_gens {
            if !*self.reduced.get(s, a) {
                let r = *self.right.get(s, a);
                let val = if self.found_one && r == self.pos_one {
                    self.letter_to_pos[b]
                } else {
                    let pr = self.prefix[r];
                    if pr != UNDEFINED {
                        let lv = *self.left.get(pr, b);
                        *self.right.get(lv, self.final_letter[r])
                    } else {
                        *self.right.get(self.letter_to_pos[b], self.final_letter[r])
                    }
                };
                self.right.set(p, a, val);
                self.reduced.set(p, a, false);
            } else {
                let g = self.letter_to_pos[a];
                E::product_into(&mut self.tmp_product, &self.elements[p], &self.elements[g], 0);
                if let Some(&q) = self.map.get(&self.tmp_product) {
                    self.right.set(p, a, q);
                    self.reduced.set(p, a, false);
                } else {
                    let new_pos = self.elements.len();
                    let new_elem = self.tmp_product.clone();
                    if !self.found_one && new_elem == new_elem.identity_of() {
                        self.found_one = true;
                        self.pos_one = new_pos;
                    }
                    self.elements.push(new_elem.clone());
                    self.map.insert(new_elem, new_pos);
                    self.first.push(b);
                    self.final_letter.push(a);
                    self.prefix.push(p);
                    self.suffix.push(*self.right.get(s, a));
                    self.length.push(self.length[p] + 1);
                    self.index.push(new_pos);
                    self.grow_rows_by_one();
                    self.right.set(p, a, new_pos);
                    self.reduced.set(p, a, true);
                }
            }
        }
    }

    fn fill_left_layer(&mut self, start: usize, end: usize) {
        let nr_gens = self.gens.len();
        for e in start..end {
            let pr = self.prefix[e];
            let b = self.final_letter[e];
            for j in 0..nr_gens {
                let lv = *self.left.get(pr, j);
                let val = *self.right.get(lv, b);
                self.left.set(e, j, val);
            }
        }
    }

    pub(crate) fn grow_cols_by_one(&mut self) {
        self.right.add_cols(1);
        self.left.add_cols(1);
        self.reduced.add_cols(1);
        let col = self.right.nr_cols() - 1;
        for r in 0..self.right.nr_rows() {
            self.right.set(r, col, UNDEFINED);
            self.left.set(r, col, UNDEFINED);
        }
    }

    fn grow_rows_by_one(&mut self) {
        let nr_gens = self.gens.len();
        self.right.add_rows(1);
        self.left.add_rows(1);
        self.reduced.add_rows(1);
        let r = self.right.nr_rows() - 1;
        for c in 0..nr_gens {
            self.right.set(r, c, UNDEFINED);
            self.left.set(r, c, UNDEFINED);
        }
    }
}

/// Free-function core of [`FroidurePin::product_by_reduction`], taking the
/// Cayley-graph tables by reference rather than `&self` so it can also run
/// inside a scoped worker thread during parallel idempotent search
/// ([`super::idempotents`]).
pub(crate) fn product_by_reduction_raw(
    p: PosT,
    q: PosT,
    length: &[usize],
    prefix: &[PosT],
    suffix: &[PosT],
    first: &[LetterT],
    final_letter: &[LetterT],
    right: &PackedTable<PosT>,
    left: &PackedTable<PosT>,
) -> PosT {
    if length[p] <= length[q] {
        let mut pp = p;
        let mut qq = q;
        while prefix[pp] != UNDEFINED {
            let letter = final_letter[pp];
            qq = *left.get(qq, letter);
            pp = prefix[pp];
        }
        *left.get(qq, final_letter[pp])
    } else {
        let mut pp = p;
        let mut qq = q;
        while suffix[qq] != UNDEFINED {
            let letter = first[qq];
            pp = *right.get(pp, letter);
            qq = suffix[qq];
        }
        *right.get(pp, first[qq])
    }
}
