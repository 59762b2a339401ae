//! Read-only queries over an enumerated (or partially enumerated)
//! [`FroidurePin`]. `position`/`at`/`word_to_pos` enumerate lazily in
//! `config.batch_size` steps; everything else first runs the engine to
//! completion (see DESIGN.md on why the reuse-based lazy variants described
//! for `add_generators` were not extended to every query).

use crate::element::Element;
use crate::utils::UNDEFINED;
use crate::word::Word;

use super::{error, FroidurePin, LetterT, PosT, Result};

impl<E: Element> FroidurePin<E> {
    /// Number of elements enumerated so far; runs the engine to completion
    /// first.
    pub fn size(&mut self) -> usize {
        self.ensure_enumerated();
        self.elements.len()
    }

    /// Position of `x` among the enumerated elements, enumerating further
    /// in batches until it is found or the semigroup is fully closed.
    pub fn position(&mut self, x: &E) -> Option<PosT> {
        if let Some(&p) = self.map.get(x) {
            return Some(p);
        }
        loop {
            if self.is_done() {
                return self.map.get(x).copied();
            }
            let batch = self.config.batch_size;
            self.enumerate(batch);
            if let Some(&p) = self.map.get(x) {
                return Some(p);
            }
        }
    }

    pub fn contains(&mut self, x: &E) -> bool {
        self.position(x).is_some()
    }

    /// The element at position `k`, enumerating further if needed.
    pub fn at(&mut self, k: PosT) -> Option<&E> {
        loop {
            if k < self.elements.len() {
                return self.elements.get(k);
            }
            if self.is_done() {
                return None;
            }
            let batch = self.config.batch_size;
            self.enumerate(batch);
        }
    }

    fn validate_word(&self, w: &[LetterT]) -> Result<()> {
        for &letter in w {
            if letter >= self.nr_gens() {
                return error::InvalidLetterSnafu {
                    letter,
                    nr_gens: self.nr_gens(),
                }
                .fail();
            }
        }
        Ok(())
    }

    /// Evaluate a letter sequence against the generators and return its
    /// position, or `None` for the empty word when no identity has been
    /// found.
    pub fn word_to_pos(&mut self, w: &[LetterT]) -> Result<Option<PosT>> {
        self.validate_word(w)?;
        if w.is_empty() {
            self.ensure_enumerated();
            return Ok(if self.found_one {
                Some(self.pos_one)
            } else {
                None
            });
        }
        let mut pos = self.letter_to_pos[w[0]];
        for &a in &w[1..] {
            let q = self.letter_to_pos[a];
            pos = self.fast_product(pos, q);
        }
        Ok(Some(pos))
    }

    pub fn word_to_element(&self, w: &[LetterT]) -> Result<E> {
        self.validate_word(w)?;
        if w.is_empty() {
            return Ok(self.elements[0].identity_of());
        }
        let mut acc = self.elements[self.letter_to_pos[w[0]]].clone();
        for &a in &w[1..] {
            let mut tmp = acc.clone();
            E::product_into(&mut tmp, &acc, &self.elements[self.letter_to_pos[a]], 0);
            acc = tmp;
        }
        Ok(acc)
    }

    /// The (unique, shortest-word) factorisation of the element at position
    /// `p` as a sequence of generator letters.
    pub fn factorisation(&mut self, p: PosT) -> Result<Word> {
        self.ensure_enumerated();
        if p >= self.elements.len() {
            return error::IndexOutOfRangeSnafu {
                index: p,
                size: self.elements.len(),
            }
            .fail();
        }
        let mut letters = Vec::new();
        let mut cur = p;
        loop {
            letters.push(self.first[cur]);
            if self.suffix[cur] == UNDEFINED {
                break;
            }
            cur = self.suffix[cur];
        }
        Ok(Word::from_letters(letters))
    }

    pub fn minimal_factorisation_of(&mut self, x: &E) -> Result<Word> {
        match self.position(x) {
            Some(p) => self.factorisation(p),
            None => error::NotAMemberSnafu.fail(),
        }
    }

    pub fn right(&mut self, p: PosT, a: LetterT) -> Result<PosT> {
        self.ensure_enumerated();
        self.bounds_check(p, a)?;
        Ok(*self.right.get(p, a))
    }

    pub fn left(&mut self, p: PosT, a: LetterT) -> Result<PosT> {
        self.ensure_enumerated();
        self.bounds_check(p, a)?;
        Ok(*self.left.get(p, a))
    }

    fn bounds_check(&self, p: PosT, a: LetterT) -> Result<()> {
        if p >= self.elements.len() {
            return error::IndexOutOfRangeSnafu {
                index: p,
                size: self.elements.len(),
            }
            .fail();
        }
        if a >= self.nr_gens() {
            return error::InvalidLetterSnafu {
                letter: a,
                nr_gens: self.nr_gens(),
            }
            .fail();
        }
        Ok(())
    }

    pub fn first_letter(&self, p: PosT) -> LetterT {
        self.first[p]
    }

    pub fn final_letter(&self, p: PosT) -> LetterT {
        self.final_letter[p]
    }

    pub fn prefix(&self, p: PosT) -> PosT {
        self.prefix[p]
    }

    pub fn suffix(&self, p: PosT) -> PosT {
        self.suffix[p]
    }

    pub fn length(&self, p: PosT) -> usize {
        self.length[p]
    }

    pub fn nr_rules(&mut self) -> usize {
        if let Some(n) = self.nr_rules_cache {
            return n;
        }
        self.ensure_enumerated();
        self.reset_next_relation();
        let mut n = 0;
        while self.next_relation().is_some() {
            n += 1;
        }
        self.reset_next_relation();
        self.nr_rules_cache = Some(n);
        n
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.elements.iter()
    }

    /// Compute `elements[p] * elements[q]`'s position using the
    /// reduction-walk shortcut when either operand is "simple" relative to
    /// its complexity, falling back to a direct `product_into` otherwise
    /// (spec §4.3, `fast_product`).
    pub fn fast_product(&mut self, p: PosT, q: PosT) -> PosT {
        self.ensure_enumerated();
        let cp = self.elements[p].complexity();
        let cq = self.elements[q].complexity();
        if self.length[p] < 2 * cp.max(1) || self.length[q] < 2 * cq.max(1) {
            self.product_by_reduction(p, q)
        } else {
            let mut tmp = self.elements[p].clone();
            E::product_into(&mut tmp, &self.elements[p], &self.elements[q], 0);
            *self
                .map
                .get(&tmp)
                .expect("product of two enumerated elements must itself be enumerated")
        }
    }

    /// Compute `elements[p] * elements[q]`'s position by walking the
    /// shorter operand's prefix/suffix chain through the Cayley graphs,
    /// without materialising any intermediate element (spec §4.3).
    pub fn product_by_reduction(&self, p: PosT, q: PosT) -> PosT {
        super::product_by_reduction_raw(
            p,
            q,
            &self.length,
            &self.prefix,
            &self.suffix,
            &self.first,
            &self.final_letter,
            &self.right,
            &self.left,
        )
    }
}
