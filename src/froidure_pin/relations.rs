//! `next_relation`/`reset_next_relation`: a defining set of relations for
//! the semigroup, replayed from the already-built tables rather than
//! recorded during enumeration (see DESIGN.md — this keeps `nr_rules`
//! exactly in sync with what this iterator emits, by construction).

use super::{FroidurePin, LetterT, PosT};
use crate::element::Element;

/// One entry of the relation stream: either a duplicate-generator
/// declaration (`gens[letter] == gens[first_letter]`) or a multiplication
/// triple `elements[p] * gens[a] == elements[q]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Duplicate(LetterT, LetterT),
    Triple(PosT, LetterT, PosT),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor {
    pub(crate) dup: usize,
    pub(crate) pos: usize,
    pub(crate) gen: usize,
}

impl<E: Element> FroidurePin<E> {
    pub fn reset_next_relation(&mut self) {
        self.relation_cursor = Cursor::default();
    }

    /// Pull the next relation in the stream, enumerating the semigroup
    /// fully on first use. Exhausts after exactly `duplicate_gens.len() +
    /// nr_rules()` calls.
    pub fn next_relation(&mut self) -> Option<Relation> {
        self.ensure_enumerated();

        if self.relation_cursor.dup < self.duplicate_gens.len() {
            let (letter, first_letter) = self.duplicate_gens[self.relation_cursor.dup];
            self.relation_cursor.dup += 1;
            return Some(Relation::Duplicate(letter, first_letter));
        }

        let nr_gens = self.nr_gens();
        while self.relation_cursor.pos < self.elements.len() {
            let p = self.relation_cursor.pos;
            while self.relation_cursor.gen < nr_gens {
                let a = self.relation_cursor.gen;
                self.relation_cursor.gen += 1;
                if !*self.reduced.get(p, a) {
                    let minimal = p < self.len_index[1]
                        || *self.reduced.get(self.suffix[p], a);
                    if minimal {
                        let q = *self.right.get(p, a);
                        return Some(Relation::Triple(p, a, q));
                    }
                }
            }
            self.relation_cursor.gen = 0;
            self.relation_cursor.pos += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::Relation;
    use crate::element::transformation::Transformation;
    use crate::froidure_pin::FroidurePin;

    #[test]
    fn relation_count_matches_nr_rules() {
        let f = Transformation::from_vec(6, vec![1, 1, 4, 5, 4, 5]).unwrap();
        let g = Transformation::from_vec(6, vec![2, 3, 2, 3, 5, 5]).unwrap();
        let mut fp = FroidurePin::new(vec![f, g]).unwrap();
        let nr_rules = fp.nr_rules();
        fp.reset_next_relation();
        let mut count = 0;
        while fp.next_relation().is_some() {
            count += 1;
        }
        assert_eq!(count, nr_rules);
    }

    #[test]
    fn duplicate_generator_surfaces_first() {
        let f = Transformation::id(3);
        let mut fp = FroidurePin::new(vec![f.clone(), f]).unwrap();
        assert_eq!(
            fp.next_relation(),
            Some(Relation::Duplicate(1, 0))
        );
    }
}
