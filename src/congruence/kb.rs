//! `KbWord`: the [`Element`] that lets the KBP/KBFP strategies reuse
//! [`crate::froidure_pin::FroidurePin`] directly over Knuth-Bendix-reduced
//! words, rather than hand-rolling a second enumeration engine for the
//! rewriting-system quotient. Each word carries a shared handle to the
//! [`RewritingSystem`] it was reduced under, so `product_into` can
//! concatenate-then-rewrite without any engine-level plumbing.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::element::Element;
use crate::rewriting::RewritingSystem;
use crate::word::Word;

#[derive(Clone)]
pub struct KbWord {
    rs: Arc<RewritingSystem>,
    nr_gens: usize,
    word: Word,
}

impl KbWord {
    pub fn new(rs: Arc<RewritingSystem>, nr_gens: usize, word: Word) -> Self {
        KbWord { rs, nr_gens, word }
    }
}

impl PartialEq for KbWord {
    fn eq(&self, other: &Self) -> bool {
        self.word == other.word
    }
}

impl Eq for KbWord {}

impl Hash for KbWord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.word.hash(state);
    }
}

impl Element for KbWord {
    fn degree(&self) -> usize {
        self.nr_gens
    }

    fn complexity(&self) -> usize {
        self.word.len().max(1)
    }

    fn identity_of(&self) -> Self {
        KbWord {
            rs: self.rs.clone(),
            nr_gens: self.nr_gens,
            word: Word::empty(),
        }
    }

    fn product_into(dst: &mut Self, a: &Self, b: &Self, _thread_id: usize) {
        let mut letters = a.word.letters().to_vec();
        letters.extend_from_slice(b.word.letters());
        let mut scratch = Vec::new();
        let reduced = a.rs.rewrite(&Word::from_letters(letters), &mut scratch);
        dst.rs = a.rs.clone();
        dst.nr_gens = a.nr_gens;
        dst.word = reduced;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_into_rewrites_the_concatenation() {
        let mut rs = RewritingSystem::new();
        rs.add_rules(vec![(Word::from_letters(vec![0, 0, 0]), Word::from_letters(vec![0]))])
            .unwrap();
        let rs = Arc::new(rs);
        let a = KbWord::new(rs.clone(), 1, Word::from_letters(vec![0, 0]));
        let b = KbWord::new(rs.clone(), 1, Word::from_letters(vec![0]));
        let mut dst = a.clone();
        KbWord::product_into(&mut dst, &a, &b, 0);
        assert_eq!(dst, KbWord::new(rs, 1, Word::from_letters(vec![0])));
    }
}
