//! Lazily-built sorted-order view over the enumerated elements. Only
//! available when `E: Ord`, unlike the rest of the engine — sorting isn't
//! part of the `Element` contract itself.

use super::{error, FroidurePin, PosT, Result};
use crate::element::Element;

impl<E: Element + Ord> FroidurePin<E> {
    fn build_sorted(&mut self) {
        self.ensure_enumerated();
        if self.sorted_cache.is_some() {
            return;
        }
        let n = self.elements.len();
        let mut perm: Vec<PosT> = (0..n).collect();
        let elements = &self.elements;
        perm.sort_unstable_by(|&a, &b| elements[a].cmp(&elements[b]));
        let mut inverse = vec![0; n];
        for (rank, &pos) in perm.iter().enumerate() {
            inverse[pos] = rank;
        }
        self.sorted_cache = Some((perm, inverse));
    }

    /// The element at sorted-order rank `k`.
    pub fn sorted_at(&mut self, k: usize) -> Result<&E> {
        self.build_sorted();
        let (perm, _) = self.sorted_cache.as_ref().unwrap();
        match perm.get(k) {
            Some(&pos) => Ok(&self.elements[pos]),
            None => error::IndexOutOfRangeSnafu {
                index: k,
                size: perm.len(),
            }
            .fail(),
        }
    }

    /// The sorted-order rank of `x`, or `None` if it isn't a member.
    pub fn sorted_position(&mut self, x: &E) -> Option<usize> {
        let pos = self.position(x)?;
        self.build_sorted();
        let (_, inverse) = self.sorted_cache.as_ref().unwrap();
        Some(inverse[pos])
    }
}

#[cfg(test)]
mod tests {
    use crate::element::transformation::Transformation;
    use crate::froidure_pin::FroidurePin;

    #[test]
    fn sorted_at_is_nondecreasing() {
        let f = Transformation::from_vec(4, vec![1, 0, 2, 3]).unwrap();
        let g = Transformation::from_vec(4, vec![0, 2, 3, 1]).unwrap();
        let mut fp = FroidurePin::new(vec![f, g]).unwrap();
        let n = fp.size();
        let mut prev = fp.sorted_at(0).unwrap().clone();
        for k in 1..n {
            let cur = fp.sorted_at(k).unwrap().clone();
            assert!(prev <= cur);
            prev = cur;
        }
    }

    #[test]
    fn sorted_position_round_trips() {
        let f = Transformation::from_vec(3, vec![1, 2, 0]).unwrap();
        let mut fp = FroidurePin::new(vec![f]).unwrap();
        for k in 0..fp.size() {
            let elem = fp.sorted_at(k).unwrap().clone();
            assert_eq!(fp.sorted_position(&elem), Some(k));
        }
    }
}
