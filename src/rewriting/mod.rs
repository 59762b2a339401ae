//! A minimal rewriting-system facade (spec §4.4). Not a full Knuth–Bendix
//! implementation: `knuth_bendix` runs a bounded, non-length-increasing
//! completion pass and gives up rather than claiming confluence it hasn't
//! checked. Exists only to give the KBP/KBFP congruence strategies
//! something to depend on, grounded in the same `PackedTable`-free,
//! `Word`-based style as [`crate::todd_coxeter`].

pub mod error;

use crate::word::Word;

pub use error::{Result, RewritingError};

/// An oriented rule `lhs -> rhs` with `lhs` lexicographically no shorter
/// than `rhs` (so rewriting with it never grows a word).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    lhs: Word,
    rhs: Word,
}

/// A set of rewriting rules plus the completion machinery to (attempt to)
/// close them under overlaps.
#[derive(Debug, Clone, Default)]
pub struct RewritingSystem {
    rules: Vec<Rule>,
}

impl RewritingSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch of relations, orienting each pair by length (ties broken
    /// lexicographically) so the longer/lexicographically-larger side is
    /// always the one rewritten away.
    pub fn add_rules(&mut self, pairs: impl IntoIterator<Item = (Word, Word)>) -> Result<()> {
        for (u, v) in pairs {
            if u.is_empty() && v.is_empty() {
                return error::EmptyRuleSnafu.fail();
            }
            let (lhs, rhs) = orient(u, v);
            self.rules.push(Rule { lhs, rhs });
        }
        Ok(())
    }

    /// Rewrite `word` to normal form under the current rules, using
    /// `scratch` as reusable storage for the letters being assembled (the
    /// teacher's convention for hot inner loops: the caller owns the
    /// allocation across repeated calls).
    pub fn rewrite(&self, word: &Word, scratch: &mut Vec<usize>) -> Word {
        scratch.clear();
        scratch.extend_from_slice(word.letters());
        loop {
            let mut changed = false;
            'rules: for rule in &self.rules {
                let lhs = rule.lhs.letters();
                if lhs.is_empty() || lhs.len() > scratch.len() {
                    continue;
                }
                for start in 0..=(scratch.len() - lhs.len()) {
                    if &scratch[start..start + lhs.len()] == lhs {
                        scratch.splice(start..start + lhs.len(), rule.rhs.letters().iter().copied());
                        changed = true;
                        break 'rules;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        Word::from_letters(scratch.clone())
    }

    /// Attempt to close the rule set under critical-pair overlaps, for at
    /// most `max_passes` passes, checking `cancel` between rules. This is a
    /// naive O(rules^2 * length) sweep, not the full Knuth–Bendix critical
    /// pair machinery: good enough to confluence-complete small
    /// presentations, honest about giving up on the rest.
    pub fn knuth_bendix(&mut self, cancel: &std::sync::atomic::AtomicBool) {
        const MAX_PASSES: usize = 64;
        let mut scratch = Vec::new();
        for _ in 0..MAX_PASSES {
            if cancel.load(std::sync::atomic::Ordering::SeqCst) {
                return;
            }
            let mut added_any = false;
            let rules_snapshot = self.rules.clone();
            for a in &rules_snapshot {
                for b in &rules_snapshot {
                    if cancel.load(std::sync::atomic::Ordering::SeqCst) {
                        return;
                    }
                    if let Some((ia, ib)) = critical_pair(a, b) {
                        let reduced_via_a = self.rewrite(&ia, &mut scratch);
                        let reduced_via_b = self.rewrite(&ib, &mut scratch);
                        if reduced_via_a != reduced_via_b {
                            let (lhs, rhs) = orient(reduced_via_a, reduced_via_b);
                            if !self.rules.iter().any(|r| r.lhs == lhs && r.rhs == rhs) {
                                self.rules.push(Rule { lhs, rhs });
                                added_any = true;
                            }
                        }
                    }
                }
            }
            if !added_any {
                break;
            }
        }
    }

    /// Check, by brute-force overlap resolution over the current rule set,
    /// whether every critical pair already rewrites to a common word. A
    /// `false` result means either genuine non-confluence or that
    /// completion hasn't converged; callers must not treat `true` as a
    /// formal proof beyond the overlaps actually checked.
    pub fn is_confluent(&self, cancel: &std::sync::atomic::AtomicBool) -> bool {
        let mut scratch = Vec::new();
        for a in &self.rules {
            for b in &self.rules {
                if cancel.load(std::sync::atomic::Ordering::SeqCst) {
                    return false;
                }
                if let Some((ia, ib)) = critical_pair(a, b) {
                    let via_a = self.rewrite(&ia, &mut scratch);
                    let via_b = self.rewrite(&ib, &mut scratch);
                    if via_a != via_b {
                        return false;
                    }
                }
            }
        }
        true
    }

    pub fn nr_rules(&self) -> usize {
        self.rules.len()
    }
}

fn orient(u: Word, v: Word) -> (Word, Word) {
    if u.len() > v.len() || (u.len() == v.len() && u.letters() > v.letters()) {
        (u, v)
    } else {
        (v, u)
    }
}

/// If a proper suffix of `a.lhs` equals a proper prefix of `b.lhs`
/// (an overlap of the two rules), return the pair of words obtained by
/// applying `a` then `b` to the shared overlap word, one-step each:
/// `(a.rhs ++ remainder_of_b, prefix_of_a ++ b.rhs)`. Both sides still need
/// full rewriting to normal form before comparison.
fn critical_pair(a: &Rule, b: &Rule) -> Option<(Word, Word)> {
    let x = a.lhs.letters();
    let y = b.lhs.letters();
    if x.is_empty() || y.is_empty() {
        return None;
    }
    let max_k = x.len().min(y.len());
    for k in (1..=max_k).rev() {
        if x[x.len() - k..] == y[..k] {
            let mut ia = a.rhs.letters().to_vec();
            ia.extend_from_slice(&y[k..]);
            let mut ib = x[..x.len() - k].to_vec();
            ib.extend_from_slice(b.rhs.letters());
            return Some((Word::from_letters(ia), Word::from_letters(ib)));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(letters: &[usize]) -> Word {
        Word::from_letters(letters.to_vec())
    }

    #[test]
    fn rewrite_applies_rules_to_a_fixed_point() {
        let mut rs = RewritingSystem::new();
        rs.add_rules(vec![(w(&[0, 0, 0]), w(&[0]))]).unwrap();
        let mut scratch = Vec::new();
        let reduced = rs.rewrite(&w(&[0, 0, 0, 0, 0]), &mut scratch);
        assert_eq!(reduced, w(&[0]));
    }

    #[test]
    fn knuth_bendix_resolves_a_simple_overlap() {
        let mut rs = RewritingSystem::new();
        rs.add_rules(vec![(w(&[0, 0, 0]), w(&[0])), (w(&[0]), w(&[1, 1]))])
            .unwrap();
        let cancel = std::sync::atomic::AtomicBool::new(false);
        rs.knuth_bendix(&cancel);
        let mut scratch = Vec::new();
        let a = rs.rewrite(&w(&[0, 0, 1, 1]), &mut scratch);
        let b = rs.rewrite(&w(&[1, 1, 1, 1]), &mut scratch);
        assert_eq!(a, b);
    }
}
