//! The congruence orchestrator (spec §4.6): given a generator count, a
//! relation list and an extra (generating-pair) list, optionally attached
//! to a [`FroidurePin`] semigroup, select and drive one of five strategy
//! kinds to completion, then answer class-index queries against it.
//!
//! Has no direct teacher equivalent — the teacher carries no congruence
//! machinery at all — so this is grounded in spec §4.6/§4.7 directly,
//! reusing [`crate::todd_coxeter::ToddCoxeter`], [`FroidurePin`] and
//! [`crate::parallel::race`] as its building blocks rather than
//! introducing a sixth engine.

pub mod error;
pub mod kb;
pub mod pair_orbit;
pub mod strategy;

use std::sync::Arc;

use itertools::Itertools;
use snafu::{OptionExt, ResultExt};

use crate::config::Config;
use crate::element::Element;
use crate::froidure_pin::{FroidurePin, Relation};
use crate::rewriting::RewritingSystem;
use crate::todd_coxeter::{CongruenceType, ToddCoxeter};
use crate::utils::PackedTable;
use crate::word::Word;
use crate::DetHashMap;

pub use error::{CongruenceError, Result};
use error::{FroidurePinSnafu, InvalidLetterSnafu, NoGeneratorsSnafu, NotAttachedSnafu, RewritingSnafu, ToddCoxeterSnafu};
use kb::KbWord;
use pair_orbit::PairOrbitStrategy;
use strategy::{CongruenceStrategy, KbfpStrategy, TcStrategy};

/// Which of the five strategy data kinds (spec §4.6) was or will be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Tc,
    TcPrefill,
    PairOrbit,
    Kbp,
    Kbfp,
}

struct Selected {
    kind: StrategyKind,
    strat: Box<dyn CongruenceStrategy>,
}

/// A congruence on a finitely generated semigroup (or on the free
/// semigroup/monoid, if never attached): type, generator count, defining
/// relations and extra (generating) pairs, plus — once queried — the
/// winning strategy that answers class-index questions.
pub struct Congruence<E: Element> {
    cong_type: CongruenceType,
    nr_gens: usize,
    relations: Vec<(Word, Word)>,
    extra: Vec<(Word, Word)>,
    attached: Option<FroidurePin<E>>,
    config: Config,
    forced: Option<StrategyKind>,
    selected: Option<Selected>,
}

impl<E: Element + Send> Congruence<E> {
    /// A congruence over the free semigroup/monoid on `nr_gens` letters,
    /// with no defining relations yet (add them with [`Self::add_relation`]).
    pub fn new(cong_type: CongruenceType, nr_gens: usize) -> Result<Self> {
        Self::with_config(cong_type, nr_gens, Config::default())
    }

    pub fn with_config(cong_type: CongruenceType, nr_gens: usize, config: Config) -> Result<Self> {
        if nr_gens == 0 {
            return NoGeneratorsSnafu.fail();
        }
        Ok(Congruence {
            cong_type,
            nr_gens,
            relations: Vec::new(),
            extra: Vec::new(),
            attached: None,
            config,
            forced: None,
            selected: None,
        })
    }

    /// A congruence attached to an already-built semigroup; its defining
    /// relations are derived on demand from `fp` rather than supplied here.
    pub fn attached_to(fp: FroidurePin<E>, cong_type: CongruenceType) -> Self {
        let nr_gens = fp.nr_gens();
        Congruence {
            cong_type,
            nr_gens,
            relations: Vec::new(),
            extra: Vec::new(),
            attached: Some(fp),
            config: Config::default(),
            forced: None,
            selected: None,
        }
    }

    pub fn nr_gens(&self) -> usize {
        self.nr_gens
    }

    pub fn congruence_type(&self) -> CongruenceType {
        self.cong_type
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// Which strategy answered the last query, or `None` before the first
    /// one.
    pub fn selected_strategy(&self) -> Option<StrategyKind> {
        self.selected.as_ref().map(|s| s.kind)
    }

    fn check_word(&self, w: &Word) -> Result<()> {
        for &letter in w.letters() {
            if letter >= self.nr_gens {
                return InvalidLetterSnafu {
                    letter,
                    nr_gens: self.nr_gens,
                }
                .fail();
            }
        }
        Ok(())
    }

    /// Add a defining relation `u = v` of the underlying presentation.
    /// Invalidates any already-selected strategy.
    pub fn add_relation(&mut self, u: Word, v: Word) -> Result<()> {
        self.check_word(&u)?;
        self.check_word(&v)?;
        self.relations.push((u, v));
        self.selected = None;
        Ok(())
    }

    /// Add an extra generating pair `u = v` of the congruence itself.
    /// Invalidates any already-selected strategy.
    pub fn add_pair(&mut self, u: Word, v: Word) -> Result<()> {
        self.check_word(&u)?;
        self.check_word(&v)?;
        self.extra.push((u, v));
        self.selected = None;
        Ok(())
    }

    pub fn force_tc(&mut self) {
        self.forced = Some(StrategyKind::Tc);
        self.selected = None;
    }

    pub fn force_tc_prefill(&mut self) {
        self.forced = Some(StrategyKind::TcPrefill);
        self.selected = None;
    }

    pub fn force_p(&mut self) {
        self.forced = Some(StrategyKind::PairOrbit);
        self.selected = None;
    }

    pub fn force_kbp(&mut self) {
        self.forced = Some(StrategyKind::Kbp);
        self.selected = None;
    }

    pub fn force_kbfp(&mut self) {
        self.forced = Some(StrategyKind::Kbfp);
        self.selected = None;
    }

    /// The presentation's own relations, plus — if attached — the attached
    /// semigroup's defining relations, replayed via `next_relation`.
    fn defining_relations(&mut self) -> Vec<(Word, Word)> {
        let mut rels = self.relations.clone();
        if let Some(fp) = self.attached.as_mut() {
            fp.reset_next_relation();
            while let Some(rel) = fp.next_relation() {
                match rel {
                    Relation::Duplicate(letter, first) => {
                        rels.push((
                            Word::from_letters(vec![letter]),
                            Word::from_letters(vec![first]),
                        ));
                    }
                    Relation::Triple(p, a, q) => {
                        let mut lhs = fp
                            .factorisation(p)
                            .expect("p came from next_relation, so it is a valid position");
                        lhs.push(a);
                        let rhs = fp
                            .factorisation(q)
                            .expect("q came from next_relation, so it is a valid position");
                        rels.push((lhs, rhs));
                    }
                }
            }
        }
        rels
    }

    fn build_tc(&mut self) -> Result<Box<dyn CongruenceStrategy>> {
        let relations = self.defining_relations();
        let tc = ToddCoxeter::with_config(
            self.cong_type,
            self.nr_gens,
            relations,
            self.extra.clone(),
            self.config,
        )
        .context(ToddCoxeterSnafu)?;
        Ok(Box::new(TcStrategy(tc)))
    }

    /// Prefill the coset table directly from the attached semigroup's right
    /// Cayley graph, shifted by one so coset 0 is the identity coset (spec
    /// §9's "Cyclic graphs" convention) — only the extra pairs then need
    /// chasing.
    fn build_tc_prefill(&mut self) -> Result<Box<dyn CongruenceStrategy>> {
        let nr_gens = self.nr_gens;
        let cong_type = self.cong_type;
        let extra = self.extra.clone();
        let config = self.config;
        let fp = self.attached.as_mut().context(NotAttachedSnafu)?;
        fp.ensure_enumerated();
        let n = fp.current_size();
        let mut table = PackedTable::new(nr_gens, n + 1);
        for a in 0..nr_gens {
            let pos = fp
                .word_to_pos(&[a])
                .context(FroidurePinSnafu)?
                .expect("every generator letter has a position");
            table.set(0, a, pos + 1);
        }
        for p in 0..n {
            for a in 0..nr_gens {
                let q = fp.right(p, a).context(FroidurePinSnafu)?;
                table.set(p + 1, a, q + 1);
            }
        }
        let tc = ToddCoxeter::with_prefilled_table(cong_type, nr_gens, extra, table, config)
            .context(ToddCoxeterSnafu)?;
        Ok(Box::new(TcStrategy(tc)))
    }

    fn build_pair_orbit(&mut self) -> Result<Box<dyn CongruenceStrategy>> {
        let cong_type = self.cong_type;
        let nr_gens = self.nr_gens;
        let extra = self.extra.clone();
        let fp = self.attached.as_ref().context(NotAttachedSnafu)?.copy();
        let strat = PairOrbitStrategy::new(fp, cong_type, nr_gens, extra).context(FroidurePinSnafu)?;
        Ok(Box::new(strat))
    }

    /// Relations ∪ extra, completed by a bounded Knuth-Bendix pass (spec
    /// §4.4); shared by the KBP and KBFP builders.
    fn build_rewriting_system(&mut self) -> Result<RewritingSystem> {
        let mut rules = self.defining_relations();
        rules.extend(self.extra.clone());
        let rules: Vec<(Word, Word)> = rules.into_iter().unique().collect();
        let mut rs = RewritingSystem::new();
        rs.add_rules(rules).context(RewritingSnafu)?;
        let cancel = std::sync::atomic::AtomicBool::new(false);
        rs.knuth_bendix(&cancel);
        Ok(rs)
    }

    fn kb_quotient(&mut self) -> Result<FroidurePin<KbWord>> {
        let rs = Arc::new(self.build_rewriting_system()?);
        let nr_gens = self.nr_gens;
        let gens: Vec<KbWord> = (0..nr_gens)
            .map(|a| KbWord::new(rs.clone(), nr_gens, Word::from_letters(vec![a])))
            .collect();
        FroidurePin::with_config(gens, self.config).context(FroidurePinSnafu)
    }

    fn build_kbfp(&mut self) -> Result<Box<dyn CongruenceStrategy>> {
        let fp = self.kb_quotient()?;
        Ok(Box::new(KbfpStrategy(fp)))
    }

    /// Knuth-Bendix first, then Pair-orbit over the reduced-word quotient —
    /// the extra pairs are already folded into the rewriting rules, so the
    /// orbit only needs to re-partition under the (possibly one-sided)
    /// congruence type.
    fn build_kbp(&mut self) -> Result<Box<dyn CongruenceStrategy>> {
        let cong_type = self.cong_type;
        let nr_gens = self.nr_gens;
        let fp = self.kb_quotient()?;
        let strat =
            PairOrbitStrategy::new(fp, cong_type, nr_gens, Vec::new()).context(FroidurePinSnafu)?;
        Ok(Box::new(strat))
    }

    fn build(&mut self, kind: StrategyKind) -> Result<Box<dyn CongruenceStrategy>> {
        match kind {
            StrategyKind::Tc => self.build_tc(),
            StrategyKind::TcPrefill => self.build_tc_prefill(),
            StrategyKind::PairOrbit => self.build_pair_orbit(),
            StrategyKind::Kbp => self.build_kbp(),
            StrategyKind::Kbfp => self.build_kbfp(),
        }
    }

    /// Selection (spec §4.6): a forced strategy is used as-is; otherwise
    /// attached congruences race TC against TC-prefill, and presentations
    /// alone race TC against KBFP.
    fn candidate_kinds(&self) -> Vec<StrategyKind> {
        if let Some(kind) = self.forced {
            return vec![kind];
        }
        if self.attached.is_some() {
            vec![StrategyKind::Tc, StrategyKind::TcPrefill]
        } else {
            vec![StrategyKind::Tc, StrategyKind::Kbfp]
        }
    }

    fn ensure_selected(&mut self) -> Result<()> {
        if self.selected.is_some() {
            return Ok(());
        }
        let kinds = self.candidate_kinds();
        let mut strategies = Vec::with_capacity(kinds.len());
        for &kind in &kinds {
            strategies.push(self.build(kind)?);
        }
        let winner = crate::parallel::race(&mut strategies);
        let strat = strategies.into_iter().nth(winner).expect("winner is a valid index");
        self.selected = Some(Selected {
            kind: kinds[winner],
            strat,
        });
        Ok(())
    }

    /// Select (if necessary), run the winning strategy to completion, and
    /// return its class count.
    pub fn nr_classes(&mut self) -> Result<usize> {
        self.ensure_selected()?;
        Ok(self.selected.as_mut().unwrap().strat.nr_classes())
    }

    /// The class index of `word`, or `None` only for the empty word when no
    /// identity has been found (mirroring [`FroidurePin::word_to_pos`]).
    pub fn word_to_class_index(&mut self, word: &[usize]) -> Result<Option<usize>> {
        for &letter in word {
            if letter >= self.nr_gens {
                return InvalidLetterSnafu {
                    letter,
                    nr_gens: self.nr_gens,
                }
                .fail();
            }
        }
        self.ensure_selected()?;
        Ok(self.selected.as_mut().unwrap().strat.word_to_class_index(word))
    }

    /// Cooperatively cancel the selected strategy. A no-op before
    /// selection: racing itself runs every candidate to completion (spec
    /// §4.7), so by the time a strategy is selected there is nothing left
    /// to interrupt.
    pub fn kill(&self) {
        if let Some(sel) = &self.selected {
            sel.strat.kill();
        }
    }

    /// Partition the attached semigroup's elements by congruence class,
    /// dropping singleton classes (spec §4.6's base implementation).
    pub fn nontrivial_classes(&mut self) -> Result<Vec<Vec<usize>>> {
        self.ensure_selected()?;
        let fp = self.attached.as_mut().context(NotAttachedSnafu)?;
        fp.ensure_enumerated();
        let n = fp.current_size();
        let mut words = Vec::with_capacity(n);
        for p in 0..n {
            words.push(fp.factorisation(p).context(FroidurePinSnafu)?);
        }

        let strat = &mut self.selected.as_mut().unwrap().strat;
        let mut by_class: DetHashMap<usize, Vec<usize>> = DetHashMap::default();
        for (p, w) in words.into_iter().enumerate() {
            if let Some(idx) = strat.word_to_class_index(w.letters()) {
                by_class.entry(idx).or_default().push(p);
            }
        }
        let mut classes: Vec<Vec<usize>> = by_class.into_values().filter(|c| c.len() > 1).collect();
        classes.sort_by(|a, b| a[0].cmp(&b[0]));
        Ok(classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::transformation::Transformation;

    fn w(letters: &[usize]) -> Word {
        Word::from_letters(letters.to_vec())
    }

    /// Spec S4: two-sided congruence on the free monoid of rank 2 with
    /// relations `{(aaa, a), (a, bb)}` and no extra pairs.
    #[test]
    fn forced_tc_matches_the_free_monoid_scenario() {
        let mut cong = Congruence::<Transformation>::new(CongruenceType::TwoSided, 2).unwrap();
        cong.force_tc();
        cong.add_relation(w(&[0, 0, 0]), w(&[0])).unwrap();
        cong.add_relation(w(&[0]), w(&[1, 1])).unwrap();
        assert_eq!(cong.nr_classes().unwrap(), 5);
        assert_eq!(cong.word_to_class_index(&[0, 0, 1]).unwrap(), Some(4));
        assert_eq!(cong.word_to_class_index(&[0, 0, 0]).unwrap(), Some(0));
        assert_eq!(cong.word_to_class_index(&[1]).unwrap(), Some(1));
        assert_eq!(cong.selected_strategy(), Some(StrategyKind::Tc));
    }

    #[test]
    fn tc_and_tc_prefill_agree_on_an_attached_semigroup() {
        let f = Transformation::from_vec(3, vec![1, 2, 0]).unwrap();
        let fp = FroidurePin::new(vec![f]).unwrap();

        let mut via_tc = Congruence::attached_to(fp.copy(), CongruenceType::TwoSided);
        via_tc.force_tc();
        via_tc
            .add_pair(w(&[0, 0]), w(&[0]))
            .unwrap();

        let mut via_prefill = Congruence::attached_to(fp, CongruenceType::TwoSided);
        via_prefill.force_tc_prefill();
        via_prefill
            .add_pair(w(&[0, 0]), w(&[0]))
            .unwrap();

        assert_eq!(via_tc.nr_classes().unwrap(), via_prefill.nr_classes().unwrap());
        assert_eq!(
            via_tc.nontrivial_classes().unwrap(),
            via_prefill.nontrivial_classes().unwrap()
        );
    }

    #[test]
    fn kbfp_identifies_words_that_rewrite_to_the_same_normal_form() {
        let mut cong = Congruence::<Transformation>::new(CongruenceType::TwoSided, 1).unwrap();
        cong.force_kbfp();
        cong.add_relation(w(&[0, 0, 0]), w(&[0])).unwrap();

        let a = cong.word_to_class_index(&[0, 0]).unwrap();
        let b = cong.word_to_class_index(&[0, 0, 0, 0]).unwrap();
        assert_eq!(a, b);
        assert_eq!(cong.selected_strategy(), Some(StrategyKind::Kbfp));
    }

    #[test]
    fn out_of_range_letter_is_rejected() {
        let mut cong = Congruence::<Transformation>::new(CongruenceType::TwoSided, 2).unwrap();
        let err = cong.add_relation(w(&[0]), w(&[5])).unwrap_err();
        assert!(matches!(err, CongruenceError::InvalidLetter { letter: 5, nr_gens: 2 }));
    }

    #[test]
    fn pair_orbit_requires_an_attached_semigroup() {
        let mut cong = Congruence::<Transformation>::new(CongruenceType::TwoSided, 2).unwrap();
        cong.force_p();
        let err = cong.nr_classes().unwrap_err();
        assert!(matches!(err, CongruenceError::NotAttached));
    }
}
