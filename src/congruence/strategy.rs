//! The small contract every congruence strategy (spec §4.6) implements,
//! plus the two wrapper kinds that don't need their own module: plain
//! Todd-Coxeter (used for both the `TC` and `TC-prefill` strategy kinds —
//! they differ only in how the [`ToddCoxeter`] instance is constructed,
//! not in how it's driven) and `KBFP` (a [`FroidurePin`] over
//! Knuth-Bendix-reduced words, where each element already *is* a
//! congruence class).

use crate::froidure_pin::FroidurePin;
use crate::todd_coxeter::ToddCoxeter;

use super::kb::KbWord;

/// What the orchestrator needs from any strategy: advance it in bounded
/// steps, ask whether it's finished, accept cooperative cancellation, and
/// answer class-index queries once done.
pub trait CongruenceStrategy: Send {
    fn run_steps(&mut self, steps: usize);
    fn is_done(&self) -> bool;
    fn kill(&self);
    /// True once this strategy has observed its own cancellation flag and
    /// given up advancing. Distinct from [`Self::is_done`] — a killed
    /// strategy is not done, but [`crate::parallel::race`]'s losers must
    /// still stop driving it once cancelled rather than spin forever
    /// waiting for a completion that will never come.
    fn is_cancelled(&self) -> bool;
    fn nr_classes(&mut self) -> usize;
    fn word_to_class_index(&mut self, word: &[usize]) -> Option<usize>;
}

pub(crate) struct TcStrategy(pub(crate) ToddCoxeter);

impl CongruenceStrategy for TcStrategy {
    fn run_steps(&mut self, steps: usize) {
        // `run_steps` only errs on a saturated coset index space or an
        // invalid relation letter, both of which are precondition
        // violations ruled out at construction time; a genuine saturation
        // simply leaves the strategy perpetually not-done, which is the
        // correct observable behaviour for a trait whose `run_steps` has
        // no `Result` in its signature.
        let _ = self.0.run_steps(steps);
    }

    fn is_done(&self) -> bool {
        self.0.is_done()
    }

    fn kill(&self) {
        self.0.kill()
    }

    fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    fn nr_classes(&mut self) -> usize {
        self.0.nr_classes().unwrap_or(0)
    }

    fn word_to_class_index(&mut self, word: &[usize]) -> Option<usize> {
        self.0.word_to_class_index(word).ok()
    }
}

pub(crate) struct KbfpStrategy(pub(crate) FroidurePin<KbWord>);

impl CongruenceStrategy for KbfpStrategy {
    fn run_steps(&mut self, steps: usize) {
        self.0.enumerate(steps);
    }

    fn is_done(&self) -> bool {
        self.0.is_done()
    }

    fn kill(&self) {
        self.0.kill()
    }

    fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    fn nr_classes(&mut self) -> usize {
        self.0.size()
    }

    fn word_to_class_index(&mut self, word: &[usize]) -> Option<usize> {
        self.0.word_to_pos(word).ok().flatten()
    }
}

/// Lets [`crate::parallel::race`] drive any boxed strategy: run in fixed
/// batches until done, exactly as [`crate::froidure_pin::FroidurePin`]'s
/// own `batch_size`-bounded enumeration does.
impl crate::parallel::Racer for Box<dyn CongruenceStrategy> {
    fn run_to_completion(&mut self) {
        const STEP: usize = 65_536;
        while !self.is_done() && !self.is_cancelled() {
            self.run_steps(STEP);
        }
    }

    fn is_done(&self) -> bool {
        (**self).is_done()
    }

    fn kill(&self) {
        (**self).kill()
    }
}
