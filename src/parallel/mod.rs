//! The parallel driver (spec §4.7): run a list of strategy objects, each in
//! its own worker thread, until the first one finishes; the winner kills
//! every sibling via its own cooperative cancellation flag.
//!
//! Grounded in the same `std::thread::scope` fan-out already used by
//! [`crate::froidure_pin::idempotents`]'s multithreaded idempotent search,
//! generalised from "every worker produces a partial result the master
//! concatenates" to "every worker runs to completion and the first one
//! wins outright" (spec §5: "explicit `std::thread`-style spawns suffice",
//! no thread pool).

use std::sync::mpsc;

/// Anything that can run to completion on its own thread and be told to
/// stop early by a sibling that got there first.
pub trait Racer: Send {
    /// Run to completion, or until [`Self::kill`] is observed.
    fn run_to_completion(&mut self);
    fn is_done(&self) -> bool;
    /// Cooperative cancellation; safe to call from any thread, including
    /// after this racer has already finished.
    fn kill(&self);
}

/// Race every racer concurrently; the first to report completion kills
/// every other racer and its index is returned. Blocks until every
/// worker thread (including the losers, once they observe cancellation)
/// has joined.
///
/// Panics if `racers` is empty — there is nothing to race.
pub fn race<R: Racer>(racers: &mut [R]) -> usize {
    assert!(!racers.is_empty(), "race requires at least one racer");
    if racers.len() == 1 {
        racers[0].run_to_completion();
        return 0;
    }

    let (tx, rx) = mpsc::channel();
    std::thread::scope(|scope| {
        for (i, racer) in racers.iter_mut().enumerate() {
            let tx = tx.clone();
            scope.spawn(move || {
                racer.run_to_completion();
                let _ = tx.send(i);
            });
        }
        drop(tx);
        let winner = rx
            .recv()
            .expect("at least one racer must report completion");
        for (i, racer) in racers.iter().enumerate() {
            if i != winner {
                racer.kill();
            }
        }
        winner
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A racer that counts down a fixed number of steps, checking the
    /// cancellation flag between each one.
    struct Counter {
        remaining: usize,
        step: usize,
        cancelled: Arc<AtomicBool>,
        done: bool,
    }

    impl Racer for Counter {
        fn run_to_completion(&mut self) {
            while self.remaining > 0 {
                if self.cancelled.load(Ordering::SeqCst) {
                    return;
                }
                self.remaining = self.remaining.saturating_sub(self.step);
                std::thread::yield_now();
            }
            self.done = true;
        }

        fn is_done(&self) -> bool {
            self.done
        }

        fn kill(&self) {
            self.cancelled.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn fastest_racer_wins_and_kills_the_rest() {
        let mut racers = vec![
            Counter {
                remaining: 10,
                step: 10,
                cancelled: Arc::new(AtomicBool::new(false)),
                done: false,
            },
            Counter {
                remaining: 1_000_000,
                step: 1,
                cancelled: Arc::new(AtomicBool::new(false)),
                done: false,
            },
        ];
        let winner = race(&mut racers);
        assert_eq!(winner, 0);
        assert!(racers[0].is_done());
    }

    #[test]
    fn single_racer_runs_without_threading() {
        let calls = Arc::new(AtomicUsize::new(0));
        struct Once(Arc<AtomicUsize>, bool);
        impl Racer for Once {
            fn run_to_completion(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
                self.1 = true;
            }
            fn is_done(&self) -> bool {
                self.1
            }
            fn kill(&self) {}
        }
        let mut racers = vec![Once(calls.clone(), false)];
        assert_eq!(race(&mut racers), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
