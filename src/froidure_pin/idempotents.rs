//! Idempotent search (spec §4.3): decide per-call whether it's cheaper to
//! test `p*p == p` by direct multiplication or by the reduction walk, then
//! run it either on this thread or split across `config.max_threads`
//! threads once the search space crosses [`PARALLEL_THRESHOLD`]. Grounded
//! in the teacher's single-threaded `froidure_pin_impl.rs` idempotent scan,
//! generalised with the `std::thread::scope` fan-out spec §5 calls for.

use crate::element::Element;

use super::{product_by_reduction_raw, FroidurePin, PosT};

/// Below this many not-yet-classified elements, searching in parallel isn't
/// worth the thread spawn-up cost.
pub const PARALLEL_THRESHOLD: usize = 823_543; // 7^7, matching the teacher's
                                                // batch_size default order of
                                                // magnitude for "big" runs.

impl<E: Element + Sync> FroidurePin<E> {
    pub fn nr_idempotents(&mut self) -> usize {
        self.find_idempotents();
        self.idempotents.len()
    }

    pub fn is_idempotent(&mut self, p: PosT) -> bool {
        self.find_idempotents();
        self.is_idempotent[p]
    }

    pub fn idempotents(&mut self) -> &[PosT] {
        self.find_idempotents();
        &self.idempotents
    }

    fn find_idempotents(&mut self) {
        self.ensure_enumerated();
        let n = self.elements.len();
        let start = self.idempotents_start;
        if start >= n {
            return;
        }
        if (n - start) >= PARALLEL_THRESHOLD && self.config.max_threads > 1 {
            self.find_idempotents_parallel(start, n);
        } else {
            self.find_idempotents_serial(start, n);
        }
        self.idempotents_start = n;
    }

    fn use_multiplication(&self, start: PosT, end: PosT) -> bool {
        let complexity = self.elements[0].complexity().max(1);
        let sum_len: usize = (start..end).map(|p| self.length[p]).sum();
        (end - start) * complexity < sum_len
    }

    fn find_idempotents_serial(&mut self, start: PosT, end: PosT) {
        let use_mul = self.use_multiplication(start, end);
        self.is_idempotent.resize(end, false);
        for p in start..end {
            let is_idem = if use_mul {
                let mut tmp = self.elements[p].clone();
                E::product_into(&mut tmp, &self.elements[p], &self.elements[p], 0);
                tmp == self.elements[p]
            } else {
                self.product_by_reduction(p, p) == p
            };
            self.is_idempotent[p] = is_idem;
            if is_idem {
                self.idempotents.push(p);
            }
        }
    }

    fn find_idempotents_parallel(&mut self, start: PosT, end: PosT) {
        let use_mul = self.use_multiplication(start, end);
        let threads = self.config.max_threads.max(1);
        let chunks = balanced_chunks(start, end, &self.length, threads);

        let elements = &self.elements;
        let length = &self.length;
        let prefix = &self.prefix;
        let suffix = &self.suffix;
        let first = &self.first;
        let final_letter = &self.final_letter;
        let right = &self.right;
        let left = &self.left;

        let results: Vec<Vec<(PosT, bool)>> = std::thread::scope(|scope| {
            chunks
                .into_iter()
                .map(|range| {
                    scope.spawn(move || {
                        let mut out = Vec::with_capacity(range.len());
                        for p in range {
                            let is_idem = if use_mul {
                                let mut tmp = elements[p].clone();
                                E::product_into(&mut tmp, &elements[p], &elements[p], 0);
                                tmp == elements[p]
                            } else {
                                product_by_reduction_raw(
                                    p, p, length, prefix, suffix, first, final_letter, right,
                                    left,
                                ) == p
                            };
                            out.push((p, is_idem));
                        }
                        out
                    })
                })
                .collect::<Vec<_>>()
                .into_iter()
                .map(|h| h.join().expect("idempotent worker thread panicked"))
                .collect()
        });

        self.is_idempotent.resize(end, false);
        for chunk in results {
            for (p, is_idem) in chunk {
                self.is_idempotent[p] = is_idem;
                if is_idem {
                    self.idempotents.push(p);
                }
            }
        }
        self.idempotents.sort_unstable();
    }
}

/// Split `[start, end)` into `threads` ranges of roughly equal total
/// word-length (a proxy for per-element work), not equal element count.
fn balanced_chunks(
    start: PosT,
    end: PosT,
    length: &[usize],
    threads: usize,
) -> Vec<std::ops::Range<PosT>> {
    let total: usize = (start..end).map(|p| length[p]).sum();
    let threads = threads.min(end - start).max(1);
    let target = (total / threads).max(1);

    let mut chunks = Vec::with_capacity(threads);
    let mut chunk_start = start;
    let mut acc = 0;
    for p in start..end {
        acc += length[p];
        if acc >= target && chunks.len() + 1 < threads {
            chunks.push(chunk_start..p + 1);
            chunk_start = p + 1;
            acc = 0;
        }
    }
    if chunk_start < end {
        chunks.push(chunk_start..end);
    }
    chunks
}
