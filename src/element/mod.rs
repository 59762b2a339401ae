//! The element contract consumed by both engines (spec §4.2). Generalises
//! the teacher's `SemigroupElement` trait from a single `multiply` method to
//! the full six-operation contract: equality and hash come from the
//! `Eq + Hash` supertraits, leaving `product_into`, `identity_of`,
//! `complexity`, `degree`, and the widening clone used by the closure path.

pub mod partial_perm;
pub mod transformation;

use std::hash::Hash;

/// An element of some algebraic type the engines enumerate over.
///
/// Implementors are expected to be cheap to clone (the teacher's
/// `Transformation` backs its image vector with an `Arc<[usize]>` for
/// exactly this reason) since the engine clones freely while building its
/// tables.
pub trait Element: Clone + Eq + Hash {
    /// Degree of this element (e.g. number of points a transformation acts
    /// on). Fixed for the lifetime of one enumeration run.
    fn degree(&self) -> usize;

    /// Abstract cost of computing one product involving this element, used
    /// to decide between the "multiply directly" and "trace the Cayley
    /// graph" strategies in `fast_product`/idempotent search.
    fn complexity(&self) -> usize;

    /// The identity element of the monoid containing `self` (same degree).
    fn identity_of(&self) -> Self;

    /// Write `a * b` into `dst`. `thread_id` identifies the calling worker
    /// so implementations that keep thread-local scratch space (e.g. a
    /// scratch transformation vector) can index into it; callers passing
    /// disjoint `dst` per thread get a thread-safe call.
    fn product_into(dst: &mut Self, a: &Self, b: &Self, thread_id: usize);

    /// Clone `self`, widening it to `degree() + delta` if the type supports
    /// widening (used by `add_generators`/`closure` when new generators
    /// have a larger degree than the existing semigroup). Fixed-degree
    /// types that cannot be widened should treat a nonzero `delta` as a
    /// precondition violation the caller already ruled out; the default
    /// implementation just clones for `delta == 0`.
    fn clone_widened(&self, delta_degree: usize) -> Self {
        debug_assert_eq!(delta_degree, 0, "this element type cannot be widened");
        self.clone()
    }
}
