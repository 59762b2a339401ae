//! The Todd-Coxeter coset enumeration engine (spec §4.5). Has no direct
//! teacher equivalent (the teacher only carries the Froidure-Pin side), so
//! this is grounded in spec §4.5/§9's description directly, using the same
//! `PackedTable`/`Config`/snafu/`log` stack as [`crate::froidure_pin`] for
//! consistency, and adopting the tagged-enum encoding spec §9 recommends
//! for the overloaded `bwd` slot instead of a signed-in-unsigned hack.

pub mod engine;
pub mod error;

use crate::config::Config;
use crate::utils::{PackedTable, UNDEFINED};
use crate::word::Word;

pub use error::{Result, ToddCoxeterError};

pub type CosetT = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CongruenceType {
    Left,
    Right,
    TwoSided,
}

/// The two meanings the teacher's C++ ancestor overloads into a single
/// signed `bwd` slot, made explicit per spec §9's "tagged enum" note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CosetLink {
    /// Coset is active; holds its predecessor in the active list
    /// (`UNDEFINED` if it has none, i.e. it's the list head).
    Active(CosetT),
    /// Coset was identified away into the given (possibly itself
    /// forwarded) coset.
    Forwarded(CosetT),
}

pub struct ToddCoxeter {
    config: Config,
    nr_gens: usize,
    cong_type: CongruenceType,
    relations: Vec<(Word, Word)>,
    extra: Vec<(Word, Word)>,

    table: PackedTable<CosetT>,
    preim_init: PackedTable<CosetT>,
    preim_next: PackedTable<CosetT>,

    fwd: Vec<CosetT>,
    bwd: Vec<CosetLink>,

    active: usize,
    defined: usize,
    cosets_killed: usize,

    current: CosetT,
    current_no_add: CosetT,
    last: CosetT,
    next: CosetT,

    lhs_stack: Vec<CosetT>,
    rhs_stack: Vec<CosetT>,

    pack: usize,
    stop_packing: bool,
    next_report: usize,

    started: bool,
    done: bool,
    compressed: bool,

    cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl ToddCoxeter {
    /// Build a Todd-Coxeter instance over a presentation: `nr_gens`
    /// generators, a relation list applied to every coset, and an extra
    /// list applied once to the identity coset.
    pub fn new(
        cong_type: CongruenceType,
        nr_gens: usize,
        relations: Vec<(Word, Word)>,
        extra: Vec<(Word, Word)>,
    ) -> Result<Self> {
        Self::with_config(cong_type, nr_gens, relations, extra, Config::default())
    }

    pub fn with_config(
        cong_type: CongruenceType,
        nr_gens: usize,
        mut relations: Vec<(Word, Word)>,
        mut extra: Vec<(Word, Word)>,
        config: Config,
    ) -> Result<Self> {
        for (u, v) in relations.iter().chain(extra.iter()) {
            if u.is_empty() || v.is_empty() {
                return error::EmptyRelationWordSnafu.fail();
            }
            for &letter in u.letters().iter().chain(v.letters()) {
                if letter >= nr_gens {
                    return error::InvalidLetterSnafu { letter, nr_gens }.fail();
                }
            }
        }

        match cong_type {
            CongruenceType::Left => {
                for (u, v) in relations.iter_mut().chain(extra.iter_mut()) {
                    *u = u.reversed();
                    *v = v.reversed();
                }
            }
            CongruenceType::Right => {}
            CongruenceType::TwoSided => {
                relations.append(&mut extra);
            }
        }

        let mut tc = ToddCoxeter {
            config,
            nr_gens,
            cong_type,
            relations,
            extra,
            table: PackedTable::new(nr_gens, 0),
            preim_init: PackedTable::new(nr_gens, 0),
            preim_next: PackedTable::new(nr_gens, 0),
            fwd: Vec::new(),
            bwd: Vec::new(),
            active: 0,
            defined: 0,
            cosets_killed: 0,
            current: 0,
            current_no_add: UNDEFINED,
            last: UNDEFINED,
            next: UNDEFINED,
            lhs_stack: Vec::new(),
            rhs_stack: Vec::new(),
            pack: 100_000,
            stop_packing: false,
            next_report: 4_000_000,
            started: false,
            done: false,
            compressed: false,
            cancelled: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
        };
        tc.new_active_coset()?;
        Ok(tc)
    }

    /// Build from a caller-supplied prefilled coset table (e.g. a
    /// Froidure-Pin Cayley graph, shifted by one so index 0 is the
    /// identity coset), rebuilding the preimage lists by a full scan.
    pub fn with_prefilled_table(
        cong_type: CongruenceType,
        nr_gens: usize,
        extra: Vec<(Word, Word)>,
        table: PackedTable<CosetT>,
        config: Config,
    ) -> Result<Self> {
        if table.nr_cols() != nr_gens {
            return error::MalformedPrefillTableSnafu {
                columns: table.nr_cols(),
                nr_gens,
            }
            .fail();
        }
        let n = table.nr_rows();
        let mut tc = Self::with_config(cong_type, nr_gens, Vec::new(), extra, config)?;
        tc.table = table;
        tc.preim_init = PackedTable::new(nr_gens, n);
        tc.preim_next = PackedTable::new(nr_gens, n);
        for r in 0..n {
            for a in 0..nr_gens {
                tc.preim_init.set(r, a, UNDEFINED);
            }
        }
        for c in 1..n {
            tc.link_tail(c)?;
        }
        for c in 0..n {
            for a in 0..nr_gens {
                let d = *tc.table.get(c, a);
                if d != UNDEFINED {
                    let head = *tc.preim_init.get(d, a);
                    tc.preim_next.set(c, a, head);
                    tc.preim_init.set(d, a, c);
                }
            }
        }
        Ok(tc)
    }

    /// Allocate a brand new row in every table and append it to the tail of
    /// the active list.
    pub(crate) fn new_active_coset(&mut self) -> Result<CosetT> {
        let c = self.fwd.len();
        if c >= UNDEFINED - 1 {
            return error::SaturatedSnafu { count: c }.fail();
        }
        self.table.add_rows(1);
        self.preim_init.add_rows(1);
        self.preim_next.add_rows(1);
        for a in 0..self.nr_gens {
            self.table.set(c, a, UNDEFINED);
            self.preim_init.set(c, a, UNDEFINED);
        }
        self.link_tail(c)?;
        Ok(c)
    }

    /// Append an already-existing row (table/preim rows present, but not
    /// yet part of the active list) to the tail of the active list. Used
    /// only by [`Self::with_prefilled_table`], where the table rows arrive
    /// pre-built.
    fn link_tail(&mut self, c: CosetT) -> Result<()> {
        if c >= UNDEFINED - 1 {
            return error::SaturatedSnafu { count: c }.fail();
        }
        self.fwd.push(UNDEFINED);
        self.bwd.push(CosetLink::Active(self.last));
        if self.last != UNDEFINED {
            self.fwd[self.last] = c;
        }
        self.last = c;
        self.active += 1;
        self.defined += 1;
        Ok(())
    }

    pub fn nr_gens(&self) -> usize {
        self.nr_gens
    }

    pub fn congruence_type(&self) -> CongruenceType {
        self.cong_type
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn active_cosets(&self) -> usize {
        self.active
    }

    /// Number of congruence classes; coset 0 (the identity class) does not
    /// count, matching the convention that classes are indexed `0..n-1`
    /// with 0 meaning "the identity's class".
    pub fn nr_classes(&mut self) -> Result<usize> {
        self.ensure_done()?;
        Ok(self.active - 1)
    }

    pub fn kill(&self) {
        self.cancelled
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn cancellation_token(&self) -> std::sync::Arc<std::sync::atomic::AtomicBool> {
        self.cancelled.clone()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Representative active coset reached by following `Forwarded` links.
    pub(crate) fn rep(&self, mut c: CosetT) -> CosetT {
        loop {
            match self.bwd[c] {
                CosetLink::Active(_) => return c,
                CosetLink::Forwarded(to) => c = to,
            }
        }
    }
}
