use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum CongruenceError {
    #[snafu(display("at least one generator is required"))]
    NoGenerators,

    #[snafu(display("letter {} out of range: only {} generators", letter, nr_gens))]
    InvalidLetter { letter: usize, nr_gens: usize },

    #[snafu(display("this strategy requires a congruence attached to a semigroup"))]
    NotAttached,

    #[snafu(display("building a Todd-Coxeter strategy failed: {}", source))]
    ToddCoxeter {
        source: crate::todd_coxeter::ToddCoxeterError,
    },

    #[snafu(display("building a Froidure-Pin quotient failed: {}", source))]
    FroidurePin {
        source: crate::froidure_pin::FroidurePinError,
    },

    #[snafu(display("the rewriting system rejected a rule: {}", source))]
    Rewriting {
        source: crate::rewriting::RewritingError,
    },
}

pub type Result<T> = std::result::Result<T, CongruenceError>;
