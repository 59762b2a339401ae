use snafu::Snafu;

/// Precondition violations raised by [`super::FroidurePin`] (spec §7,
/// `PreconditionViolation`). Everything else the engine returns —
/// `position`, `word_to_pos`, `sorted_position` — is a sentinel `None`/
/// `NotFound`, never an error.
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum FroidurePinError {
    #[snafu(display("at least one generator is required"))]
    NoGenerators,

    #[snafu(display("generators have mismatching degree: {} != {}", degree1, degree2))]
    MismatchingDegree { degree1: usize, degree2: usize },

    #[snafu(display("letter {} out of range: only {} generators", letter, nr_gens))]
    InvalidLetter { letter: usize, nr_gens: usize },

    #[snafu(display("index {} out of range: only {} elements enumerated", index, size))]
    IndexOutOfRange { index: usize, size: usize },

    #[snafu(display("element is not a member of this semigroup"))]
    NotAMember,

    #[snafu(display(
        "enumeration saturated the index space at {} elements",
        count
    ))]
    Saturated { count: usize },
}

pub type Result<T> = std::result::Result<T, FroidurePinError>;
