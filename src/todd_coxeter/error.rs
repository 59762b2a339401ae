use snafu::Snafu;

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum ToddCoxeterError {
    #[snafu(display("at least one relation or extra pair is required to have non-empty words"))]
    EmptyRelationWord,

    #[snafu(display("letter {} out of range: only {} generators", letter, nr_gens))]
    InvalidLetter { letter: usize, nr_gens: usize },

    #[snafu(display(
        "prefill table has {} columns but nr_gens is {}",
        columns,
        nr_gens
    ))]
    MalformedPrefillTable { columns: usize, nr_gens: usize },

    #[snafu(display("enumeration saturated the coset index space at {} cosets", count))]
    Saturated { count: usize },

    #[snafu(display("enumeration has not completed; call run() first"))]
    Incomplete,
}

pub type Result<T> = std::result::Result<T, ToddCoxeterError>;
