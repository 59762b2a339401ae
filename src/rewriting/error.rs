use snafu::Snafu;

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum RewritingError {
    #[snafu(display("a rewriting rule cannot equate the empty word with itself"))]
    EmptyRule,
}

pub type Result<T> = std::result::Result<T, RewritingError>;
