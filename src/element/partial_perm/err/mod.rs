use snafu::Snafu;

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum PartialPermError {
    #[snafu(display("images has length {} but degree is {}", len, degree))]
    WrongLength { degree: usize, len: usize },
    #[snafu(display("invalid image in {:?} for degree {}", images, degree))]
    InvalidImage {
        degree: usize,
        images: Vec<Option<usize>>,
    },
    #[snafu(display("images {:?} are not injective", images))]
    NotInjective {
        degree: usize,
        images: Vec<Option<usize>>,
    },
    #[snafu(display("invalid point {} for degree {}", point, degree))]
    InvalidPoint { degree: usize, point: usize },
    #[snafu(display("operation only defined for equal degree: {} != {}", degree1, degree2))]
    MismatchingDegree { degree1: usize, degree2: usize },
    #[snafu(display(
        "domain has length {} but codomain has length {}",
        domain_len,
        codomain_len
    ))]
    MismatchingDomainCodomain {
        domain_len: usize,
        codomain_len: usize,
    },
}
