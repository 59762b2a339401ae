//! Partial permutations of degree `n`: injective partial maps `0..n -> 0..n`.
//! Grounded in the same `Arc`-backed-vector pattern as
//! [`crate::element::transformation::Transformation`], generalised to allow
//! undefined points (`None`) and widened with an injectivity check on
//! construction from an explicit domain/codomain pair (S3's generators are
//! specified that way: a set of domain points mapping to a set of image
//! points).

pub mod err;

use std::sync::Arc;

use super::Element;

/// A partial permutation on the points `0..degree`. `images[x] == Some(y)`
/// means `x` is in the domain and maps to `y`; `None` means `x` is outside
/// the domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartialPerm {
    degree: usize,
    images: Arc<[Option<usize>]>,
}

impl PartialPerm {
    /// Build a partial permutation of the given degree from an explicit
    /// image table (`None` for undefined points). Errors if `images` is the
    /// wrong length, contains an out-of-range image, or isn't injective on
    /// its domain.
    pub fn from_images(
        degree: usize,
        images: Vec<Option<usize>>,
    ) -> Result<Self, err::PartialPermError> {
        if images.len() != degree {
            return Err(err::PartialPermError::WrongLength {
                degree,
                len: images.len(),
            });
        }
        if images.iter().flatten().any(|&y| y >= degree) {
            return Err(err::PartialPermError::InvalidImage { degree, images });
        }
        let mut seen = vec![false; degree];
        for &y in images.iter().flatten() {
            if seen[y] {
                return Err(err::PartialPermError::NotInjective { degree, images });
            }
            seen[y] = true;
        }
        Ok(PartialPerm {
            degree,
            images: images.into(),
        })
    }

    /// Build a partial permutation of the given degree from a `domain ->
    /// codomain` pair of equal-length point lists, as in spec S3.
    pub fn from_domain_codomain(
        degree: usize,
        domain: &[usize],
        codomain: &[usize],
    ) -> Result<Self, err::PartialPermError> {
        if domain.len() != codomain.len() {
            return Err(err::PartialPermError::MismatchingDomainCodomain {
                domain_len: domain.len(),
                codomain_len: codomain.len(),
            });
        }
        let mut images = vec![None; degree];
        for (&x, &y) in domain.iter().zip(codomain) {
            if x >= degree || y >= degree {
                return Err(err::PartialPermError::InvalidImage {
                    degree,
                    images: images.clone(),
                });
            }
            images[x] = Some(y);
        }
        PartialPerm::from_images(degree, images)
    }

    /// The empty partial permutation (undefined everywhere) of the given
    /// degree.
    pub fn empty(degree: usize) -> Self {
        PartialPerm {
            degree,
            images: vec![None; degree].into(),
        }
    }

    pub fn images(&self) -> &[Option<usize>] {
        &self.images
    }

    pub fn degree_of(&self) -> usize {
        self.degree
    }

    pub fn is_identity(&self) -> bool {
        self.images
            .iter()
            .enumerate()
            .all(|(i, y)| *y == Some(i))
    }

    pub fn apply(&self, x: usize) -> Result<Option<usize>, err::PartialPermError> {
        if x < self.degree {
            Ok(self.images[x])
        } else {
            Err(err::PartialPermError::InvalidPoint {
                degree: self.degree,
                point: x,
            })
        }
    }

    /// Compose two partial permutations of equal degree: `(f * g)(x) ==
    /// g(f(x))` when both sides are defined, else undefined.
    pub fn multiply(&self, other: &Self) -> Result<Self, err::PartialPermError> {
        if self.degree != other.degree {
            return Err(err::PartialPermError::MismatchingDegree {
                degree1: self.degree,
                degree2: other.degree,
            });
        }
        let images = self
            .images
            .iter()
            .map(|fx| fx.and_then(|y| other.images[y]))
            .collect();
        Ok(PartialPerm {
            degree: self.degree,
            images,
        })
    }
}

impl Element for PartialPerm {
    fn degree(&self) -> usize {
        self.degree
    }

    fn complexity(&self) -> usize {
        self.degree
    }

    fn identity_of(&self) -> Self {
        let images = (0..self.degree).map(Some).collect();
        PartialPerm {
            degree: self.degree,
            images,
        }
    }

    fn product_into(dst: &mut Self, a: &Self, b: &Self, _thread_id: usize) {
        *dst = a.multiply(b).unwrap();
    }
}

impl std::fmt::Display for PartialPerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        let mut sep = "";
        for (x, y) in self.images.iter().enumerate() {
            if let Some(y) = y {
                write!(f, "{}{}:{}", sep, x, y)?;
                sep = ", ";
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::PartialPerm;

    #[test]
    fn empty_is_undefined_everywhere() {
        let e = PartialPerm::empty(5);
        for x in 0..5 {
            assert_eq!(e.apply(x).unwrap(), None);
        }
        assert!(!e.is_identity());
    }

    #[test]
    fn identity_roundtrips() {
        let id = PartialPerm::from_images(4, vec![Some(0), Some(1), Some(2), Some(3)]).unwrap();
        assert!(id.is_identity());
    }

    #[test]
    fn rejects_non_injective() {
        let result = PartialPerm::from_images(3, vec![Some(0), Some(0), None]);
        assert!(result.is_err());
    }

    #[test]
    fn domain_codomain_constructor() {
        let f = PartialPerm::from_domain_codomain(10, &[0, 1, 2, 3, 5, 6, 9], &[9, 7, 3, 5, 4, 2, 1])
            .unwrap();
        assert_eq!(f.apply(0).unwrap(), Some(9));
        assert_eq!(f.apply(4).unwrap(), None);
    }

    #[test]
    fn multiply_composes_left_to_right() {
        let f = PartialPerm::from_images(3, vec![Some(1), Some(2), None]).unwrap();
        let g = PartialPerm::from_images(3, vec![None, Some(0), Some(1)]).unwrap();
        let fg = f.multiply(&g).unwrap();
        // f(0) = 1, g(1) = 0 => fg(0) = 0
        assert_eq!(fg.apply(0).unwrap(), Some(0));
        // f(1) = 2, g(2) = 1 => fg(1) = 1
        assert_eq!(fg.apply(1).unwrap(), Some(1));
        // f(2) undefined => fg(2) undefined
        assert_eq!(fg.apply(2).unwrap(), None);
    }
}
