use std::sync::Arc;

use super::Element;

pub mod err;

/// A transformation on the points `0..degree`, stored as the vector of
/// images of each point. Backed by an `Arc<[usize]>` so clones (which the
/// engine performs constantly while building its tables) are cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Transformation {
    degree: usize,
    vals: Arc<[usize]>,
}

impl Transformation {
    pub fn as_vec(&self) -> &[usize] {
        &self.vals[..]
    }

    /// Create a transformation from a vector of images. Errors if `vals`
    /// isn't exactly `degree` long or contains a point `>= degree`.
    pub fn from_vec(degree: usize, vals: Vec<usize>) -> Result<Self, err::TransformationError> {
        if vals.len() != degree || !vals.iter().all(|x| *x < degree) {
            Err(err::TransformationError::InvalidImage {
                degree,
                image: vals,
            })
        } else {
            Ok(Transformation::from_vec_unchecked(degree, vals))
        }
    }

    /// Create a transformation given an image, skipping validation.
    pub(crate) fn from_vec_unchecked(degree: usize, vals: Vec<usize>) -> Self {
        Self {
            degree,
            vals: vals.into(),
        }
    }

    /// The identity transformation on `degree` points.
    /// ```
    /// use semigroups::element::transformation::Transformation;
    ///
    /// let id = Transformation::id(5);
    /// assert!(id.is_id())
    /// ```
    pub fn id(degree: usize) -> Self {
        let vals: Vec<_> = (0..degree).collect();
        Self {
            degree,
            vals: vals.into(),
        }
    }

    /// True iff this transformation fixes every point.
    pub fn is_id(&self) -> bool {
        self.vals.iter().enumerate().all(|(i, x)| i == *x)
    }

    pub fn degree_of(&self) -> usize {
        self.degree
    }

    /// Apply the transformation to a point.
    /// ```
    /// use semigroups::element::transformation::Transformation;
    ///
    /// let f = Transformation::from_vec(3, vec![0, 2, 2]).unwrap();
    /// assert_eq!(2, f.apply(1).unwrap());
    /// assert!(f.apply(5).is_err())
    /// ```
    pub fn apply(&self, x: usize) -> Result<usize, err::TransformationError> {
        if x < self.degree {
            Ok(self.vals[x])
        } else {
            Err(err::TransformationError::InvalidPoint {
                degree: self.degree,
                point: x,
            })
        }
    }

    /// Compose two transformations, defined only for equal degree. The
    /// convention is left-to-right application: `(f.multiply(g))(x) ==
    /// g(f(x))`.
    /// ```
    /// use semigroups::element::transformation::Transformation;
    ///
    /// let f = Transformation::from_vec(3, vec![0, 2, 2]).unwrap();
    /// let g = Transformation::from_vec(3, vec![2, 1, 0]).unwrap();
    /// let fg = f.multiply(&g).unwrap();
    /// assert_eq!(0, fg.apply(1).unwrap())
    /// ```
    pub fn multiply(&self, other: &Self) -> Result<Self, err::TransformationError> {
        if self.degree == other.degree {
            let vals = (0..self.degree)
                .map(|x| other.apply(self.apply(x).unwrap()).unwrap())
                .collect();
            Ok(Transformation::from_vec_unchecked(self.degree, vals))
        } else {
            Err(err::TransformationError::MismatchingDegree {
                degree1: self.degree,
                degree2: other.degree,
            })
        }
    }
}

impl Element for Transformation {
    fn degree(&self) -> usize {
        self.degree
    }

    fn complexity(&self) -> usize {
        self.degree
    }

    fn identity_of(&self) -> Self {
        Transformation::id(self.degree)
    }

    fn product_into(dst: &mut Self, a: &Self, b: &Self, _thread_id: usize) {
        // Will panic on mismatched degree; callers are expected to have
        // validated this already (the engine never mixes degrees).
        *dst = a.multiply(b).unwrap();
    }
}

impl std::fmt::Display for Transformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        let mut sep = "";
        for (i, x) in self.vals.iter().enumerate() {
            write!(f, "{}{}:{}", sep, i, x)?;
            sep = ", "
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::Transformation;

    #[test]
    fn id() {
        let id0 = Transformation::id(0);
        let id10 = Transformation::id(10);
        let f = Transformation::from_vec(2, vec![1, 1]).unwrap();
        assert!(id0.is_id());
        assert!(id10.is_id());
        assert!(!f.is_id());
    }

    #[test]
    fn invalid_image() {
        // Invalid for value out of range
        let f = Transformation::from_vec(3, vec![0, 0, 4]);
        // Invalid for too many values
        let g = Transformation::from_vec(4, vec![1, 2, 3]);
        assert!(f.is_err());
        assert!(g.is_err());
    }

    #[test]
    fn multiply_inverse() {
        let f = Transformation::from_vec(4, vec![3, 2, 1, 0]).unwrap();
        let f2 = f.multiply(&f).unwrap();
        assert!(f2.is_id())
    }

    #[test]
    fn multiply() {
        let f = Transformation::from_vec(4, vec![2, 2, 3, 1]).unwrap();
        let g = Transformation::from_vec(4, vec![2, 1, 1, 3]).unwrap();
        let fg = Transformation::from_vec(4, vec![1, 1, 3, 1]).unwrap();
        assert_eq!(fg, f.multiply(&g).unwrap());
    }
}
