//! Phase oracle: marks the search target by flipping its sign

use crate::error::{GroverError, Result};
use crate::state::StateVector;

/// Negate `vector[target]`
///
/// # Errors
///
/// Returns `IndexOutOfRange` if `target >= vector.len()`.
pub fn apply(vector: &mut StateVector, target: usize) -> Result<()> {
    let len = vector.len();
    let amplitude = vector
        .as_mut_slice()
        .get_mut(target)
        .ok_or(GroverError::IndexOutOfRange { index: target, len })?;
    *amplitude = -*amplitude;
    Ok(())
}

/// Oracle bound to a target validated once at run setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Oracle {
    target: usize,
    len: usize,
}

impl Oracle {
    /// Bind an oracle to `target` for vectors of length `len`
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `target >= len`.
    pub fn new(target: usize, len: usize) -> Result<Self> {
        if target >= len {
            return Err(GroverError::IndexOutOfRange { index: target, len });
        }
        Ok(Self { target, len })
    }

    /// Marked index
    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    /// Flip the sign of the marked amplitude
    ///
    /// The target was checked in [`Oracle::new`]; `vector` must have the
    /// length the oracle was built for.
    #[inline]
    pub fn mark(&self, vector: &mut StateVector) {
        debug_assert_eq!(vector.len(), self.len);
        let amplitudes = vector.as_mut_slice();
        amplitudes[self.target] = -amplitudes[self.target];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_target_zero_only() {
        let n = 1024;
        let mut v = StateVector::new(n).unwrap();
        v.initialize_uniform();
        let before = v.clone();

        apply(&mut v, 0).unwrap();

        let a = 1.0 / (n as f64).sqrt();
        assert_eq!(v.get(0), Some(-a));
        assert_eq!(&v.as_slice()[1..], &before.as_slice()[1..]);
    }

    #[test]
    fn test_double_flip_restores() {
        let mut v = StateVector::from_amplitudes(vec![0.5, -0.25, 0.125]).unwrap();
        apply(&mut v, 1).unwrap();
        apply(&mut v, 1).unwrap();
        assert_eq!(v.as_slice(), &[0.5, -0.25, 0.125]);
    }

    #[test]
    fn test_out_of_range() {
        let mut v = StateVector::new(4).unwrap();
        let err = apply(&mut v, 4).unwrap_err();
        assert_eq!(err, GroverError::IndexOutOfRange { index: 4, len: 4 });

        assert!(Oracle::new(4, 4).is_err());
        assert!(Oracle::new(3, 4).is_ok());
    }

    #[test]
    fn test_bound_oracle_marks_target() {
        let mut v = StateVector::from_amplitudes(vec![1.0; 6]).unwrap();
        let oracle = Oracle::new(2, 6).unwrap();
        assert_eq!(oracle.target(), 2);
        oracle.mark(&mut v);
        assert_eq!(v.as_slice(), &[1.0, 1.0, -1.0, 1.0, 1.0, 1.0]);
    }
}
