//! Amplitude state vector
//!
//! The [`StateVector`] owns a dense array of real amplitudes. It exposes no
//! public mutation besides [`StateVector::initialize_uniform`]; the oracle and
//! diffuser work on the same storage in place through crate-private access so
//! each iteration stays O(N) with no copies.

use crate::error::{GroverError, Result};
use crate::memory::MemoryBudget;

/// Dense real-valued amplitude register
///
/// # Examples
///
/// ```
/// use grover_bench::StateVector;
///
/// let mut v = StateVector::new(16).unwrap();
/// v.initialize_uniform();
/// assert_eq!(v.len(), 16);
/// assert!((v.as_slice()[0] - 0.25).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    amplitudes: Vec<f64>,
}

impl StateVector {
    /// Allocate a zeroed vector of `len` amplitudes
    ///
    /// # Errors
    ///
    /// Returns `InvalidSize` if `len == 0` and `AllocationError` if the
    /// storage cannot be obtained.
    pub fn new(len: usize) -> Result<Self> {
        Self::with_budget(len, &MemoryBudget::unlimited())
    }

    /// Allocate a zeroed vector, refusing anything larger than `budget`
    ///
    /// # Errors
    ///
    /// Returns `InvalidSize` if `len == 0` and `AllocationError` if the
    /// request exceeds the budget or the allocator refuses it.
    pub fn with_budget(len: usize, budget: &MemoryBudget) -> Result<Self> {
        if len == 0 {
            return Err(GroverError::InvalidSize {
                size: 0,
                reason: "vector size must be positive".to_string(),
            });
        }
        let bytes = budget.check(len)?;

        let mut amplitudes = Vec::new();
        amplitudes
            .try_reserve_exact(len)
            .map_err(|e| GroverError::AllocationError {
                requested_bytes: Some(bytes),
                reason: e.to_string(),
            })?;
        amplitudes.resize(len, 0.0);

        Ok(Self { amplitudes })
    }

    /// Build a vector from explicit amplitudes
    ///
    /// # Errors
    ///
    /// Returns `InvalidSize` if `amplitudes` is empty.
    pub fn from_amplitudes(amplitudes: Vec<f64>) -> Result<Self> {
        if amplitudes.is_empty() {
            return Err(GroverError::InvalidSize {
                size: 0,
                reason: "vector size must be positive".to_string(),
            });
        }
        Ok(Self { amplitudes })
    }

    /// Set every amplitude to `1/sqrt(N)`
    pub fn initialize_uniform(&mut self) {
        let value = 1.0 / (self.amplitudes.len() as f64).sqrt();
        self.amplitudes.fill(value);
    }

    /// Number of amplitudes
    #[must_use]
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// Always false; a state vector holds at least one amplitude
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Bytes held by the amplitude storage
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.amplitudes.len() * std::mem::size_of::<f64>()
    }

    /// Read-only view of the amplitudes
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Amplitude at `index`, if in range
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.amplitudes.get(index).copied()
    }

    /// Sum of squared amplitudes (1.0 for a normalized register)
    #[must_use]
    pub fn norm_squared(&self) -> f64 {
        self.amplitudes.iter().map(|a| a * a).sum()
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.amplitudes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let v = StateVector::new(8).unwrap();
        assert_eq!(v.len(), 8);
        assert!(!v.is_empty());
        assert!(v.as_slice().iter().all(|&a| a == 0.0));
        assert_eq!(v.size_bytes(), 64);
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = StateVector::new(0).unwrap_err();
        assert!(matches!(err, GroverError::InvalidSize { size: 0, .. }));
    }

    #[test]
    fn test_initialize_uniform() {
        let mut v = StateVector::new(4096).unwrap();
        v.initialize_uniform();
        let expected = 1.0 / 64.0;
        assert!(v.as_slice().iter().all(|&a| a == expected));
        assert!((v.norm_squared() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_initialize_uniform_non_power_of_two() {
        let mut v = StateVector::new(3).unwrap();
        v.initialize_uniform();
        let expected = 1.0 / 3.0_f64.sqrt();
        assert!(v.as_slice().iter().all(|&a| (a - expected).abs() < 1e-15));
    }

    #[test]
    fn test_budget_refusal_is_allocation_error() {
        let budget = MemoryBudget::with_max_bytes(1024);
        assert!(StateVector::with_budget(128, &budget).is_ok());
        let err = StateVector::with_budget(129, &budget).unwrap_err();
        assert!(err.is_allocation());
    }

    #[test]
    fn test_unaddressable_request_is_allocation_error() {
        let err = StateVector::new(usize::MAX).unwrap_err();
        assert!(err.is_allocation());
    }

    #[test]
    fn test_from_amplitudes() {
        let v = StateVector::from_amplitudes(vec![1.0, -2.0, 3.0]).unwrap();
        assert_eq!(v.get(1), Some(-2.0));
        assert_eq!(v.get(3), None);
        assert!(StateVector::from_amplitudes(Vec::new()).is_err());
    }
}
