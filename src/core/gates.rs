use crate::core::errors::GateError;
use crate::core::utils;
use ndarray::{Array2, arr2};
use num_complex::Complex64;

/// Represents a quantum gate.
///
/// A gate is defined by its unitary matrix and the number of qubits it acts on.
pub struct Gate {
    /// The unitary matrix of the gate.
    pub matrix: Array2<Complex64>,
    /// The number of qubits the gate acts on.
    pub num_qubits: usize,
}

impl Gate {
    /// Creates a new `Gate` from a unitary matrix.
    ///
    /// # Errors
    ///
    /// Returns a `GateError` if the matrix is not square, its dimension is not
    /// a power of 2, or it is not unitary.
    pub fn new(matrix: Array2<Complex64>) -> Result<Self, GateError> {
        let (rows, cols) = matrix.dim();

        if rows != cols {
            return Err(GateError::NotSquareMatrix);
        }

        if !rows.is_power_of_two() {
            return Err(GateError::InvalidDimensions);
        }

        if !Self::check_unitary(&matrix) {
            return Err(GateError::NonUnitary);
        }

        let num_qubits = rows.trailing_zeros() as usize;

        Ok(Self { matrix, num_qubits })
    }

    /// Checks if a given matrix is unitary
    fn check_unitary(matrix: &Array2<Complex64>) -> bool {
        let (rows, _) = matrix.dim();
        let eye = Array2::<Complex64>::eye(rows);

        let product = matrix.dot(&utils::adjoint(matrix));

        product
            .iter()
            .zip(eye.iter())
            .all(|(a, b)| (*a - *b).norm() < 1e-6)
    }

    /// Expands a gate to a register of `num_total_qubits`, acting on `targets`
    /// and as the identity elsewhere.
    pub fn expand_gate(
        num_total_qubits: usize,
        gate: &Gate,
        targets: &[usize],
    ) -> Result<Gate, GateError> {
        if let Some(dup) = utils::find_duplicate(targets) {
            return Err(GateError::DuplicateQubit(dup));
        }

        if targets.len() != gate.num_qubits {
            return Err(GateError::InvalidDimensions);
        }

        Ok(Gate {
            matrix: utils::expand_operator(num_total_qubits, &gate.matrix, targets),
            num_qubits: num_total_qubits,
        })
    }

    /// Creates a Pauli-X gate (bit flip).
    pub fn x() -> Gate {
        Gate::new(arr2(&[
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        ]))
        .expect("Pauli-X is unitary")
    }

    /// Creates a Hadamard gate (Z <-> X basis change).
    pub fn h() -> Gate {
        let factor = 1.0 / 2.0_f64.sqrt();
        Gate::new(arr2(&[
            [Complex64::new(factor, 0.0), Complex64::new(factor, 0.0)],
            [Complex64::new(factor, 0.0), Complex64::new(-factor, 0.0)],
        ]))
        .expect("Hadamard is unitary")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_unitary_matrix() {
        let m = arr2(&[
            [Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
        ]);
        assert!(matches!(Gate::new(m), Err(GateError::NonUnitary)));
    }

    #[test]
    fn rejects_non_power_of_two() {
        let m = Array2::<Complex64>::eye(3);
        assert!(matches!(Gate::new(m), Err(GateError::InvalidDimensions)));
    }

    #[test]
    fn hadamard_is_self_inverse() {
        let h = Gate::h();
        let hh = h.matrix.dot(&h.matrix);
        let eye = Array2::<Complex64>::eye(2);
        assert!(hh.iter().zip(eye.iter()).all(|(a, b)| (a - b).norm() < 1e-12));
    }

    #[test]
    fn expand_rejects_duplicate_targets() {
        let res = Gate::expand_gate(2, &Gate::x(), &[1, 1]);
        assert!(matches!(res, Err(GateError::DuplicateQubit(1))));
    }
}
