use crate::core::errors::{MeasurementError, StateError};
use crate::core::gates::Gate;
use crate::core::measurements::{Measurement, MeasurementResult};
use crate::core::utils::{adjoint, find_duplicate, trace};
use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;

/// Probabilities below this are treated as exact zeros.
const PROBABILITY_EPSILON: f64 = 1e-12;

/// Density-matrix register of `num_qubits` qubits.
#[derive(Clone, Debug)]
pub struct QuantumState {
    pub density_matrix: Array2<Complex64>,
    pub num_qubits: usize,
}

impl QuantumState {
    /// Creates a new quantum state initialized to |0...0>.
    pub fn new(num_qubits: usize) -> Self {
        let dim = 1 << num_qubits;
        let mut density_matrix = Array2::<Complex64>::zeros((dim, dim));
        density_matrix[[0, 0]] = Complex64::new(1.0, 0.0);

        Self {
            density_matrix,
            num_qubits,
        }
    }

    /// Checks that the register still holds a unit-trace square matrix.
    pub fn is_valid(&self) -> Result<(), StateError> {
        let (rows, cols) = self.density_matrix.dim();
        let dim = 1 << self.num_qubits;

        if rows != dim || cols != dim {
            return Err(StateError::DimensionMismatch {
                expected: dim,
                got_rows: rows,
                got_cols: cols,
            });
        }

        let tr = trace(&self.density_matrix);
        if (tr - Complex64::new(1.0, 0.0)).norm() > PROBABILITY_EPSILON {
            return Err(StateError::InvalidTrace(tr));
        }

        Ok(())
    }

    /// Checks if a given index is within the register's range
    fn validate_qubit_index(&self, index: usize) -> Result<(), StateError> {
        if index >= self.num_qubits {
            return Err(StateError::IndexOutOfBounds {
                index,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Applies a unitary gate: rho -> U rho U†
    pub fn apply(&mut self, gate: &Gate, target_qubits: &[usize]) -> Result<(), StateError> {
        if gate.num_qubits != target_qubits.len() {
            return Err(StateError::DimensionMismatch {
                expected: gate.num_qubits,
                got_rows: target_qubits.len(),
                got_cols: 0,
            });
        }

        for &q in target_qubits {
            self.validate_qubit_index(q)?;
        }

        let full = Gate::expand_gate(self.num_qubits, gate, target_qubits)?;
        let u = &full.matrix;

        self.density_matrix = u.dot(&self.density_matrix).dot(&adjoint(u));

        Ok(())
    }

    /// Returns the probability of each outcome together with the expanded operators
    pub fn outcome_probabilities(
        &self,
        measurement: &Measurement,
        target_qubits: &[usize],
    ) -> Result<(Vec<f64>, Vec<Array2<Complex64>>), StateError> {
        for &q in target_qubits {
            self.validate_qubit_index(q)?;
        }

        if let Some(dup) = find_duplicate(target_qubits) {
            return Err(StateError::MeasurementError(
                MeasurementError::DuplicateQubit(dup),
            ));
        }

        let expanded_ops = measurement.get_expanded_operators(self.num_qubits, target_qubits)?;

        let mut probs: Vec<f64> = expanded_ops
            .iter()
            .map(|op| {
                let p_k = trace(&op.dot(&self.density_matrix).dot(&adjoint(op))).re;
                if p_k < PROBABILITY_EPSILON { 0.0 } else { p_k }
            })
            .collect();

        let sum_probs: f64 = probs.iter().sum();
        if sum_probs < PROBABILITY_EPSILON {
            return Err(StateError::InvalidTrace(Complex64::new(sum_probs, 0.0)));
        }

        // Float drift: renormalise so the outcomes stay complete
        for p in &mut probs {
            *p /= sum_probs;
        }

        Ok((probs, expanded_ops))
    }

    /// Randomly selects an outcome index weighted by `probs`
    fn pick_outcome<R: Rng + ?Sized>(probs: &[f64], rng: &mut R) -> usize {
        let roll: f64 = rng.random();

        let mut cumulative = 0.0;
        for (i, &p) in probs.iter().enumerate() {
            cumulative += p;
            if roll < cumulative {
                return i;
            }
        }
        probs.len().saturating_sub(1)
    }

    /// Physical measurement which changes the state irretrievably
    pub fn measure<R: Rng + ?Sized>(
        &mut self,
        measurement: &Measurement,
        target_qubits: &[usize],
        rng: &mut R,
    ) -> Result<MeasurementResult, StateError> {
        let (probs, ops) = self.outcome_probabilities(measurement, target_qubits)?;

        let outcome_idx = Self::pick_outcome(&probs, rng);
        let p_selected = probs[outcome_idx];

        if p_selected <= PROBABILITY_EPSILON {
            return Err(StateError::InvalidTrace(Complex64::new(p_selected, 0.0)));
        }

        // rho' = (M_k * rho * M_k†) / p_k
        let m_k = &ops[outcome_idx];
        let numerator = m_k.dot(&self.density_matrix).dot(&adjoint(m_k));
        self.density_matrix = numerator.mapv(|val| val / p_selected);

        Ok(MeasurementResult {
            index: outcome_idx,
            value: measurement.values[outcome_idx],
        })
    }
}
