use crate::{DynamicsError, OrtantMemory, RhsKind};
use ctsat_problem::SatProblem;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Scalar knobs of the formulations that carry one. Everything else is
/// derived from the problem and the state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FormulationParams {
    /// Decay rate `lambda` of the memory-suppressed formulations (7, 8).
    pub memory_decay: f64,
    /// Strength `rho` of the failed-ortant repulsion (formulation 6).
    pub repulsion_strength: f64,
}

impl Default for FormulationParams {
    fn default() -> Self {
        Self {
            memory_decay: 0.1,
            repulsion_strength: 0.1,
        }
    }
}

/// Evaluation backend contract. The reference implementation is pure Rust;
/// accelerated backends plug in here and must agree with it numerically.
/// `memory` is only consulted by formulation 6.
pub trait RhsEvaluator {
    fn evaluate_rhs(
        &self,
        kind: RhsKind,
        problem: &SatProblem,
        state: &[f64],
        params: &FormulationParams,
        memory: &OrtantMemory,
    ) -> Result<Array1<f64>, DynamicsError>;

    fn evaluate_jacobian(
        &self,
        kind: RhsKind,
        problem: &SatProblem,
        state: &[f64],
    ) -> Result<Array2<f64>, DynamicsError>;
}

pub(crate) fn check_state_len(
    kind: RhsKind,
    problem: &SatProblem,
    state: &[f64],
) -> Result<(), DynamicsError> {
    let expected = kind.state_len(problem.num_variables(), problem.num_clauses());
    if state.len() != expected {
        return Err(DynamicsError::StateLength {
            kind,
            num_variables: problem.num_variables(),
            num_clauses: problem.num_clauses(),
            expected,
            actual: state.len(),
        });
    }
    Ok(())
}
