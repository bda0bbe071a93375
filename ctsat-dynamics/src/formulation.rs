use crate::{
    DynamicsError, FormulationParams, OrtantMemory, ReferenceEvaluator, RhsEvaluator, RhsKind,
    TRIED_ORTANT_CAPACITY,
};
use ctsat_problem::SatProblem;
use ndarray::{Array1, Array2};

/// One formulation bound to one problem: the derivative and Jacobian
/// callbacks handed to the integrator, plus the failed-ortant memory of
/// formulation 6. The time argument is accepted for the integrator contract
/// but the system is autonomous.
pub struct Formulation<'a> {
    problem: &'a SatProblem,
    kind: RhsKind,
    params: FormulationParams,
    memory: OrtantMemory,
    evaluator: Box<dyn RhsEvaluator>,
}

impl<'a> Formulation<'a> {
    pub fn new(problem: &'a SatProblem, kind: RhsKind) -> Self {
        Self::with_evaluator(problem, kind, Box::new(ReferenceEvaluator))
    }

    pub fn with_evaluator(
        problem: &'a SatProblem,
        kind: RhsKind,
        evaluator: Box<dyn RhsEvaluator>,
    ) -> Self {
        Self {
            problem,
            kind,
            params: FormulationParams::default(),
            memory: OrtantMemory::new(TRIED_ORTANT_CAPACITY),
            evaluator,
        }
    }

    pub fn set_params(&mut self, params: FormulationParams) {
        self.params = params;
    }

    pub fn params(&self) -> &FormulationParams {
        &self.params
    }

    pub fn kind(&self) -> RhsKind {
        self.kind
    }

    pub fn problem(&self) -> &'a SatProblem {
        self.problem
    }

    pub fn state_len(&self) -> usize {
        self.kind
            .state_len(self.problem.num_variables(), self.problem.num_clauses())
    }

    pub fn rhs(&self, _t: f64, state: &[f64]) -> Result<Array1<f64>, DynamicsError> {
        self.evaluator
            .evaluate_rhs(self.kind, self.problem, state, &self.params, &self.memory)
    }

    pub fn jacobian(&self, state: &[f64]) -> Result<Array2<f64>, DynamicsError> {
        self.evaluator
            .evaluate_jacobian(self.kind, self.problem, state)
    }

    /// Remember the discrete assignment the spins currently point at, so
    /// formulation 6 steers later runs away from it.
    pub fn record_failed_ortant(&mut self, spins: &[f64]) {
        let ortant = spins
            .iter()
            .take(self.problem.num_variables())
            .map(|&value| if value > 0.0 { 1.0 } else { -1.0 })
            .collect::<Array1<f64>>();
        self.memory.push(ortant);
    }

    pub fn memory(&self) -> &OrtantMemory {
        &self.memory
    }
}
