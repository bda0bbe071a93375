use ctsat_problem::SatProblem;
use serde::{Deserialize, Serialize};

/// Sigma of the convergence-radius condition; the trajectory must reach
/// `|s| >= sqrt(N - 1 + sigma^2)` before a solution ortant counts.
pub const CONVERGENCE_SIGMA: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    OrtantExit,
    ConvergenceRadius,
    NegativeAux,
    HypersphereEnter,
    HypersphereExit,
    HypercubeExit,
}

/// A scalar condition on `(t, state)`. The integrator signals the event when
/// the value crosses from negative to non-negative; terminal events stop the
/// integration at the crossing.
pub trait TrajectoryEvent {
    fn kind(&self) -> EventKind;
    fn terminal(&self) -> bool;
    fn value(&self, t: f64, state: &[f64]) -> f64;
}

fn decode_spins(state: &[f64], num_variables: usize) -> Vec<bool> {
    state[..num_variables].iter().map(|&s| s > 0.0).collect()
}

fn spin_norm(state: &[f64], num_variables: usize) -> f64 {
    state[..num_variables]
        .iter()
        .map(|&s| s * s)
        .sum::<f64>()
        .sqrt()
}

/// Fires when the current sign pattern satisfies every clause.
pub struct OrtantExit<'a> {
    problem: &'a SatProblem,
    terminal: bool,
}

impl<'a> OrtantExit<'a> {
    pub fn new(problem: &'a SatProblem) -> Self {
        Self {
            problem,
            terminal: true,
        }
    }
}

impl TrajectoryEvent for OrtantExit<'_> {
    fn kind(&self) -> EventKind {
        EventKind::OrtantExit
    }

    fn terminal(&self) -> bool {
        self.terminal
    }

    fn value(&self, _t: f64, state: &[f64]) -> f64 {
        let assignment = decode_spins(state, self.problem.num_variables());
        if matches!(self.problem.check_solution(&assignment), Ok(true)) {
            0.0
        } else {
            -1.0
        }
    }
}

/// As `OrtantExit`, but the spin vector must also have left the convergence
/// radius so the assignment is read off a settled trajectory.
pub struct ConvergenceRadiusExit<'a> {
    problem: &'a SatProblem,
}

impl<'a> ConvergenceRadiusExit<'a> {
    pub fn new(problem: &'a SatProblem) -> Self {
        Self { problem }
    }
}

impl TrajectoryEvent for ConvergenceRadiusExit<'_> {
    fn kind(&self) -> EventKind {
        EventKind::ConvergenceRadius
    }

    fn terminal(&self) -> bool {
        true
    }

    fn value(&self, _t: f64, state: &[f64]) -> f64 {
        let n = self.problem.num_variables();
        let assignment = decode_spins(state, n);
        if matches!(self.problem.check_solution(&assignment), Ok(true)) {
            let radius = (n as f64 - 1.0 + CONVERGENCE_SIGMA * CONVERGENCE_SIGMA).sqrt();
            if spin_norm(state, n) >= radius {
                return 0.0;
            }
        }
        -1.0
    }
}

/// Fires when any auxiliary component drops below 1. Non-terminal unless
/// explicitly promoted (the solver promotes it when chosen as exit policy).
/// The auxiliary block is bounded explicitly so that augmented state vectors
/// (a Lyapunov frame appended past the auxiliaries) are not inspected.
pub struct NegativeAux {
    num_variables: usize,
    num_aux: usize,
    terminal: bool,
}

impl NegativeAux {
    pub fn new(num_variables: usize, num_aux: usize, terminal: bool) -> Self {
        Self {
            num_variables,
            num_aux,
            terminal,
        }
    }
}

impl TrajectoryEvent for NegativeAux {
    fn kind(&self) -> EventKind {
        EventKind::NegativeAux
    }

    fn terminal(&self) -> bool {
        self.terminal
    }

    fn value(&self, _t: f64, state: &[f64]) -> f64 {
        let aux = &state[self.num_variables..self.num_variables + self.num_aux];
        if aux.iter().any(|&value| value < 1.0) {
            0.0
        } else {
            -1.0
        }
    }
}

/// Non-terminal boundary crossing of `|s|` against a fixed radius, in either
/// direction depending on `entering`.
pub struct HypersphereCrossing {
    num_variables: usize,
    radius: f64,
    entering: bool,
}

impl HypersphereCrossing {
    pub fn enter(num_variables: usize, radius: f64) -> Self {
        Self {
            num_variables,
            radius,
            entering: true,
        }
    }

    pub fn exit(num_variables: usize, radius: f64) -> Self {
        Self {
            num_variables,
            radius,
            entering: false,
        }
    }
}

impl TrajectoryEvent for HypersphereCrossing {
    fn kind(&self) -> EventKind {
        if self.entering {
            EventKind::HypersphereEnter
        } else {
            EventKind::HypersphereExit
        }
    }

    fn terminal(&self) -> bool {
        false
    }

    fn value(&self, _t: f64, state: &[f64]) -> f64 {
        let norm = spin_norm(state, self.num_variables);
        if self.entering {
            self.radius - norm
        } else {
            norm - self.radius
        }
    }
}

/// Divergence guard: fires once any spin coordinate leaves the unit cube.
pub struct HypercubeExit {
    num_variables: usize,
}

impl HypercubeExit {
    pub fn new(num_variables: usize) -> Self {
        Self { num_variables }
    }
}

impl TrajectoryEvent for HypercubeExit {
    fn kind(&self) -> EventKind {
        EventKind::HypercubeExit
    }

    fn terminal(&self) -> bool {
        true
    }

    fn value(&self, _t: f64, state: &[f64]) -> f64 {
        state[..self.num_variables]
            .iter()
            .fold(f64::NEG_INFINITY, |max, &s| max.max(s.abs()))
            - 1.0
    }
}
