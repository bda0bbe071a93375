use crate::{
    ConvergenceRadiusExit, EventKind, HypersphereCrossing, Integrator, NegativeAux, OrtantExit,
    Tolerances, Trajectory, TrajectoryEvent, CONVERGENCE_SIGMA,
};
use anyhow::{anyhow, Result};
use ctsat_dynamics::{Formulation, FormulationParams, RhsEvaluator, RhsKind};
use ctsat_problem::SatProblem;
use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitPolicy {
    Ortant,
    ConvergenceRadius,
    NegativeAux,
    Hypersphere,
    None,
}

impl std::fmt::Display for ExitPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitPolicy::Ortant => write!(f, "ortant"),
            ExitPolicy::ConvergenceRadius => write!(f, "convergence-radius"),
            ExitPolicy::NegativeAux => write!(f, "negative-aux"),
            ExitPolicy::Hypersphere => write!(f, "hypersphere"),
            ExitPolicy::None => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for ExitPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ortant" => Ok(ExitPolicy::Ortant),
            "convergence-radius" => Ok(ExitPolicy::ConvergenceRadius),
            "negative-aux" => Ok(ExitPolicy::NegativeAux),
            "hypersphere" => Ok(ExitPolicy::Hypersphere),
            "none" => Ok(ExitPolicy::None),
            _ => Err(anyhow!("Invalid exit policy: {}", s)),
        }
    }
}

/// Overrides for the initial state. Spins default to uniform draws from
/// (-1, 1); auxiliaries default to 1.0, or uniform draws scaled by 15 when
/// `random_aux` is set.
#[derive(Default)]
pub struct InitialConditions {
    pub spins: Option<Array1<f64>>,
    pub aux: Option<Array1<f64>>,
    pub random_aux: bool,
}

/// One solver run: owns the state vector sized for the active formulation
/// and the trajectory the integrator produced.
pub struct CtdSolver<'a> {
    pub(crate) formulation: Formulation<'a>,
    pub(crate) state: Array1<f64>,
    pub(crate) hypersphere_radius: f64,
    pub(crate) trajectory: Option<Trajectory>,
    pub(crate) hypersphere_entry: Option<(f64, Array1<f64>)>,
}

impl<'a> CtdSolver<'a> {
    pub fn new<R: Rng>(problem: &'a SatProblem, kind: RhsKind, rng: &mut R) -> Result<Self> {
        Self::with_conditions(problem, kind, rng, InitialConditions::default())
    }

    pub fn with_conditions<R: Rng>(
        problem: &'a SatProblem,
        kind: RhsKind,
        rng: &mut R,
        conditions: InitialConditions,
    ) -> Result<Self> {
        let formulation = Formulation::new(problem, kind);
        Self::assemble(formulation, rng, conditions)
    }

    /// Swap in an accelerated evaluation backend; it must match the
    /// reference formulation numerically.
    pub fn with_evaluator<R: Rng>(
        problem: &'a SatProblem,
        kind: RhsKind,
        evaluator: Box<dyn RhsEvaluator>,
        rng: &mut R,
        conditions: InitialConditions,
    ) -> Result<Self> {
        let formulation = Formulation::with_evaluator(problem, kind, evaluator);
        Self::assemble(formulation, rng, conditions)
    }

    fn assemble<R: Rng>(
        formulation: Formulation<'a>,
        rng: &mut R,
        conditions: InitialConditions,
    ) -> Result<Self> {
        let problem = formulation.problem();
        let n = problem.num_variables();
        let aux_len = formulation.kind().aux_len(problem.num_clauses());

        let spins = match conditions.spins {
            Some(spins) => {
                if spins.len() != n {
                    return Err(anyhow!(
                        "Initial spin vector has {} components, expected {}",
                        spins.len(),
                        n
                    ));
                }
                spins
            }
            None => Array1::from_iter((0..n).map(|_| 2.0 * rng.gen::<f64>() - 1.0)),
        };
        let aux = match conditions.aux {
            Some(aux) => {
                if aux.len() != aux_len {
                    return Err(anyhow!(
                        "Initial auxiliary vector has {} components, expected {}",
                        aux.len(),
                        aux_len
                    ));
                }
                aux
            }
            None if conditions.random_aux => {
                Array1::from_iter((0..aux_len).map(|_| rng.gen::<f64>() * 15.0))
            }
            None => Array1::ones(aux_len),
        };

        let mut state = Array1::zeros(n + aux_len);
        state.slice_mut(ndarray::s![..n]).assign(&spins);
        state.slice_mut(ndarray::s![n..]).assign(&aux);

        let radius = (n as f64 - 1.0 + CONVERGENCE_SIGMA * CONVERGENCE_SIGMA).sqrt();
        Ok(Self {
            formulation,
            state,
            hypersphere_radius: radius,
            trajectory: None,
            hypersphere_entry: None,
        })
    }

    pub fn set_params(&mut self, params: FormulationParams) {
        self.formulation.set_params(params);
    }

    pub fn set_hypersphere_radius(&mut self, radius: f64) {
        self.hypersphere_radius = radius;
    }

    pub fn state(&self) -> &Array1<f64> {
        &self.state
    }

    pub fn formulation(&self) -> &Formulation<'a> {
        &self.formulation
    }

    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// State captured at the first hypersphere-entry crossing of the last
    /// run, if one was observed.
    pub fn hypersphere_entry(&self) -> Option<&(f64, Array1<f64>)> {
        self.hypersphere_entry.as_ref()
    }

    /// Push the discrete assignment the spins currently point at into the
    /// formulation-6 repulsion memory.
    pub fn record_failed_ortant(&mut self) {
        let state = self.state.to_vec();
        self.formulation.record_failed_ortant(&state);
    }

    pub fn events_for_policy(&self, policy: ExitPolicy) -> Vec<Box<dyn TrajectoryEvent + 'a>> {
        let problem = self.formulation.problem();
        let n = problem.num_variables();
        let num_aux = self.formulation.kind().aux_len(problem.num_clauses());
        match policy {
            ExitPolicy::Ortant => vec![Box::new(OrtantExit::new(problem))],
            ExitPolicy::ConvergenceRadius => vec![Box::new(ConvergenceRadiusExit::new(problem))],
            ExitPolicy::NegativeAux => vec![Box::new(NegativeAux::new(n, num_aux, true))],
            ExitPolicy::Hypersphere => vec![
                Box::new(OrtantExit::new(problem)),
                Box::new(HypersphereCrossing::enter(n, self.hypersphere_radius)),
                Box::new(HypersphereCrossing::exit(n, self.hypersphere_radius)),
            ],
            ExitPolicy::None => Vec::new(),
        }
    }

    /// Integrate from the current state over `[0, t_max]` with the event set
    /// implied by the exit policy. The trajectory is stored for analysis;
    /// callers inspect `terminated_by` to learn how the run ended.
    pub fn solve(
        &mut self,
        t_max: f64,
        policy: ExitPolicy,
        integrator: &dyn Integrator,
        tolerances: &Tolerances,
    ) -> Result<&Trajectory> {
        let events = self.events_for_policy(policy);
        let formulation = &self.formulation;
        let rhs =
            move |t: f64, y: &[f64]| -> Result<Array1<f64>> { Ok(formulation.rhs(t, y)?) };
        let trajectory = integrator.integrate(
            &rhs,
            None,
            (0.0, t_max),
            self.state.clone(),
            tolerances,
            &events,
        )?;
        self.hypersphere_entry = find_entry(&trajectory);
        Ok(self.trajectory.insert(trajectory))
    }
}

fn find_entry(trajectory: &Trajectory) -> Option<(f64, Array1<f64>)> {
    let record = trajectory
        .fired
        .iter()
        .find(|record| record.kind == EventKind::HypersphereEnter)?;
    let idx = trajectory
        .times
        .iter()
        .position(|&t| t >= record.time)
        .unwrap_or(trajectory.times.len().saturating_sub(1));
    Some((record.time, trajectory.states.get(idx)?.clone()))
}
