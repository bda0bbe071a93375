mod events;
mod integrate;
mod lyapunov;
mod solver;
mod trajectory;

pub use events::{
    ConvergenceRadiusExit, EventKind, HypercubeExit, HypersphereCrossing, NegativeAux, OrtantExit,
    TrajectoryEvent, CONVERGENCE_SIGMA,
};
pub use integrate::{ForwardEuler, Integrator, JacobianFn, RhsFn, RungeKutta4, Tolerances};
pub use lyapunov::lyapunov_exponents;
pub use solver::{CtdSolver, ExitPolicy, InitialConditions};
pub use trajectory::{EventRecord, Trajectory};
