use crate::{CtdSolver, ExitPolicy, Integrator, Tolerances, Trajectory};
use anyhow::Result;
use ctsat_dynamics::DynamicsError;
use ndarray::{s, Array1, Array2};

impl<'a> CtdSolver<'a> {
    /// Continuous-QR Lyapunov spectrum estimation: augment the state with an
    /// orthonormal frame U and accumulated exponents L, where
    /// `A = U^T * Df * U`, `dL = diag(A)`, A is antisymmetrized (diagonal
    /// zeroed, upper triangle mirrored from the lower with flipped sign) and
    /// `dU = U * A`. Requires the analytic Jacobian, so only formulation 2
    /// qualifies.
    pub fn lyapunov_solve(
        &mut self,
        t_max: f64,
        policy: ExitPolicy,
        integrator: &dyn Integrator,
        tolerances: &Tolerances,
    ) -> Result<&Trajectory> {
        let kind = self.formulation.kind();
        if !kind.has_jacobian() {
            return Err(DynamicsError::UnimplementedJacobian(kind).into());
        }
        let problem = self.formulation.problem();
        let dim = problem.num_variables() + problem.num_clauses();
        let events = self.events_for_policy(policy);

        let formulation = &self.formulation;
        let rhs = move |t: f64, y: &[f64]| -> Result<Array1<f64>> {
            let base = &y[..dim];
            let f = formulation.rhs(t, base)?;
            let df = formulation.jacobian(base)?;
            let frame = Array2::from_shape_vec((dim, dim), y[dim..dim + dim * dim].to_vec())?;
            let mut rotation = frame.t().dot(&df.dot(&frame));
            let exponents: Vec<f64> = (0..dim).map(|i| rotation[[i, i]]).collect();
            for i in 0..dim {
                rotation[[i, i]] = 0.0;
                for j in (i + 1)..dim {
                    rotation[[i, j]] = -rotation[[j, i]];
                }
            }
            let dframe = frame.dot(&rotation);
            let mut out = Vec::with_capacity(2 * dim + dim * dim);
            out.extend(f.iter());
            out.extend(dframe.iter());
            out.extend(exponents);
            Ok(Array1::from(out))
        };

        let mut y0 = Vec::with_capacity(2 * dim + dim * dim);
        y0.extend(self.state.iter());
        y0.extend(Array2::<f64>::eye(dim).iter());
        y0.extend(std::iter::repeat(0.0).take(dim));

        let trajectory = integrator.integrate(
            &rhs,
            None,
            (0.0, t_max),
            Array1::from(y0),
            tolerances,
            &events,
        )?;
        Ok(self.trajectory.insert(trajectory))
    }
}

/// Finite-time Lyapunov exponents `L_i(t) / t` from the final sample of a
/// `lyapunov_solve` trajectory. `dim` is the base state length N + M.
pub fn lyapunov_exponents(trajectory: &Trajectory, dim: usize) -> Option<Array1<f64>> {
    let state = trajectory.last_state()?;
    let time = trajectory.last_time()?;
    let accumulated = state.slice(s![dim + dim * dim..]);
    if time > 0.0 {
        Some(accumulated.mapv(|value| value / time))
    } else {
        Some(accumulated.to_owned())
    }
}
