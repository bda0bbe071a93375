use crate::{EventRecord, Trajectory, TrajectoryEvent};
use anyhow::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

pub type RhsFn<'a> = dyn Fn(f64, &[f64]) -> Result<Array1<f64>> + 'a;
pub type JacobianFn<'a> = dyn Fn(f64, &[f64]) -> Result<Array2<f64>> + 'a;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tolerances {
    pub atol: f64,
    pub rtol: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            atol: 1e-6,
            rtol: 1e-3,
        }
    }
}

/// The external-integrator contract: march `y' = rhs(t, y)` over `t_span`
/// and stop early when a terminal event crosses from negative to
/// non-negative. Implementations report every observed crossing with its
/// time, and the terminal one (if any) in `terminated_by`.
pub trait Integrator {
    fn integrate(
        &self,
        rhs: &RhsFn<'_>,
        jacobian: Option<&JacobianFn<'_>>,
        t_span: (f64, f64),
        y0: Array1<f64>,
        tolerances: &Tolerances,
        events: &[Box<dyn TrajectoryEvent + '_>],
    ) -> Result<Trajectory>;
}

/// Explicit forward Euler with a fixed step, bounded by `max_steps`.
#[derive(Debug, Clone, Copy)]
pub struct ForwardEuler {
    pub step_size: f64,
    pub max_steps: usize,
}

impl Default for ForwardEuler {
    fn default() -> Self {
        Self {
            step_size: 0.0025,
            max_steps: 10_000,
        }
    }
}

impl Integrator for ForwardEuler {
    fn integrate(
        &self,
        rhs: &RhsFn<'_>,
        _jacobian: Option<&JacobianFn<'_>>,
        t_span: (f64, f64),
        y0: Array1<f64>,
        _tolerances: &Tolerances,
        events: &[Box<dyn TrajectoryEvent + '_>],
    ) -> Result<Trajectory> {
        let step = |t: f64, y: &Array1<f64>, h: f64| -> Result<Array1<f64>> {
            let dy = rhs(t, as_slice(y))?;
            Ok(y + &(dy * h))
        };
        march(&step, self.step_size, self.max_steps, t_span, y0, events)
    }
}

/// Classic fourth-order Runge-Kutta with a fixed step.
#[derive(Debug, Clone, Copy)]
pub struct RungeKutta4 {
    pub step_size: f64,
    pub max_steps: usize,
}

impl Default for RungeKutta4 {
    fn default() -> Self {
        Self {
            step_size: 0.0025,
            max_steps: 10_000,
        }
    }
}

impl Integrator for RungeKutta4 {
    fn integrate(
        &self,
        rhs: &RhsFn<'_>,
        _jacobian: Option<&JacobianFn<'_>>,
        t_span: (f64, f64),
        y0: Array1<f64>,
        _tolerances: &Tolerances,
        events: &[Box<dyn TrajectoryEvent + '_>],
    ) -> Result<Trajectory> {
        let step = |t: f64, y: &Array1<f64>, h: f64| -> Result<Array1<f64>> {
            let k1 = rhs(t, as_slice(y))? * h;
            let y2 = y + &(&k1 * 0.5);
            let k2 = rhs(t + 0.5 * h, as_slice(&y2))? * h;
            let y3 = y + &(&k2 * 0.5);
            let k3 = rhs(t + 0.5 * h, as_slice(&y3))? * h;
            let y4 = y + &k3;
            let k4 = rhs(t + h, as_slice(&y4))? * h;
            Ok(y + &((k1 + k2 * 2.0 + k3 * 2.0 + k4) / 6.0))
        };
        march(&step, self.step_size, self.max_steps, t_span, y0, events)
    }
}

fn as_slice(y: &Array1<f64>) -> &[f64] {
    y.as_slice().unwrap_or(&[])
}

type StepFn<'a> = dyn Fn(f64, &Array1<f64>, f64) -> Result<Array1<f64>> + 'a;

fn march(
    step: &StepFn<'_>,
    step_size: f64,
    max_steps: usize,
    t_span: (f64, f64),
    y0: Array1<f64>,
    events: &[Box<dyn TrajectoryEvent + '_>],
) -> Result<Trajectory> {
    let (t0, t_max) = t_span;
    let mut trajectory = Trajectory::default();
    let mut t = t0;
    let mut y = y0;
    trajectory.push(t, y.clone());

    // An event that is already non-negative at t0 counts as an immediate
    // crossing; there is nothing to integrate past a terminal one.
    let mut previous: Vec<f64> = Vec::with_capacity(events.len());
    for event in events {
        let value = event.value(t, as_slice(&y));
        if value >= 0.0 {
            trajectory.fired.push(EventRecord {
                time: t,
                kind: event.kind(),
            });
            if event.terminal() && trajectory.terminated_by.is_none() {
                trajectory.terminated_by = Some(event.kind());
            }
        }
        previous.push(value);
    }
    if trajectory.terminated_by.is_some() {
        return Ok(trajectory);
    }

    for _ in 0..max_steps {
        if t >= t_max {
            break;
        }
        let h = step_size.min(t_max - t);
        y = step(t, &y, h)?;
        let t_prev = t;
        t += h;
        trajectory.push(t, y.clone());

        let mut stop = false;
        for (idx, event) in events.iter().enumerate() {
            let value = event.value(t, as_slice(&y));
            if previous[idx] < 0.0 && value >= 0.0 {
                // linear bracketing of the crossing inside the step
                let fraction = previous[idx] / (previous[idx] - value);
                trajectory.fired.push(EventRecord {
                    time: t_prev + fraction * h,
                    kind: event.kind(),
                });
                if event.terminal() {
                    trajectory.terminated_by = Some(event.kind());
                    stop = true;
                }
            }
            previous[idx] = value;
        }
        if stop {
            break;
        }
    }

    Ok(trajectory)
}
