use crate::EventKind;
use ndarray::Array1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRecord {
    pub time: f64,
    pub kind: EventKind,
}

/// Ordered `(time, state)` samples produced by one integration, strictly
/// increasing in time, plus every event crossing the integrator observed.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub states: Vec<Array1<f64>>,
    pub fired: Vec<EventRecord>,
    pub terminated_by: Option<EventKind>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn last_state(&self) -> Option<&Array1<f64>> {
        self.states.last()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    pub(crate) fn push(&mut self, time: f64, state: Array1<f64>) {
        self.times.push(time);
        self.states.push(state);
    }
}
