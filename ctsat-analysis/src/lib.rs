use ctsat_problem::SatProblem;
use ctsat_solver::Trajectory;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("bitstrings have different lengths: {0} vs {1}")]
    LengthMismatch(usize, usize),
}

/// Read the final sample's spins off as a bitstring, positive mapping to
/// '1'. None when the trajectory is empty.
pub fn decode(trajectory: &Trajectory, num_variables: usize) -> Option<String> {
    let state = trajectory.last_state()?;
    Some(
        state
            .iter()
            .take(num_variables)
            .map(|&s| if s > 0.0 { '1' } else { '0' })
            .collect(),
    )
}

/// Discretize every sample to its sign pattern and count satisfied clauses.
pub fn satisfied_clauses_over_time(
    problem: &SatProblem,
    trajectory: &Trajectory,
) -> (Vec<f64>, Vec<usize>) {
    let counts = trajectory
        .states
        .iter()
        .map(|state| {
            let discrete: Vec<f64> = state
                .iter()
                .take(problem.num_variables())
                .map(|&s| if s > 0.0 { 1.0 } else { -1.0 })
                .collect();
            problem.num_satisfied_clauses(&discrete)
        })
        .collect();
    (trajectory.times.clone(), counts)
}

/// Cumulative Euclidean arc length of the spin subvector; starts at 0.
pub fn trajectory_length(trajectory: &Trajectory, num_variables: usize) -> Vec<f64> {
    let mut lengths = Vec::with_capacity(trajectory.len());
    let mut total = 0.0;
    for (idx, state) in trajectory.states.iter().enumerate() {
        if idx > 0 {
            let previous = &trajectory.states[idx - 1];
            total += state
                .iter()
                .zip(previous.iter())
                .take(num_variables)
                .map(|(&a, &b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt();
        }
        lengths.push(total);
    }
    lengths
}

/// Number of differing positions between two equal-length bitstrings.
pub fn hamming_distance(a: &str, b: &str) -> Result<usize, AnalysisError> {
    if a.len() != b.len() {
        return Err(AnalysisError::LengthMismatch(a.len(), b.len()));
    }
    Ok(a.chars().zip(b.chars()).filter(|(x, y)| x != y).count())
}

/// Group solutions by Hamming-distance-1 adjacency. Each solution joins the
/// cluster of the first already-clustered solution it is adjacent to, and
/// clusters are never merged afterwards, so two clusters connected through a
/// later path stay separate. That matches the historical behavior and is
/// asserted as-is by the tests; it is not a transitive closure.
pub fn cluster_solutions(
    solutions: &[String],
) -> Result<BTreeMap<usize, Vec<String>>, AnalysisError> {
    let mut clusters: BTreeMap<usize, Vec<String>> = BTreeMap::new();

    let clustered = |clusters: &BTreeMap<usize, Vec<String>>, solution: &str| {
        clusters.values().any(|members| {
            members
                .iter()
                .any(|member| member == solution)
        })
    };
    let key_of = |clusters: &BTreeMap<usize, Vec<String>>, solution: &str| {
        clusters
            .iter()
            .find(|(_, members)| members.iter().any(|member| member == solution))
            .map(|(&key, _)| key)
    };

    for (idx, solution) in solutions.iter().enumerate() {
        if !clustered(&clusters, solution) {
            clusters.insert(idx, vec![solution.clone()]);
        }
        for other in solutions {
            if other != solution
                && !clustered(&clusters, other)
                && hamming_distance(solution, other)? == 1
            {
                if let Some(key) = key_of(&clusters, solution) {
                    if let Some(members) = clusters.get_mut(&key) {
                        members.push(other.clone());
                    }
                }
            }
        }
    }

    Ok(clusters)
}
