use crate::{
    evaluator::check_state_len, DynamicsError, FormulationParams, OrtantMemory, RhsEvaluator,
    RhsKind, CENTRAL_POTENTIAL_B,
};
use ctsat_problem::SatProblem;
use ndarray::{Array1, Array2};
use std::f64::consts::PI;

/// Pure-Rust evaluation of every formulation, used both directly and as the
/// correctness baseline for accelerated backends.
pub struct ReferenceEvaluator;

/// Clause potential `K(m, s) = 2^-L_m * prod_j (1 - c[m,j] * s[j])`.
/// Zero exactly when the clause is satisfied by `sign(s)` at a corner.
pub fn clause_potential(problem: &SatProblem, m: usize, s: &[f64]) -> f64 {
    let scale = 2f64.powi(-(problem.literal_counts()[m] as i32));
    scale
        * problem.clauses()[m]
            .iter()
            .map(|&l| 1.0 - l.signum() as f64 * s[l.unsigned_abs() as usize - 1])
            .product::<f64>()
}

/// Partial potential `k(m, i, s)`: the same product with variable `i`
/// (0-based) excluded.
pub fn partial_potential(problem: &SatProblem, m: usize, skip: usize, s: &[f64]) -> f64 {
    let scale = 2f64.powi(-(problem.literal_counts()[m] as i32));
    scale
        * problem.clauses()[m]
            .iter()
            .filter(|&&l| l.unsigned_abs() as usize - 1 != skip)
            .map(|&l| 1.0 - l.signum() as f64 * s[l.unsigned_abs() as usize - 1])
            .product::<f64>()
}

/// Product with two variables excluded, needed by the Jacobian off-diagonal.
fn pair_potential(problem: &SatProblem, m: usize, skip_a: usize, skip_b: usize, s: &[f64]) -> f64 {
    let scale = 2f64.powi(-(problem.literal_counts()[m] as i32));
    scale
        * problem.clauses()[m]
            .iter()
            .filter(|&&l| {
                let j = l.unsigned_abs() as usize - 1;
                j != skip_a && j != skip_b
            })
            .map(|&l| 1.0 - l.signum() as f64 * s[l.unsigned_abs() as usize - 1])
            .product::<f64>()
}

/// Accumulate the common spin term: for every clause m and every variable i
/// of that clause, `ds_i += 2 * w_m * c[m,i] * (1 - c[m,i]*s_i) * k(m,i,s)^2`.
fn add_spin_gradient(problem: &SatProblem, s: &[f64], weights: &[f64], ds: &mut [f64]) {
    for (m, clause) in problem.clauses().iter().enumerate() {
        for &l in clause {
            let i = l.unsigned_abs() as usize - 1;
            let c = l.signum() as f64;
            let kmi = partial_potential(problem, m, i, s);
            ds[i] += 2.0 * weights[m] * c * (1.0 - c * s[i]) * kmi * kmi;
        }
    }
}

fn add_central_potential(s: &[f64], aux: &[f64], alpha: f64, ds: &mut [f64]) {
    let mean_aux = aux.iter().sum::<f64>() / aux.len() as f64;
    let constant = 0.5 * PI * CENTRAL_POTENTIAL_B * alpha * mean_aux;
    for (i, &si) in s.iter().enumerate() {
        ds[i] += constant * (PI * si).sin();
    }
}

fn add_ortant_repulsion(s: &[f64], memory: &OrtantMemory, rho: f64, ds: &mut [f64]) {
    for ortant in memory.iter() {
        let mut norm_sq = 0.0;
        for (i, &si) in s.iter().enumerate() {
            let diff = si - ortant[i];
            norm_sq += diff * diff;
        }
        let norm = norm_sq.sqrt();
        if norm < 1e-12 {
            continue;
        }
        let coefficient = rho / (norm * norm * norm);
        for (i, &si) in s.iter().enumerate() {
            ds[i] += coefficient * (si - ortant[i]);
        }
    }
}

/// Upper-triangle index of the symmetric pairwise memory (m <= n).
fn triangle_index(num_clauses: usize, m: usize, n: usize) -> usize {
    m * (2 * num_clauses - m + 1) / 2 + (n - m)
}

impl RhsEvaluator for ReferenceEvaluator {
    fn evaluate_rhs(
        &self,
        kind: RhsKind,
        problem: &SatProblem,
        state: &[f64],
        params: &FormulationParams,
        memory: &OrtantMemory,
    ) -> Result<Array1<f64>, DynamicsError> {
        check_state_len(kind, problem, state)?;
        let n = problem.num_variables();
        let m = problem.num_clauses();
        let (s, aux) = state.split_at(n);
        let mut out = vec![0.0; state.len()];
        let (ds, daux) = out.split_at_mut(n);

        match kind {
            RhsKind::One => {
                add_spin_gradient(problem, s, aux, ds);
                for (idx, value) in daux.iter_mut().enumerate() {
                    *value = aux[idx] * clause_potential(problem, idx, s);
                }
            }
            RhsKind::Two => {
                add_spin_gradient(problem, s, aux, ds);
                for (idx, value) in daux.iter_mut().enumerate() {
                    let big_k = clause_potential(problem, idx, s);
                    *value = aux[idx] * big_k * big_k;
                }
            }
            RhsKind::Three | RhsKind::Six => {
                add_spin_gradient(problem, s, aux, ds);
                add_central_potential(s, aux, problem.alpha(), ds);
                if kind == RhsKind::Six {
                    add_ortant_repulsion(s, memory, params.repulsion_strength, ds);
                }
                for (idx, value) in daux.iter_mut().enumerate() {
                    let big_k = clause_potential(problem, idx, s);
                    *value = aux[idx] * big_k * big_k;
                }
            }
            RhsKind::Four | RhsKind::Five => {
                add_spin_gradient(problem, s, aux, ds);
                add_central_potential(s, aux, problem.alpha(), ds);
                for (idx, value) in daux.iter_mut().enumerate() {
                    *value = aux[idx] * clause_potential(problem, idx, s);
                }
                if kind == RhsKind::Five {
                    for value in out.iter_mut() {
                        *value = -*value;
                    }
                    return Ok(Array1::from(out));
                }
            }
            RhsKind::Seven => {
                // aux holds log-urgencies z; spins are weighted by exp(z)
                let weights: Vec<f64> = aux.iter().map(|&z| z.exp()).collect();
                add_spin_gradient(problem, s, &weights, ds);
                for (idx, value) in daux.iter_mut().enumerate() {
                    *value = clause_potential(problem, idx, s) - params.memory_decay * aux[idx];
                }
            }
            RhsKind::Eight => {
                add_spin_gradient(problem, s, aux, ds);
                for (idx, value) in daux.iter_mut().enumerate() {
                    let big_k = clause_potential(problem, idx, s);
                    *value = aux[idx] * (big_k * big_k - params.memory_decay * aux[idx].ln());
                }
            }
            RhsKind::Nine => {
                add_spin_gradient(problem, s, aux, ds);
            }
            RhsKind::Ten => {
                let potentials: Vec<f64> =
                    (0..m).map(|idx| clause_potential(problem, idx, s)).collect();
                let mut weights = vec![0.0; m];
                for row in 0..m {
                    for col in 0..m {
                        weights[row] += aux[row * m + col] * potentials[col];
                    }
                }
                add_spin_gradient(problem, s, &weights, ds);
                for row in 0..m {
                    for col in 0..m {
                        let idx = row * m + col;
                        daux[idx] = aux[idx] * potentials[row] * potentials[col];
                    }
                }
            }
            RhsKind::Eleven => {
                let potentials: Vec<f64> =
                    (0..m).map(|idx| clause_potential(problem, idx, s)).collect();
                let mut weights = vec![0.0; m];
                for row in 0..m {
                    for col in 0..m {
                        let idx = triangle_index(m, row.min(col), row.max(col));
                        weights[row] += aux[idx] * potentials[col];
                    }
                }
                add_spin_gradient(problem, s, &weights, ds);
                for row in 0..m {
                    for col in row..m {
                        let idx = triangle_index(m, row, col);
                        daux[idx] = aux[idx] * potentials[row] * potentials[col];
                    }
                }
            }
        }

        Ok(Array1::from(out))
    }

    fn evaluate_jacobian(
        &self,
        kind: RhsKind,
        problem: &SatProblem,
        state: &[f64],
    ) -> Result<Array2<f64>, DynamicsError> {
        if !kind.has_jacobian() {
            return Err(DynamicsError::UnimplementedJacobian(kind));
        }
        check_state_len(kind, problem, state)?;
        let n = problem.num_variables();
        let m = problem.num_clauses();
        let (s, aux) = state.split_at(n);
        let mut jacobian = Array2::zeros((n + m, n + m));

        for (clause_idx, clause) in problem.clauses().iter().enumerate() {
            let a = aux[clause_idx];
            let big_k = clause_potential(problem, clause_idx, s);

            for &li in clause {
                let i = li.unsigned_abs() as usize - 1;
                let ci = li.signum() as f64;
                let kmi = partial_potential(problem, clause_idx, i, s);

                // d(ds_i)/ds_i and d(ds_i)/da_m
                jacobian[[i, i]] += -2.0 * a * kmi * kmi;
                jacobian[[i, n + clause_idx]] += 2.0 * ci * (1.0 - ci * s[i]) * kmi * kmi;

                // d(da_m)/ds_i for aux' = a * K^2
                jacobian[[n + clause_idx, i]] += -2.0 * a * ci * big_k * kmi;

                // d(ds_i)/ds_j across distinct variables of the same clause
                for &lj in clause {
                    let j = lj.unsigned_abs() as usize - 1;
                    if j == i {
                        continue;
                    }
                    let cj = lj.signum() as f64;
                    let kmij = pair_potential(problem, clause_idx, i, j, s);
                    jacobian[[i, j]] += -4.0
                        * a
                        * ci
                        * cj
                        * (1.0 - ci * s[i])
                        * (1.0 - cj * s[j])
                        * kmij
                        * kmij;
                }
            }

            jacobian[[n + clause_idx, n + clause_idx]] = big_k * big_k;
        }

        Ok(jacobian)
    }
}
