use crate::{
    evaluator::check_state_len, DynamicsError, FormulationParams, OrtantMemory, RhsEvaluator,
    RhsKind,
};
use ctsat_problem::SatProblem;
use libloading::Library;
use ndarray::{Array1, Array2};
use std::path::Path;

type NativeRhsFn = unsafe extern "C" fn(i32, i32, *const i32, *const f64, *mut f64);

/// Accelerated evaluator backed by a shared library speaking the historical
/// C ABI: `rhsK(n, m, clause_matrix, state, out)` for kinds 1-5 and
/// `jacobian1(n, m, clause_matrix, state, out)`. Kinds 6-11 have no native
/// counterpart and are rejected.
pub struct NativeEvaluator {
    library: Library,
}

impl NativeEvaluator {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DynamicsError> {
        let library = unsafe { Library::new(path.as_ref()) }?;
        Ok(Self { library })
    }

    fn symbol(&self, name: &[u8]) -> Result<libloading::Symbol<'_, NativeRhsFn>, DynamicsError> {
        Ok(unsafe { self.library.get::<NativeRhsFn>(name)? })
    }

    fn call(
        &self,
        name: &[u8],
        problem: &SatProblem,
        state: &[f64],
        out_len: usize,
    ) -> Result<Vec<f64>, DynamicsError> {
        let function = self.symbol(name)?;
        let clause_matrix: Vec<i32> = problem.clause_matrix().iter().copied().collect();
        let mut out = vec![0.0; out_len];
        unsafe {
            function(
                problem.num_variables() as i32,
                problem.num_clauses() as i32,
                clause_matrix.as_ptr(),
                state.as_ptr(),
                out.as_mut_ptr(),
            );
        }
        Ok(out)
    }
}

impl RhsEvaluator for NativeEvaluator {
    fn evaluate_rhs(
        &self,
        kind: RhsKind,
        problem: &SatProblem,
        state: &[f64],
        _params: &FormulationParams,
        _memory: &OrtantMemory,
    ) -> Result<Array1<f64>, DynamicsError> {
        check_state_len(kind, problem, state)?;
        let name: &[u8] = match kind {
            RhsKind::One => b"rhs1",
            RhsKind::Two => b"rhs2",
            RhsKind::Three => b"rhs3",
            RhsKind::Four => b"rhs4",
            RhsKind::Five => b"rhs5",
            _ => return Err(DynamicsError::UnsupportedNativeKind(kind)),
        };
        let out = self.call(name, problem, state, state.len())?;
        Ok(Array1::from(out))
    }

    fn evaluate_jacobian(
        &self,
        kind: RhsKind,
        problem: &SatProblem,
        state: &[f64],
    ) -> Result<Array2<f64>, DynamicsError> {
        if kind != RhsKind::One {
            return Err(DynamicsError::UnsupportedNativeJacobian(kind));
        }
        check_state_len(kind, problem, state)?;
        let dim = problem.num_variables() + problem.num_clauses();
        let out = self.call(b"jacobian1", problem, state, dim * dim)?;
        Ok(Array2::from_shape_vec((dim, dim), out)?)
    }
}
