use crate::RhsKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DynamicsError {
    #[error("no analytic jacobian for formulation {0}")]
    UnimplementedJacobian(RhsKind),
    #[error(
        "state has {actual} components, formulation {kind} over {num_variables} variables \
         and {num_clauses} clauses needs {expected}"
    )]
    StateLength {
        kind: RhsKind,
        num_variables: usize,
        num_clauses: usize,
        expected: usize,
        actual: usize,
    },
    #[error("native evaluator does not implement formulation {0}")]
    UnsupportedNativeKind(RhsKind),
    #[error("native evaluator has no jacobian for formulation {0}")]
    UnsupportedNativeJacobian(RhsKind),
    #[error("{0} is not a formulation kind")]
    UnknownKind(String),
    #[error(transparent)]
    NativeLoad(#[from] libloading::Error),
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}
