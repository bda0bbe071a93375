mod error;
mod evaluator;
mod formulation;
mod kinds;
mod memory;
mod native;
mod reference;

pub use error::DynamicsError;
pub use evaluator::{FormulationParams, RhsEvaluator};
pub use formulation::Formulation;
pub use kinds::RhsKind;
pub use memory::OrtantMemory;
pub use native::NativeEvaluator;
pub use reference::{clause_potential, partial_potential, ReferenceEvaluator};

/// Capacity of the failed-ortant repulsion buffer (formulation 6).
pub const TRIED_ORTANT_CAPACITY: usize = 100;

/// Central-potential coefficient shared by formulations 3-6.
pub const CENTRAL_POTENTIAL_B: f64 = 0.0725;
