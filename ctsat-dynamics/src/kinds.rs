use crate::DynamicsError;
use serde::{Deserialize, Serialize};

/// The eleven right-hand-side formulations. They share the spin gradient and
/// differ in the auxiliary-variable law plus optional extra spin terms; see
/// the variant docs on `ReferenceEvaluator` for the exact equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RhsKind {
    /// `aux' = aux * K`, baseline exponential urgency growth.
    One,
    /// `aux' = aux * K^2`, steeper growth.
    Two,
    /// As Two plus the `sin(pi * s)` central potential.
    Three,
    /// Linear urgency plus the central potential.
    Four,
    /// Formulation Four with the entire right-hand side negated.
    Five,
    /// As Three plus repulsion away from previously failed ortants.
    Six,
    /// Log-urgency `z' = K - lambda * z`, spins weighted by `exp(z)`.
    Seven,
    /// Bounded memory `aux' = aux * (K^2 - lambda * ln(aux))`.
    Eight,
    /// Frozen auxiliaries, spins evolve on fixed weights.
    Nine,
    /// Pairwise second-order memory over a full M x M matrix.
    Ten,
    /// Formulation Ten over symmetric upper-triangle storage.
    Eleven,
}

impl RhsKind {
    pub const ALL: [RhsKind; 11] = [
        RhsKind::One,
        RhsKind::Two,
        RhsKind::Three,
        RhsKind::Four,
        RhsKind::Five,
        RhsKind::Six,
        RhsKind::Seven,
        RhsKind::Eight,
        RhsKind::Nine,
        RhsKind::Ten,
        RhsKind::Eleven,
    ];

    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|kind| kind == self)
            .map(|idx| idx + 1)
            .unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Result<Self, DynamicsError> {
        match index {
            1..=11 => Ok(Self::ALL[index - 1]),
            _ => Err(DynamicsError::UnknownKind(index.to_string())),
        }
    }

    /// Auxiliary-block length for a problem with `num_clauses` clauses.
    pub fn aux_len(&self, num_clauses: usize) -> usize {
        match self {
            RhsKind::Ten => num_clauses * num_clauses,
            RhsKind::Eleven => num_clauses * (num_clauses + 1) / 2,
            _ => num_clauses,
        }
    }

    /// Total state length; fixed for the lifetime of one integration.
    pub fn state_len(&self, num_variables: usize, num_clauses: usize) -> usize {
        num_variables + self.aux_len(num_clauses)
    }

    /// The analytic Jacobian exists for formulation Two only. Formulation
    /// One's was never derived upstream and must be reported as such.
    pub fn has_jacobian(&self) -> bool {
        matches!(self, RhsKind::Two)
    }
}

impl std::fmt::Display for RhsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.index())
    }
}

impl std::str::FromStr for RhsKind {
    type Err = DynamicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index: usize = s
            .parse()
            .map_err(|_| DynamicsError::UnknownKind(s.to_string()))?;
        Self::from_index(index)
    }
}
