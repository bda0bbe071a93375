use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProblemError {
    #[error("malformed cnf: {0}")]
    MalformedCnf(String),
    #[error("solution has {actual} variables, expected {expected}")]
    SolutionLength { expected: usize, actual: usize },
    #[error("clause {clause} contains a zero literal")]
    ZeroLiteral { clause: usize },
    #[error("literal {literal} in clause {clause} is out of range for {num_variables} variables")]
    LiteralOutOfRange {
        clause: usize,
        literal: i32,
        num_variables: usize,
    },
    #[error("variable {variable} is out of range, problem has {num_variables} variables")]
    VariableOutOfRange {
        variable: usize,
        num_variables: usize,
    },
    #[error("clause index {index} is out of range, problem has {num_clauses} clauses")]
    ClauseOutOfRange { index: usize, num_clauses: usize },
    #[error("4-SAT downconversion requires 4-literal clauses, clause {clause} has {literals}")]
    NotFourSat { clause: usize, literals: usize },
    #[error("cannot draw {literal_number} distinct variables out of {num_variables}")]
    InvalidClauseWidth {
        literal_number: usize,
        num_variables: usize,
    },
    #[error("planted generation gave up after {attempts} candidate clauses")]
    DegenerateGeneration { attempts: usize },
    #[error("refusing to enumerate 2^{num_variables} assignments")]
    EnumerationTooLarge { num_variables: usize },
    #[error("'{0}' is not a satisfying assignment of this problem")]
    UnknownSolution(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
