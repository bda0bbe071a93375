mod dimacs;
mod error;
mod problem;

pub use dimacs::{parse_cnf, read_cnf_file, to_cnf_string, write_cnf_file};
pub use error::ProblemError;
pub use problem::{literal_satisfied, SatProblem};

/// Cap on brute-force solution enumeration. 2^N assignments are checked
/// against every clause, so anything past this is not worth attempting.
pub const MAX_ENUMERATION_VARIABLES: usize = 30;

/// Candidate draws per accepted clause before planted generation gives up.
pub const PLANTED_RETRY_LIMIT: usize = 100_000;
