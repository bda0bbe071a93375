use crate::{ProblemError, SatProblem};
use std::{fs, path::Path};

/// Parse a DIMACS CNF document: a `p cnf N M` header followed by exactly M
/// clause lines, each a list of non-zero literals terminated by `0`.
/// Comment lines (`c ...`) before the header are skipped.
pub fn parse_cnf(input: &str) -> Result<SatProblem, ProblemError> {
    let mut lines = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('c'));

    let header = lines
        .next()
        .ok_or_else(|| ProblemError::MalformedCnf("missing header".to_string()))?;
    let tokens: Vec<&str> = header.split_whitespace().collect();
    if tokens.len() != 4 || tokens[0] != "p" || tokens[1] != "cnf" {
        return Err(ProblemError::MalformedCnf(format!(
            "invalid header '{}'",
            header
        )));
    }
    let num_variables: usize = tokens[2]
        .parse()
        .map_err(|_| ProblemError::MalformedCnf(format!("invalid variable count '{}'", tokens[2])))?;
    let num_clauses: usize = tokens[3]
        .parse()
        .map_err(|_| ProblemError::MalformedCnf(format!("invalid clause count '{}'", tokens[3])))?;

    let mut clauses = Vec::with_capacity(num_clauses);
    for (idx, line) in lines.enumerate() {
        if clauses.len() == num_clauses {
            return Err(ProblemError::MalformedCnf(format!(
                "expected {} clause lines, found more",
                num_clauses
            )));
        }
        let mut clause = Vec::new();
        let mut terminated = false;
        for token in line.split_whitespace() {
            let literal: i32 = token.parse().map_err(|_| {
                ProblemError::MalformedCnf(format!("invalid literal '{}' in clause {}", token, idx))
            })?;
            if literal == 0 {
                terminated = true;
                break;
            }
            clause.push(literal);
        }
        if !terminated {
            return Err(ProblemError::MalformedCnf(format!(
                "clause {} is not terminated by 0",
                idx
            )));
        }
        if clause.is_empty() {
            return Err(ProblemError::MalformedCnf(format!("clause {} is empty", idx)));
        }
        clauses.push(clause);
    }
    if clauses.len() != num_clauses {
        return Err(ProblemError::MalformedCnf(format!(
            "expected {} clause lines, found {}",
            num_clauses,
            clauses.len()
        )));
    }

    SatProblem::from_clauses(num_variables, clauses)
}

pub fn read_cnf_file<P: AsRef<Path>>(path: P) -> Result<SatProblem, ProblemError> {
    parse_cnf(&fs::read_to_string(path)?)
}

pub fn to_cnf_string(problem: &SatProblem) -> String {
    let mut out = format!(
        "p cnf {} {}\n",
        problem.num_variables(),
        problem.num_clauses()
    );
    for clause in problem.clauses() {
        for literal in clause {
            out.push_str(&literal.to_string());
            out.push(' ');
        }
        out.push_str("0\n");
    }
    out
}

pub fn write_cnf_file<P: AsRef<Path>>(problem: &SatProblem, path: P) -> Result<(), ProblemError> {
    fs::write(path, to_cnf_string(problem))?;
    Ok(())
}
