use crate::{ProblemError, MAX_ENUMERATION_VARIABLES, PLANTED_RETRY_LIMIT};
use ndarray::Array2;
use rand::{
    distributions::{Distribution, Uniform},
    rngs::{SmallRng, StdRng},
    Rng, SeedableRng,
};
use serde::{Deserialize, Serialize};

/// True if the assignment makes the literal true.
pub fn literal_satisfied(literal: i32, assignment: &[bool]) -> bool {
    let var_idx = literal.unsigned_abs() as usize - 1;
    (literal > 0 && assignment[var_idx]) || (literal < 0 && !assignment[var_idx])
}

/// A CNF instance together with its derived coefficient matrix.
///
/// Literals are 1-based signed integers; matrix columns are 0-based. The
/// matrix, clause density and the enumerated-solution cache are derived
/// state: every mutating operation rebuilds the first two and drops the
/// cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "ProblemData", try_from = "ProblemData")]
pub struct SatProblem {
    num_variables: usize,
    clauses: Vec<Vec<i32>>,
    literal_counts: Vec<usize>,
    clause_matrix: Array2<i32>,
    alpha: f64,
    planted_solutions: Option<Vec<Vec<bool>>>,
    valid_solutions: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize)]
struct ProblemData {
    num_variables: usize,
    clauses: Vec<Vec<i32>>,
    planted_solutions: Option<Vec<Vec<bool>>>,
}

impl From<SatProblem> for ProblemData {
    fn from(problem: SatProblem) -> Self {
        Self {
            num_variables: problem.num_variables,
            clauses: problem.clauses,
            planted_solutions: problem.planted_solutions,
        }
    }
}

impl TryFrom<ProblemData> for SatProblem {
    type Error = ProblemError;

    fn try_from(data: ProblemData) -> Result<Self, Self::Error> {
        let mut problem = SatProblem::from_clauses(data.num_variables, data.clauses)?;
        problem.planted_solutions = data.planted_solutions;
        Ok(problem)
    }
}

impl SatProblem {
    pub fn from_clauses(
        num_variables: usize,
        clauses: Vec<Vec<i32>>,
    ) -> Result<Self, ProblemError> {
        for (idx, clause) in clauses.iter().enumerate() {
            for &literal in clause {
                if literal == 0 {
                    return Err(ProblemError::ZeroLiteral { clause: idx });
                }
                if literal.unsigned_abs() as usize > num_variables {
                    return Err(ProblemError::LiteralOutOfRange {
                        clause: idx,
                        literal,
                        num_variables,
                    });
                }
            }
        }
        let literal_counts = clauses.iter().map(|clause| clause.len()).collect();
        let mut problem = Self {
            num_variables,
            clauses,
            literal_counts,
            clause_matrix: Array2::zeros((0, 0)),
            alpha: 0.0,
            planted_solutions: None,
            valid_solutions: None,
        };
        problem.rebuild();
        Ok(problem)
    }

    /// Random k-SAT: `floor(n * alpha) + 1` clauses, each over `literal_number`
    /// distinct variables with independently random polarities.
    pub fn generate_random(
        seed: &[u8; 32],
        num_variables: usize,
        alpha: f64,
        literal_number: usize,
    ) -> Result<Self, ProblemError> {
        check_clause_width(num_variables, literal_number)?;
        let mut rng = SmallRng::from_seed(StdRng::from_seed(seed.clone()).gen());
        let num_clauses = (num_variables as f64 * alpha).floor() as usize + 1;
        let clauses = (0..num_clauses)
            .map(|_| random_clause(&mut rng, num_variables, literal_number))
            .collect();
        Self::from_clauses(num_variables, clauses)
    }

    /// Random instance constrained so that `num_planted` randomly drawn
    /// assignments all satisfy every clause. Candidate clauses that violate
    /// any planted assignment are re-drawn; generation fails once the retry
    /// budget for a clause is exhausted.
    pub fn generate_planted(
        seed: &[u8; 32],
        num_variables: usize,
        alpha: f64,
        literal_number: usize,
        num_planted: usize,
    ) -> Result<Self, ProblemError> {
        check_clause_width(num_variables, literal_number)?;
        let mut rng = SmallRng::from_seed(StdRng::from_seed(seed.clone()).gen());
        let num_clauses = (num_variables as f64 * alpha).floor() as usize + 1;
        let planted: Vec<Vec<bool>> = (0..num_planted)
            .map(|_| (0..num_variables).map(|_| rng.gen::<bool>()).collect())
            .collect();

        let mut clauses = Vec::with_capacity(num_clauses);
        while clauses.len() < num_clauses {
            let mut accepted = false;
            for _ in 0..PLANTED_RETRY_LIMIT {
                let candidate = random_clause(&mut rng, num_variables, literal_number);
                if planted
                    .iter()
                    .all(|assignment| candidate.iter().any(|&l| literal_satisfied(l, assignment)))
                {
                    clauses.push(candidate);
                    accepted = true;
                    break;
                }
            }
            if !accepted {
                return Err(ProblemError::DegenerateGeneration {
                    attempts: PLANTED_RETRY_LIMIT,
                });
            }
        }

        let mut problem = Self::from_clauses(num_variables, clauses)?;
        problem.planted_solutions = Some(planted);
        Ok(problem)
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> &[Vec<i32>] {
        &self.clauses
    }

    pub fn literal_counts(&self) -> &[usize] {
        &self.literal_counts
    }

    /// M x N matrix of {-1, 0, +1}: +1 where the variable appears positively
    /// in the clause, -1 negatively, 0 when absent.
    pub fn clause_matrix(&self) -> &Array2<i32> {
        &self.clause_matrix
    }

    /// Clause density M / N.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn planted_solutions(&self) -> Option<&[Vec<bool>]> {
        self.planted_solutions.as_deref()
    }

    /// Whether the assignment satisfies every clause.
    pub fn check_solution(&self, assignment: &[bool]) -> Result<bool, ProblemError> {
        if assignment.len() != self.num_variables {
            return Err(ProblemError::SolutionLength {
                expected: self.num_variables,
                actual: assignment.len(),
            });
        }
        for (idx, clause) in self.clauses.iter().enumerate() {
            if clause.contains(&0) {
                return Err(ProblemError::ZeroLiteral { clause: idx });
            }
            if !clause.iter().any(|&l| literal_satisfied(l, assignment)) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Count of clauses satisfied by a discretized spin vector; an entry is
    /// read as true when positive.
    pub fn num_satisfied_clauses(&self, discrete: &[f64]) -> usize {
        self.clauses
            .iter()
            .filter(|clause| {
                clause.iter().any(|&l| {
                    let value = discrete[l.unsigned_abs() as usize - 1];
                    (l > 0 && value > 0.0) || (l < 0 && value <= 0.0)
                })
            })
            .count()
    }

    /// 1-based index of the variable appearing in the fewest clauses, ties
    /// broken by the lowest index.
    pub fn smallest_variable(&self) -> usize {
        let mut used_in = vec![0usize; self.num_variables];
        for clause in &self.clauses {
            for &literal in clause {
                used_in[literal.unsigned_abs() as usize - 1] += 1;
            }
        }
        let (idx, _) = used_in
            .iter()
            .enumerate()
            .min_by_key(|&(idx, count)| (count, idx))
            .unwrap_or((0, &0));
        idx + 1
    }

    /// Delete a variable: clauses it appears in are dropped entirely (their
    /// filtered length no longer matches their literal count) and all higher
    /// variable indices shift down by one.
    pub fn remove_variable(&mut self, variable: usize) -> Result<(), ProblemError> {
        if variable == 0 || variable > self.num_variables {
            return Err(ProblemError::VariableOutOfRange {
                variable,
                num_variables: self.num_variables,
            });
        }
        let v = variable as i32;
        let mut new_clauses = Vec::with_capacity(self.clauses.len());
        for (idx, clause) in self.clauses.iter().enumerate() {
            let filtered: Vec<i32> = clause
                .iter()
                .filter(|&&l| l != v && l != -v)
                .map(|&l| {
                    if l > v {
                        l - 1
                    } else if l < -v {
                        l + 1
                    } else {
                        l
                    }
                })
                .collect();
            if filtered.len() == self.literal_counts[idx] {
                new_clauses.push(filtered);
            }
        }
        self.clauses = new_clauses;
        self.literal_counts = self.clauses.iter().map(|clause| clause.len()).collect();
        self.num_variables -= 1;
        self.planted_solutions = None;
        self.rebuild();
        Ok(())
    }

    /// Split every 4-literal clause into two 3-literal clauses linked by a
    /// fresh auxiliary variable with opposite polarity. Clause count doubles
    /// and the variable count grows by the original clause count.
    pub fn downconvert_4_to_3(&mut self) -> Result<(), ProblemError> {
        for (idx, &count) in self.literal_counts.iter().enumerate() {
            if count != 4 {
                return Err(ProblemError::NotFourSat {
                    clause: idx,
                    literals: count,
                });
            }
        }
        let n = self.num_variables as i32;
        let mut new_clauses = Vec::with_capacity(self.clauses.len() * 2);
        for (idx, clause) in self.clauses.iter().enumerate() {
            let aux = n + idx as i32 + 1;
            new_clauses.push(vec![clause[0], clause[1], aux]);
            new_clauses.push(vec![clause[2], clause[3], -aux]);
        }
        self.num_variables += self.clauses.len();
        self.clauses = new_clauses;
        self.literal_counts = self.clauses.iter().map(|clause| clause.len()).collect();
        self.planted_solutions = None;
        self.rebuild();
        Ok(())
    }

    /// If two or more literals of the clause are true under every one of the
    /// given assignments, flip the first of them. Returns whether a flip
    /// happened.
    pub fn harden_clause(
        &mut self,
        index: usize,
        given_solutions: &[Vec<bool>],
    ) -> Result<bool, ProblemError> {
        if index >= self.clauses.len() {
            return Err(ProblemError::ClauseOutOfRange {
                index,
                num_clauses: self.clauses.len(),
            });
        }
        for assignment in given_solutions {
            if assignment.len() != self.num_variables {
                return Err(ProblemError::SolutionLength {
                    expected: self.num_variables,
                    actual: assignment.len(),
                });
            }
        }
        let always_true: Vec<usize> = self.clauses[index]
            .iter()
            .enumerate()
            .filter(|(_, &l)| {
                given_solutions
                    .iter()
                    .all(|assignment| literal_satisfied(l, assignment))
            })
            .map(|(pos, _)| pos)
            .collect();
        if always_true.len() < 2 {
            return Ok(false);
        }
        let pos = always_true[0];
        self.clauses[index][pos] = -self.clauses[index][pos];
        self.rebuild();
        Ok(true)
    }

    /// Brute-force enumeration of every satisfying assignment as MSB-first
    /// bitstrings, in lexicographic bit-pattern order. O(2^N * M * L), cached
    /// until the next mutation.
    pub fn all_solutions(&mut self) -> Result<&[String], ProblemError> {
        if self.valid_solutions.is_none() {
            if self.num_variables > MAX_ENUMERATION_VARIABLES {
                return Err(ProblemError::EnumerationTooLarge {
                    num_variables: self.num_variables,
                });
            }
            let n = self.num_variables;
            let mut valid = Vec::new();
            for pattern in 0u64..(1u64 << n) {
                let bits = format!("{:0width$b}", pattern, width = n);
                let assignment: Vec<bool> = bits.chars().map(|c| c == '1').collect();
                if self.check_solution(&assignment)? {
                    valid.push(bits);
                }
            }
            self.valid_solutions = Some(valid);
        }
        Ok(self.valid_solutions.as_deref().unwrap_or_default())
    }

    /// Position of a bitstring within `all_solutions()`.
    pub fn solution_index(&mut self, solution: &str) -> Result<usize, ProblemError> {
        let position = self.all_solutions()?.iter().position(|s| s == solution);
        position.ok_or_else(|| ProblemError::UnknownSolution(solution.to_string()))
    }

    fn rebuild(&mut self) {
        let (m, n) = (self.clauses.len(), self.num_variables);
        let mut matrix = Array2::zeros((m, n));
        for (row, clause) in self.clauses.iter().enumerate() {
            for &literal in clause {
                let col = literal.unsigned_abs() as usize - 1;
                if literal > 0 {
                    matrix[[row, col]] = 1;
                } else if matrix[[row, col]] == 0 {
                    matrix[[row, col]] = -1;
                }
            }
        }
        self.clause_matrix = matrix;
        self.alpha = m as f64 / n as f64;
        self.valid_solutions = None;
    }
}

fn check_clause_width(num_variables: usize, literal_number: usize) -> Result<(), ProblemError> {
    if literal_number == 0 || literal_number > num_variables {
        return Err(ProblemError::InvalidClauseWidth {
            literal_number,
            num_variables,
        });
    }
    Ok(())
}

fn random_clause<R: Rng>(rng: &mut R, num_variables: usize, literal_number: usize) -> Vec<i32> {
    let var_distr = Uniform::new(1, num_variables as i32 + 1);
    let neg_distr = Uniform::new(0, 2);
    let mut variables: Vec<i32> = Vec::with_capacity(literal_number);
    while variables.len() < literal_number {
        let candidate = var_distr.sample(rng);
        if !variables.contains(&candidate) {
            variables.push(candidate);
        }
    }
    variables
        .into_iter()
        .map(|variable| {
            if neg_distr.sample(rng) == 0 {
                -variable
            } else {
                variable
            }
        })
        .collect()
}
