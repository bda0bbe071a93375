use ctsat_problem::{literal_satisfied, ProblemError, SatProblem};

fn seed(value: u8) -> [u8; 32] {
    [value; 32]
}

#[test]
fn test_generate_random() {
    let problem = SatProblem::generate_random(&seed(0), 10, 4.267, 3).unwrap();
    assert_eq!(problem.num_variables(), 10);
    assert_eq!(problem.num_clauses(), 43);
    for clause in problem.clauses() {
        assert_eq!(clause.len(), 3);
        let mut vars: Vec<u32> = clause.iter().map(|l| l.unsigned_abs()).collect();
        vars.sort();
        vars.dedup();
        assert_eq!(vars.len(), 3, "clause variables must be distinct");
        for &v in &vars {
            assert!(v >= 1 && v <= 10);
        }
    }
    assert_eq!(problem.clause_matrix().dim(), (43, 10));
    assert!((problem.alpha() - 4.3).abs() < 1e-12);
}

#[test]
fn test_generate_random_is_deterministic() {
    let a = SatProblem::generate_random(&seed(7), 8, 3.0, 3).unwrap();
    let b = SatProblem::generate_random(&seed(7), 8, 3.0, 3).unwrap();
    assert_eq!(a.clauses(), b.clauses());
}

#[test]
fn test_generate_rejects_bad_clause_width() {
    assert!(matches!(
        SatProblem::generate_random(&seed(0), 2, 1.0, 3),
        Err(ProblemError::InvalidClauseWidth {
            literal_number: 3,
            num_variables: 2
        })
    ));
    assert!(matches!(
        SatProblem::generate_planted(&seed(0), 5, 1.0, 0, 1),
        Err(ProblemError::InvalidClauseWidth { .. })
    ));
}

#[test]
fn test_generate_planted() {
    let problem = SatProblem::generate_planted(&seed(1), 12, 3.0, 3, 2).unwrap();
    let planted = problem.planted_solutions().unwrap().to_vec();
    assert_eq!(planted.len(), 2);
    for assignment in &planted {
        assert!(problem.check_solution(assignment).unwrap());
    }
}

#[test]
fn test_check_solution() {
    let problem = SatProblem::from_clauses(2, vec![vec![1, -2]]).unwrap();
    assert!(problem.check_solution(&[true, false]).unwrap());
    assert!(problem.check_solution(&[true, true]).unwrap());
    assert!(!problem.check_solution(&[false, true]).unwrap());
    assert!(matches!(
        problem.check_solution(&[true]),
        Err(ProblemError::SolutionLength {
            expected: 2,
            actual: 1
        })
    ));
}

#[test]
fn test_literal_satisfied() {
    assert!(literal_satisfied(1, &[true]));
    assert!(!literal_satisfied(-1, &[true]));
    assert!(literal_satisfied(-1, &[false]));
}

#[test]
fn test_num_satisfied_clauses() {
    let problem = SatProblem::from_clauses(3, vec![vec![1, 2], vec![-1, 3], vec![-2]]).unwrap();
    // s = (+, -, -): clause 1 by literal 1, clause 3 by literal -2
    assert_eq!(problem.num_satisfied_clauses(&[0.5, -0.5, -0.5]), 2);
    // s = (-, +, +): clause 1 by literal 2, clause 2 by both literals
    assert_eq!(problem.num_satisfied_clauses(&[-0.5, 0.5, 0.5]), 2);
    assert_eq!(problem.num_satisfied_clauses(&[-0.5, -0.5, 0.5]), 2);
}

#[test]
fn test_from_clauses_rejects_bad_literals() {
    assert!(matches!(
        SatProblem::from_clauses(2, vec![vec![1, 0]]),
        Err(ProblemError::ZeroLiteral { clause: 0 })
    ));
    assert!(matches!(
        SatProblem::from_clauses(2, vec![vec![3]]),
        Err(ProblemError::LiteralOutOfRange { .. })
    ));
}

#[test]
fn test_clause_matrix_polarity() {
    let problem = SatProblem::from_clauses(3, vec![vec![1, -2], vec![-3, 2]]).unwrap();
    let matrix = problem.clause_matrix();
    assert_eq!(matrix[[0, 0]], 1);
    assert_eq!(matrix[[0, 1]], -1);
    assert_eq!(matrix[[0, 2]], 0);
    assert_eq!(matrix[[1, 1]], 1);
    assert_eq!(matrix[[1, 2]], -1);
}

#[test]
fn test_clause_matrix_positive_precedence() {
    // A variable appearing with both polarities in one clause records +1.
    let a = SatProblem::from_clauses(1, vec![vec![1, -1]]).unwrap();
    let b = SatProblem::from_clauses(1, vec![vec![-1, 1]]).unwrap();
    assert_eq!(a.clause_matrix()[[0, 0]], 1);
    assert_eq!(b.clause_matrix()[[0, 0]], 1);
}

#[test]
fn test_smallest_variable() {
    let problem = SatProblem::from_clauses(3, vec![vec![1, 2], vec![2, 3]]).unwrap();
    // variables 1 and 3 both appear once; the tie goes to the lower index
    assert_eq!(problem.smallest_variable(), 1);
}

#[test]
fn test_remove_variable() {
    let mut problem =
        SatProblem::from_clauses(3, vec![vec![1, 2], vec![2, 3], vec![-3, 1]]).unwrap();
    problem.remove_variable(2).unwrap();
    assert_eq!(problem.num_variables(), 2);
    assert_eq!(problem.clauses(), &[vec![-2, 1]]);
    assert_eq!(problem.clause_matrix().dim(), (1, 2));

    // satisfaction of the surviving clause matches the original clause on the
    // same assignment with the removed coordinate deleted
    assert!(problem.check_solution(&[true, true]).unwrap());
    assert!(!problem.check_solution(&[false, true]).unwrap());
}

#[test]
fn test_remove_variable_out_of_range() {
    let mut problem = SatProblem::from_clauses(2, vec![vec![1, 2]]).unwrap();
    assert!(matches!(
        problem.remove_variable(0),
        Err(ProblemError::VariableOutOfRange { .. })
    ));
    assert!(matches!(
        problem.remove_variable(3),
        Err(ProblemError::VariableOutOfRange { .. })
    ));
}

#[test]
fn test_downconvert_4_to_3() {
    let mut problem = SatProblem::from_clauses(4, vec![vec![1, 2, 3, 4]]).unwrap();
    problem.downconvert_4_to_3().unwrap();
    assert_eq!(problem.num_variables(), 5);
    assert_eq!(problem.num_clauses(), 2);
    assert_eq!(problem.clauses(), &[vec![1, 2, 5], vec![3, 4, -5]]);
    // an assignment satisfying the original extends with the right aux value
    assert!(problem
        .check_solution(&[true, false, false, false, false])
        .unwrap());
    assert!(problem
        .check_solution(&[false, false, true, false, true])
        .unwrap());
}

#[test]
fn test_downconvert_rejects_non_4_sat() {
    let mut problem = SatProblem::from_clauses(3, vec![vec![1, 2, 3]]).unwrap();
    assert!(matches!(
        problem.downconvert_4_to_3(),
        Err(ProblemError::NotFourSat {
            clause: 0,
            literals: 3
        })
    ));
}

#[test]
fn test_harden_clause() {
    let mut problem = SatProblem::from_clauses(3, vec![vec![1, 2, 3]]).unwrap();
    let solutions = vec![vec![true, true, false]];
    assert!(problem.harden_clause(0, &solutions).unwrap());
    assert_eq!(problem.clauses(), &[vec![-1, 2, 3]]);
    // now only literal 2 is always true, so nothing more to flip
    assert!(!problem.harden_clause(0, &solutions).unwrap());
}

#[test]
fn test_harden_clause_errors() {
    let mut problem = SatProblem::from_clauses(2, vec![vec![1, 2]]).unwrap();
    assert!(matches!(
        problem.harden_clause(1, &[]),
        Err(ProblemError::ClauseOutOfRange { .. })
    ));
    assert!(matches!(
        problem.harden_clause(0, &[vec![true]]),
        Err(ProblemError::SolutionLength { .. })
    ));
}

#[test]
fn test_all_solutions() {
    let mut problem = SatProblem::from_clauses(2, vec![vec![1, 2]]).unwrap();
    assert_eq!(problem.all_solutions().unwrap(), &["01", "10", "11"]);
    assert_eq!(problem.solution_index("10").unwrap(), 1);
    assert!(matches!(
        problem.solution_index("00"),
        Err(ProblemError::UnknownSolution(_))
    ));
}

#[test]
fn test_all_solutions_cache_invalidation() {
    let mut problem = SatProblem::from_clauses(2, vec![vec![1], vec![2]]).unwrap();
    assert_eq!(problem.all_solutions().unwrap(), &["11"]);
    problem.remove_variable(2).unwrap();
    assert_eq!(problem.all_solutions().unwrap(), &["1"]);
}

#[test]
fn test_all_solutions_too_large() {
    let mut problem = SatProblem::from_clauses(31, vec![vec![1]]).unwrap();
    assert!(matches!(
        problem.all_solutions(),
        Err(ProblemError::EnumerationTooLarge { num_variables: 31 })
    ));
}
