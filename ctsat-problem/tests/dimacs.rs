use ctsat_problem::{parse_cnf, to_cnf_string, ProblemError, SatProblem};

#[test]
fn test_parse_cnf() {
    let problem = parse_cnf("c a comment\np cnf 3 2\n1 -2 0\n-3 2 0\n").unwrap();
    assert_eq!(problem.num_variables(), 3);
    assert_eq!(problem.clauses(), &[vec![1, -2], vec![-3, 2]]);
}

#[test]
fn test_cnf_round_trip() {
    let problem =
        SatProblem::from_clauses(4, vec![vec![1, 2, -3], vec![-4, 1], vec![2]]).unwrap();
    let reparsed = parse_cnf(&to_cnf_string(&problem)).unwrap();
    assert_eq!(reparsed.num_variables(), problem.num_variables());
    assert_eq!(reparsed.clauses(), problem.clauses());
}

#[test]
fn test_parse_cnf_rejects_bad_input() {
    assert!(matches!(
        parse_cnf(""),
        Err(ProblemError::MalformedCnf(_))
    ));
    assert!(matches!(
        parse_cnf("p dnf 2 1\n1 2 0\n"),
        Err(ProblemError::MalformedCnf(_))
    ));
    // unterminated clause
    assert!(matches!(
        parse_cnf("p cnf 2 1\n1 2\n"),
        Err(ProblemError::MalformedCnf(_))
    ));
    // clause count mismatch, both directions
    assert!(matches!(
        parse_cnf("p cnf 2 2\n1 2 0\n"),
        Err(ProblemError::MalformedCnf(_))
    ));
    assert!(matches!(
        parse_cnf("p cnf 2 1\n1 0\n2 0\n"),
        Err(ProblemError::MalformedCnf(_))
    ));
    // literal outside the declared range
    assert!(matches!(
        parse_cnf("p cnf 2 1\n3 0\n"),
        Err(ProblemError::LiteralOutOfRange { .. })
    ));
}
