use ctsat_dynamics::{
    clause_potential, partial_potential, DynamicsError, Formulation, FormulationParams,
    OrtantMemory, ReferenceEvaluator, RhsEvaluator, RhsKind,
};
use ctsat_problem::SatProblem;
use ndarray::Array1;

fn single_clause_problem() -> SatProblem {
    SatProblem::from_clauses(3, vec![vec![1, 2, 3]]).unwrap()
}

fn two_clause_problem() -> SatProblem {
    SatProblem::from_clauses(3, vec![vec![1, 2], vec![-1, 3]]).unwrap()
}

fn evaluate(problem: &SatProblem, kind: RhsKind, state: &[f64]) -> Array1<f64> {
    ReferenceEvaluator
        .evaluate_rhs(
            kind,
            problem,
            state,
            &FormulationParams::default(),
            &OrtantMemory::new(4),
        )
        .unwrap()
}

#[test]
fn test_clause_potential() {
    let problem = single_clause_problem();
    // at the origin every factor is 1, leaving the 2^-L scale
    assert!((clause_potential(&problem, 0, &[0.0, 0.0, 0.0]) - 0.125).abs() < 1e-12);
    // satisfied corner: one factor vanishes
    assert_eq!(clause_potential(&problem, 0, &[1.0, -1.0, -1.0]), 0.0);
    // violated corner: every factor is 2
    assert!((clause_potential(&problem, 0, &[-1.0, -1.0, -1.0]) - 1.0).abs() < 1e-12);
}

#[test]
fn test_partial_potential_excludes_one_variable() {
    let problem = single_clause_problem();
    let s = [1.0, 0.5, -0.25];
    // k(m, 0, s) ignores s[0] entirely
    let a = partial_potential(&problem, 0, 0, &s);
    let b = partial_potential(&problem, 0, 0, &[-1.0, 0.5, -0.25]);
    assert!((a - b).abs() < 1e-12);
    assert!((a - 0.125 * 0.5 * 1.25).abs() < 1e-12);
}

#[test]
fn test_satisfied_corner_is_fixed_point() {
    let problem = single_clause_problem();
    for kind in [RhsKind::One, RhsKind::Two] {
        let out = evaluate(&problem, kind, &[1.0, 1.0, 1.0, 2.0]);
        assert!(
            out.iter().all(|&v| v.abs() < 1e-12),
            "formulation {} must vanish at a satisfied corner",
            kind
        );
    }
}

#[test]
fn test_spin_gradient_pushes_toward_satisfaction() {
    // single positive unit clause: the spin derivative must be positive
    let problem = SatProblem::from_clauses(1, vec![vec![1]]).unwrap();
    let out = evaluate(&problem, RhsKind::One, &[-0.5, 1.0]);
    assert!(out[0] > 0.0);
    // aux' = a * K > 0 while the clause is unsatisfied
    assert!(out[1] > 0.0);
}

#[test]
fn test_formulation_five_negates_four() {
    let problem = two_clause_problem();
    let state = [0.3, -0.2, 0.7, 1.5, 0.8];
    let four = evaluate(&problem, RhsKind::Four, &state);
    let five = evaluate(&problem, RhsKind::Five, &state);
    for (a, b) in four.iter().zip(five.iter()) {
        assert!((a + b).abs() < 1e-12);
    }
}

#[test]
fn test_formulation_nine_freezes_aux() {
    let problem = two_clause_problem();
    let state = [0.3, -0.2, 0.7, 1.5, 0.8];
    let one = evaluate(&problem, RhsKind::One, &state);
    let nine = evaluate(&problem, RhsKind::Nine, &state);
    // same spin law on the same weights, but the aux block stays put
    for i in 0..3 {
        assert!((one[i] - nine[i]).abs() < 1e-12);
    }
    assert_eq!(nine[3], 0.0);
    assert_eq!(nine[4], 0.0);
}

#[test]
fn test_formulation_seven_log_urgency() {
    let problem = SatProblem::from_clauses(1, vec![vec![1]]).unwrap();
    let z = 0.4;
    let s = -0.5;
    let out = evaluate(&problem, RhsKind::Seven, &[s, z]);
    let big_k = clause_potential(&problem, 0, &[s]);
    let kmi = partial_potential(&problem, 0, 0, &[s]);
    let expected_spin = 2.0 * z.exp() * (1.0 - s) * kmi * kmi;
    assert!((out[0] - expected_spin).abs() < 1e-12);
    assert!((out[1] - (big_k - 0.1 * z)).abs() < 1e-12);
}

#[test]
fn test_formulation_eight_decay() {
    let problem = SatProblem::from_clauses(1, vec![vec![1]]).unwrap();
    let a: f64 = 2.0;
    let s = -0.5;
    let out = evaluate(&problem, RhsKind::Eight, &[s, a]);
    let big_k = clause_potential(&problem, 0, &[s]);
    let expected = a * (big_k * big_k - 0.1 * a.ln());
    assert!((out[1] - expected).abs() < 1e-12);
}

#[test]
fn test_formulation_ten_matches_eleven_on_symmetric_memory() {
    let problem = two_clause_problem();
    let s = [0.3, -0.2, 0.7];
    let (b00, b01, b11) = (1.5, 0.4, 0.9);
    let full = [s[0], s[1], s[2], b00, b01, b01, b11];
    let triangle = [s[0], s[1], s[2], b00, b01, b11];

    let ten = evaluate(&problem, RhsKind::Ten, &full);
    let eleven = evaluate(&problem, RhsKind::Eleven, &triangle);

    for i in 0..3 {
        assert!((ten[i] - eleven[i]).abs() < 1e-12);
    }
    // memory derivatives agree entry for entry across the two layouts
    assert!((ten[3] - eleven[3]).abs() < 1e-12); // (0,0)
    assert!((ten[4] - eleven[4]).abs() < 1e-12); // (0,1)
    assert!((ten[6] - eleven[5]).abs() < 1e-12); // (1,1)
    // full layout keeps the mirrored entry consistent
    assert!((ten[4] - ten[5]).abs() < 1e-12);
}

#[test]
fn test_aux_len_per_kind() {
    assert_eq!(RhsKind::One.aux_len(4), 4);
    assert_eq!(RhsKind::Ten.aux_len(4), 16);
    assert_eq!(RhsKind::Eleven.aux_len(4), 10);
    assert_eq!(RhsKind::Two.state_len(3, 4), 7);
}

#[test]
fn test_state_length_mismatch() {
    let problem = single_clause_problem();
    let result = ReferenceEvaluator.evaluate_rhs(
        RhsKind::One,
        &problem,
        &[0.0; 3],
        &FormulationParams::default(),
        &OrtantMemory::new(4),
    );
    assert!(matches!(
        result,
        Err(DynamicsError::StateLength {
            expected: 4,
            actual: 3,
            ..
        })
    ));
}

#[test]
fn test_jacobian_matches_finite_differences() {
    let problem = two_clause_problem();
    let state = [0.3, -0.2, 0.7, 1.5, 0.8];
    let params = FormulationParams::default();
    let memory = OrtantMemory::new(4);
    let jacobian = ReferenceEvaluator
        .evaluate_jacobian(RhsKind::Two, &problem, &state)
        .unwrap();

    let h = 1e-6;
    for col in 0..state.len() {
        let mut plus = state;
        let mut minus = state;
        plus[col] += h;
        minus[col] -= h;
        let f_plus = ReferenceEvaluator
            .evaluate_rhs(RhsKind::Two, &problem, &plus, &params, &memory)
            .unwrap();
        let f_minus = ReferenceEvaluator
            .evaluate_rhs(RhsKind::Two, &problem, &minus, &params, &memory)
            .unwrap();
        for row in 0..state.len() {
            let numeric = (f_plus[row] - f_minus[row]) / (2.0 * h);
            assert!(
                (jacobian[[row, col]] - numeric).abs() < 1e-5,
                "J[{}, {}] = {} but finite difference gives {}",
                row,
                col,
                jacobian[[row, col]],
                numeric
            );
        }
    }
}

#[test]
fn test_jacobian_unimplemented() {
    let problem = single_clause_problem();
    for kind in RhsKind::ALL {
        if kind == RhsKind::Two {
            continue;
        }
        let result = ReferenceEvaluator.evaluate_jacobian(
            kind,
            &problem,
            &[0.0; 4],
        );
        assert!(matches!(
            result,
            Err(DynamicsError::UnimplementedJacobian(k)) if k == kind
        ));
    }
}

#[test]
fn test_ortant_repulsion() {
    let problem = single_clause_problem();
    let state = [0.3, -0.2, 0.7, 1.0];
    let mut formulation = Formulation::new(&problem, RhsKind::Six);

    // with an empty memory, formulation 6 reduces to formulation 3
    let three = evaluate(&problem, RhsKind::Three, &state);
    let six = formulation.rhs(0.0, &state).unwrap();
    for (a, b) in three.iter().zip(six.iter()) {
        assert!((a - b).abs() < 1e-12);
    }

    // remembering the nearest ortant adds a term pushing away from it
    formulation.record_failed_ortant(&state);
    let repelled = formulation.rhs(0.0, &state).unwrap();
    // recorded ortant is (+1, -1, +1); s - p points toward the origin
    assert!(repelled[0] < six[0]);
    assert!(repelled[1] > six[1]);
    assert!(repelled[2] < six[2]);
}

#[test]
fn test_native_load_failure_is_reported() {
    let result = ctsat_dynamics::NativeEvaluator::load("/nonexistent/evaluator.so");
    assert!(matches!(result, Err(DynamicsError::NativeLoad(_))));
}

#[test]
fn test_kind_parsing() {
    assert_eq!("3".parse::<RhsKind>().unwrap(), RhsKind::Three);
    assert_eq!(RhsKind::Eleven.to_string(), "11");
    assert_eq!(RhsKind::from_index(1).unwrap(), RhsKind::One);
    assert!(RhsKind::from_index(12).is_err());
    assert!("ten".parse::<RhsKind>().is_err());
}
