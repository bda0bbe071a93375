use anyhow::{anyhow, Result};
use clap::{arg, Command};
use ctsat_analysis::{cluster_solutions, decode, satisfied_clauses_over_time, trajectory_length};
use ctsat_dynamics::{NativeEvaluator, RhsKind};
use ctsat_problem::{read_cnf_file, write_cnf_file, SatProblem};
use ctsat_solver::{
    CtdSolver, EventKind, ExitPolicy, ForwardEuler, InitialConditions, Integrator, RungeKutta4,
    Tolerances,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde::Serialize;
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("ctsat")
        .about("Continuous-time dynamical system SAT solver")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("generate")
                .about("Generates a random k-SAT instance and writes it as DIMACS CNF")
                .arg(
                    arg!(<OUTPUT> "Path for the output .cnf file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--variables <VARIABLES> "Number of variables")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("20"),
                )
                .arg(
                    arg!(--literals <LITERALS> "Literals per clause")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("3"),
                )
                .arg(
                    arg!(--alpha <ALPHA> "Clause-to-variable ratio")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("4.267"),
                )
                .arg(
                    arg!(--planted <PLANTED> "Number of planted solutions; 0 for unconstrained")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("0"),
                )
                .arg(
                    arg!(--seed <SEED> "RNG seed")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("0"),
                ),
        )
        .subcommand(
            Command::new("solve")
                .about("Integrates the dynamical system on a DIMACS CNF instance")
                .arg(
                    arg!(<CNF> "Path to the .cnf file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--formulation <FORMULATION> "Energy flow formulation, 1 through 11")
                        .value_parser(clap::value_parser!(RhsKind))
                        .default_value("1"),
                )
                .arg(
                    arg!(--policy <POLICY> "Exit policy: ortant, convergence-radius, negative-aux, hypersphere or none")
                        .value_parser(clap::value_parser!(ExitPolicy))
                        .default_value("ortant"),
                )
                .arg(
                    arg!(--"t-max" <T_MAX> "Integration horizon")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("25.0"),
                )
                .arg(
                    arg!(--seed <SEED> "RNG seed for the initial state")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("0"),
                )
                .arg(arg!(--rk4 "Use fourth-order Runge-Kutta instead of forward Euler"))
                .arg(arg!(--"random-aux" "Draw initial auxiliary variables at random"))
                .arg(arg!(--json "Print a JSON report instead of plain text"))
                .arg(
                    arg!(--native [NATIVE] "Path to a compiled evaluator shared library")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("analyze")
                .about("Enumerates and clusters the satisfying assignments of a small instance")
                .arg(
                    arg!(<CNF> "Path to the .cnf file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(arg!(--json "Print a JSON report instead of plain text")),
        )
}

fn main() {
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("generate", sub_m)) => generate(
            sub_m.get_one::<PathBuf>("OUTPUT").unwrap().clone(),
            *sub_m.get_one::<usize>("variables").unwrap(),
            *sub_m.get_one::<usize>("literals").unwrap(),
            *sub_m.get_one::<f64>("alpha").unwrap(),
            *sub_m.get_one::<usize>("planted").unwrap(),
            *sub_m.get_one::<u64>("seed").unwrap(),
        ),
        Some(("solve", sub_m)) => solve(
            sub_m.get_one::<PathBuf>("CNF").unwrap().clone(),
            *sub_m.get_one::<RhsKind>("formulation").unwrap(),
            *sub_m.get_one::<ExitPolicy>("policy").unwrap(),
            *sub_m.get_one::<f64>("t-max").unwrap(),
            *sub_m.get_one::<u64>("seed").unwrap(),
            sub_m.get_flag("rk4"),
            sub_m.get_flag("random-aux"),
            sub_m.get_flag("json"),
            sub_m.get_one::<PathBuf>("native").cloned(),
        ),
        Some(("analyze", sub_m)) => analyze(
            sub_m.get_one::<PathBuf>("CNF").unwrap().clone(),
            sub_m.get_flag("json"),
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn seed_bytes(seed: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&seed.to_le_bytes());
    bytes
}

fn generate(
    output: PathBuf,
    variables: usize,
    literals: usize,
    alpha: f64,
    planted: usize,
    seed: u64,
) -> Result<()> {
    let seed = seed_bytes(seed);
    let problem = if planted > 0 {
        SatProblem::generate_planted(&seed, variables, alpha, literals, planted)?
    } else {
        SatProblem::generate_random(&seed, variables, alpha, literals)?
    };
    write_cnf_file(&problem, &output)?;
    println!(
        "Wrote {} variables, {} clauses to {}",
        problem.num_variables(),
        problem.num_clauses(),
        output.display()
    );
    Ok(())
}

#[derive(Serialize)]
struct SolveReport {
    assignment: String,
    satisfied_clauses: usize,
    num_clauses: usize,
    samples: usize,
    arc_length: f64,
    terminated_by: Option<EventKind>,
    valid: bool,
}

fn solve(
    cnf: PathBuf,
    formulation: RhsKind,
    policy: ExitPolicy,
    t_max: f64,
    seed: u64,
    rk4: bool,
    random_aux: bool,
    json: bool,
    native: Option<PathBuf>,
) -> Result<()> {
    let problem = read_cnf_file(&cnf)?;
    let mut rng = SmallRng::seed_from_u64(seed);
    let conditions = InitialConditions {
        random_aux,
        ..Default::default()
    };
    let mut solver = match native {
        Some(path) => CtdSolver::with_evaluator(
            &problem,
            formulation,
            Box::new(NativeEvaluator::load(&path)?),
            &mut rng,
            conditions,
        )?,
        None => CtdSolver::with_conditions(&problem, formulation, &mut rng, conditions)?,
    };

    let euler = ForwardEuler::default();
    let runge_kutta = RungeKutta4::default();
    let integrator: &dyn Integrator = if rk4 { &runge_kutta } else { &euler };
    let trajectory = solver.solve(t_max, policy, integrator, &Tolerances::default())?;

    let n = problem.num_variables();
    let assignment = decode(trajectory, n).ok_or_else(|| anyhow!("Empty trajectory"))?;
    let (_, counts) = satisfied_clauses_over_time(&problem, trajectory);
    let satisfied = counts.last().copied().unwrap_or(0);
    let arc = trajectory_length(trajectory, n)
        .last()
        .copied()
        .unwrap_or(0.0);

    let bits: Vec<bool> = assignment.chars().map(|c| c == '1').collect();
    let valid = problem.check_solution(&bits)?;

    if json {
        let report = SolveReport {
            assignment,
            satisfied_clauses: satisfied,
            num_clauses: problem.num_clauses(),
            samples: trajectory.len(),
            arc_length: arc,
            terminated_by: trajectory.terminated_by,
            valid,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Assignment: {}", assignment);
        println!(
            "Satisfied clauses: {}/{}",
            satisfied,
            problem.num_clauses()
        );
        println!("Trajectory samples: {}", trajectory.len());
        println!("Arc length: {:.6}", arc);
        match trajectory.terminated_by {
            Some(kind) => println!("Terminated by event: {:?}", kind),
            None => println!("Reached t_max without a terminal event"),
        }
        if valid {
            println!("Solution is valid");
        }
    }
    if !valid {
        eprintln!("Assignment does not satisfy the formula");
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Serialize)]
struct AnalyzeReport {
    num_variables: usize,
    num_clauses: usize,
    num_solutions: usize,
    cluster_sizes: Vec<usize>,
}

fn analyze(cnf: PathBuf, json: bool) -> Result<()> {
    let mut problem = read_cnf_file(&cnf)?;
    let solutions = problem.all_solutions()?.to_vec();
    let clusters = cluster_solutions(&solutions)?;
    let mut cluster_sizes: Vec<usize> = clusters.values().map(|members| members.len()).collect();
    cluster_sizes.sort_unstable_by(|a, b| b.cmp(a));

    if json {
        let report = AnalyzeReport {
            num_variables: problem.num_variables(),
            num_clauses: problem.num_clauses(),
            num_solutions: solutions.len(),
            cluster_sizes,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} variables, {} clauses, {} satisfying assignments",
            problem.num_variables(),
            problem.num_clauses(),
            solutions.len()
        );
        println!("{} Hamming-1 clusters, sizes {:?}", cluster_sizes.len(), cluster_sizes);
    }
    Ok(())
}
