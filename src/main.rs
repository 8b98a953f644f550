use std::time::Instant;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use sokosolve::board::Puzzle;
use sokosolve::game::Direction;
use sokosolve::heuristic::HeuristicKind;
use sokosolve::levels::Levels;
use sokosolve::solver::{SolveResult, Solver, Strategy, Tracer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Bfs,
    Manhattan,
    Dijkstra,
}

impl Algorithm {
    fn label(self) -> &'static str {
        match self {
            Algorithm::Bfs => "BFS",
            Algorithm::Manhattan => "A* (Manhattan)",
            Algorithm::Dijkstra => "A* (Dijkstra)",
        }
    }
}

impl From<Algorithm> for Strategy {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Bfs => Strategy::BreadthFirst,
            Algorithm::Manhattan => Strategy::AStar(HeuristicKind::Manhattan),
            Algorithm::Dijkstra => Strategy::AStar(HeuristicKind::Dijkstra),
        }
    }
}

fn print_solution(solver: &Solver, moves: &[Direction]) {
    let board = solver.board();
    let (state, player) = solver.initial_state();
    println!("\nStarting position:\n{}", board.render(state));

    let mut state = state.clone();
    let mut player = player;
    let total = moves.len();
    for (count, &direction) in moves.iter().enumerate() {
        let Some(next) = board.apply_move(&state, player, direction) else {
            eprintln!("Error: move {} ({}) is not legal", count + 1, direction.name());
            return;
        };
        state = next.state;
        player = next.player;
        println!(
            "Move {} ({}/{}):\n{}",
            direction.name(),
            count + 1,
            total,
            board.render(&state)
        );
    }
}

/// Prints every traced node whose index falls inside the range.
struct VerboseTracer {
    trace_start: usize,
    trace_end: usize,
    count: usize,
}

impl VerboseTracer {
    fn new(trace_start: usize, trace_end: usize) -> Self {
        Self {
            trace_start,
            trace_end,
            count: 0,
        }
    }
}

impl Tracer for VerboseTracer {
    fn trace(&mut self, path: &[Direction], depth: usize) {
        self.count += 1;
        if self.trace_start <= self.count && self.count <= self.trace_end {
            let moves: String = path.iter().map(|d| d.symbol()).collect();
            println!("node={}, depth={}, path={}", self.count, depth, moves);
        }
    }
}

struct LevelStats {
    solved: bool,
    depth: i64,
    states_explored: usize,
    elapsed_ms: u128,
}

struct SolveOpts {
    level_num: usize,
    algorithm: Algorithm,
    max_nodes_explored: Option<usize>,
    print_solution: bool,
    csv: bool,
    trace_range: Option<(usize, usize)>,
}

fn solve_level(puzzle: &Puzzle, opts: &SolveOpts) -> Result<LevelStats, String> {
    let mut solver = Solver::new(puzzle).map_err(|e| e.to_string())?;
    if let Some(max) = opts.max_nodes_explored {
        solver = solver.with_max_nodes_explored(max);
    }
    let mut tracer = opts
        .trace_range
        .map(|(start, end)| VerboseTracer::new(start, end));

    let start = Instant::now();
    let result = solver.solve(
        opts.algorithm.into(),
        tracer.as_mut().map(|t| t as &mut dyn Tracer),
    );
    let elapsed_ms = start.elapsed().as_millis();
    let states_explored = solver.nodes_explored();
    let depth = result.depth();

    if opts.csv {
        println!(
            "{}, {}, {:.3}, {}",
            opts.level_num,
            opts.algorithm.label(),
            elapsed_ms as f64 / 1000.0,
            depth
        );
    } else {
        let solved_char = match &result {
            SolveResult::Solved(_) => 'Y',
            SolveResult::Cutoff(_) => 'N',
            SolveResult::Impossible => 'X',
        };
        println!(
            "level: {:<3}  algorithm: {:<15} solved: {}  depth: {:<5}  states: {:<12}  elapsed: {} ms",
            opts.level_num,
            opts.algorithm.label(),
            solved_char,
            depth,
            states_explored,
            elapsed_ms
        );
        match &result {
            SolveResult::Solved(solution) => println!("Solution: {}", solution),
            SolveResult::Cutoff(reached) => println!("No solution found. Depth {}", reached),
            SolveResult::Impossible => println!("No solution found. Deadlock found"),
        }
    }

    if opts.print_solution {
        if let SolveResult::Solved(solution) = &result {
            print_solution(&solver, solution.moves());
        }
    }

    Ok(LevelStats {
        solved: result.solution().is_some(),
        depth,
        states_explored,
        elapsed_ms,
    })
}

#[derive(Parser)]
#[command(name = "sokosolve")]
#[command(about = "A Sokoban solver", long_about = None)]
struct Args {
    /// Path to the levels file
    #[arg(value_name = "FILE")]
    levels_file: String,

    /// Level number to solve (1-indexed), or start of range
    #[arg(value_name = "LEVEL")]
    level_start: usize,

    /// Optional end of level range (inclusive, 1-indexed)
    #[arg(value_name = "LEVEL_END")]
    level_end: Option<usize>,

    /// Search algorithms to run on each level
    #[arg(
        short,
        long,
        value_enum,
        value_delimiter = ',',
        default_value = "bfs,manhattan,dijkstra"
    )]
    algorithm: Vec<Algorithm>,

    /// Print the solution step-by-step
    #[arg(short, long)]
    print_solution: bool,

    /// Maximum number of nodes to explore before giving up
    #[arg(short = 'n', long)]
    max_nodes_explored: Option<usize>,

    /// Print one "Level, Algorithm, Runtime, Depth" row per run instead of
    /// the summary lines
    #[arg(long)]
    csv: bool,

    /// Range of traced nodes to print (start, end)
    #[arg(long, num_args = 2)]
    trace_range: Option<Vec<usize>>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let levels = match Levels::from_file(&args.levels_file) {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("Error loading levels: {}", e);
            std::process::exit(1);
        }
    };

    let level_end = args.level_end.unwrap_or(args.level_start);

    if args.level_start == 0 {
        eprintln!("Error: level numbers must be at least 1");
        std::process::exit(1);
    }

    if level_end < args.level_start {
        eprintln!("Error: level end must be >= level start");
        std::process::exit(1);
    }

    if level_end > levels.len() {
        eprintln!(
            "Error: level {} not found (file contains {} levels)",
            level_end,
            levels.len()
        );
        std::process::exit(1);
    }

    let num_levels = level_end - args.level_start + 1;
    if args.print_solution && num_levels > 1 {
        eprintln!("Error: solution printing only supported when solving a single level");
        std::process::exit(1);
    }

    let trace_range = match args.trace_range.as_deref() {
        Some(&[start, end]) if start > end => {
            eprintln!("Error: trace range start must be <= end");
            std::process::exit(1);
        }
        Some(&[start, end]) => Some((start, end)),
        _ => None,
    };

    if args.csv {
        println!("Level, Algorithm, Runtime, Depth");
    }

    let mut total_runs = 0;
    let mut total_solved = 0;
    let mut total_depth = 0;
    let mut total_states = 0;
    let mut total_time_ms = 0;

    for level_num in args.level_start..=level_end {
        let Some(puzzle) = levels.get(level_num - 1) else {
            continue;
        };
        for &algorithm in &args.algorithm {
            let opts = SolveOpts {
                level_num,
                algorithm,
                max_nodes_explored: args.max_nodes_explored,
                print_solution: args.print_solution,
                csv: args.csv,
                trace_range,
            };
            let stats = match solve_level(puzzle, &opts) {
                Ok(stats) => stats,
                Err(e) => {
                    eprintln!("Error in level {}: {}", level_num, e);
                    std::process::exit(1);
                }
            };

            total_runs += 1;
            if stats.solved {
                total_solved += 1;
                total_depth += stats.depth;
            }
            total_states += stats.states_explored;
            total_time_ms += stats.elapsed_ms;
        }
    }

    if num_levels > 1 && !args.csv {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}        depth: {:<5}  states: {:<12}  elapsed: {} ms",
            total_solved, total_runs, total_depth, total_states, total_time_ms
        );
    }
}
