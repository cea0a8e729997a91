mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use ssp_arcflow::{check_patterns, solve, ArcflowSolution, Formulation, SolveOptions};
use ssp_core::{read_instance_file, Instance, Tolerance};
use ssp_highs::HighsSolver;
use ssp_model::SolverConfig;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Skiving stock arc-flow solver and benchmark runner"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a single instance given on the command line
    Solve(SolveArgs),
    /// Solve every instance of one or more data files and log one record per instance
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct ModelArgs {
    /// Formulation to build
    #[arg(long, short = 'm', value_enum, default_value = "arcflow")]
    model: ModelKind,

    /// Solve the linear relaxation only
    #[arg(long, short = 'r')]
    relax: bool,

    /// Solver time limit in seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Solver thread count
    #[arg(long)]
    threads: Option<u32>,

    /// Print HiGHS output to the console
    #[arg(long)]
    solver_log: bool,
}

#[derive(Parser, Debug)]
struct SolveArgs {
    /// Minimum total length of a produced object
    #[arg(long, short = 't')]
    threshold: u64,

    /// Comma-separated item lengths
    #[arg(long, short = 'l', value_delimiter = ',', required = true)]
    lengths: Vec<u64>,

    /// Comma-separated item availabilities
    #[arg(long, short = 'b', value_delimiter = ',', required = true)]
    availabilities: Vec<u32>,

    /// Upper bound on the objective added as a cut
    #[arg(long)]
    bound: Option<f64>,

    #[command(flatten)]
    model: ModelArgs,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Instance data files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Tab-separated output log
    #[arg(long, short = 'o')]
    out: PathBuf,

    #[command(flatten)]
    model: ModelArgs,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum ModelKind {
    Arcflow,
    Larcflow,
    Reflect,
}

impl From<ModelKind> for Formulation {
    fn from(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Arcflow => Formulation::ArcFlow,
            ModelKind::Larcflow => Formulation::LossArcFlow,
            ModelKind::Reflect => Formulation::Reflect,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct SolveRecord<'a> {
    instance: &'a Instance,
    solution: &'a ArcflowSolution,
    patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct RunRecord {
    block: String,
    idx: usize,
    objective: f64,
    num_vars: usize,
    num_constrs: usize,
    num_nzs: usize,
    dt_model: f64,
    dt_solve: f64,
}

impl RunRecord {
    fn new(block: &str, idx: usize, solution: &ArcflowSolution) -> Self {
        Self {
            block: block.to_string(),
            idx,
            objective: solution.objective_value,
            num_vars: solution.stats.variables,
            num_constrs: solution.stats.constraints,
            num_nzs: solution.stats.nonzeros,
            dt_model: solution.model_time.as_secs_f64(),
            dt_solve: solution.solve_time.as_secs_f64(),
        }
    }

    fn tsv_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.block,
            self.idx,
            self.objective,
            self.num_vars,
            self.num_constrs,
            self.num_nzs,
            self.dt_model,
            self.dt_solve
        )
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    logging::init()?;
    let cli = Cli::parse();
    match cli.command {
        Command::Solve(args) => solve_command(args),
        Command::Run(args) => run_command(args),
    }
}

fn build_solver(args: &ModelArgs) -> HighsSolver {
    let mut config = SolverConfig::new().with_log_to_console(args.solver_log);
    if let Some(limit) = args.time_limit {
        config = config.with_time_limit(limit);
    }
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    HighsSolver::with_config(config)
}

fn solve_command(args: SolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let instance = Instance::strip_large_items(args.threshold, args.lengths, args.availabilities)?;
    let formulation = Formulation::from(args.model.model);
    let mut options = SolveOptions::new().with_relaxed(args.model.relax);
    if let Some(bound) = args.bound {
        options = options.with_bound(bound);
    }

    let mut solver = build_solver(&args.model);
    let solution = solve(&instance, formulation, &mut solver, &options)?;
    if !args.model.relax {
        if let Err(violation) = check_patterns(&instance, &solution.patterns, Tolerance::default())
        {
            warn!(
                component = "cli",
                operation = "check_patterns",
                status = "warn",
                "{violation}"
            );
        }
    }
    let patterns: Vec<String> = solution
        .patterns
        .iter()
        .map(|pattern| pattern.describe(&instance))
        .collect();

    match args.format {
        OutputFormat::Table => {
            println!(
                "instance: threshold {} lengths {:?} availabilities {:?}",
                instance.threshold(),
                instance.lengths(),
                instance.availabilities()
            );
            println!(
                "model {}: {} variables, {} constraints, {} non-zeros",
                formulation,
                solution.stats.variables,
                solution.stats.constraints,
                solution.stats.nonzeros
            );
            println!("objective {}", solution.objective_value);
            for line in &patterns {
                println!("{line}");
            }
        }
        OutputFormat::Json => {
            let record = SolveRecord {
                instance: &instance,
                solution: &solution,
                patterns,
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }
    Ok(())
}

fn run_command(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let formulation = Formulation::from(args.model.model);
    let options = SolveOptions::new().with_relaxed(args.model.relax);
    let table = args.format == OutputFormat::Table;

    if table {
        println!("using model {formulation}");
        println!("writing to {}", args.out.display());
        println!("reading {} files", args.files.len());
    }

    let mut writer = open_log(&args.out)?;
    let mut solver = build_solver(&args.model);

    for path in &args.files {
        if table {
            println!("file {}", path.display());
        }
        let block = block_name(path);
        for (idx, instance) in read_instance_file(path)?.iter().enumerate() {
            let solution = solve(instance, formulation, &mut solver, &options)?;
            let record = RunRecord::new(&block, idx, &solution);
            writeln!(writer, "{}", record.tsv_line())?;
            writer.flush()?;
            if !table {
                println!("{}", serde_json::to_string(&record)?);
            }
            info!(
                component = "cli",
                operation = "run",
                status = "success",
                block = %block,
                idx,
                objective = record.objective,
                "Instance solved"
            );
        }
    }
    Ok(())
}

fn open_log(path: &Path) -> Result<BufWriter<File>, Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn block_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
