use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use grader::{ErrorResponse, GradeError, Grader, GraderConfig, Problem, ProblemStore};

/// Grade a contest submission and print the report as JSON
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Submission language (cpp, java, python or an alias)
    #[arg(short, long, required_unless_present = "list")]
    language: Option<String>,

    /// Candidate source file; read from stdin when omitted
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Problem definition as a JSON file
    #[arg(long, conflicts_with_all = ["problems_dir", "problem_id"])]
    problem: Option<PathBuf>,

    /// Directory of `<id>.json` problem files
    #[arg(long)]
    problems_dir: Option<PathBuf>,

    #[arg(long, requires = "problems_dir")]
    problem_id: Option<i64>,

    /// List the problems in --problems-dir and exit
    #[arg(long, requires = "problems_dir")]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("grader=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => match e.downcast_ref::<GradeError>() {
            Some(grade_error) => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ErrorResponse::from(grade_error))?
                );
                Ok(ExitCode::from(2))
            }
            None => Err(e),
        },
    }
}

async fn run(args: Args) -> Result<()> {
    if args.list {
        if let Some(dir) = &args.problems_dir {
            let problems = ProblemStore::new(dir).list()?;
            println!("{}", serde_json::to_string_pretty(&problems)?);
        }
        return Ok(());
    }

    let config = GraderConfig::from_env()?;
    info!("Grader config: {:?}", config);
    let grader = Grader::new(config)?;

    let problem = load_problem(&args)?;
    let code = read_source(args.source.as_ref())?;
    let language = args.language.as_deref().unwrap_or_default();

    let report = grader.grade(language, &code, &problem).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_problem(args: &Args) -> Result<Problem> {
    match (&args.problem, &args.problems_dir, args.problem_id) {
        (Some(path), _, _) => Problem::from_json_file(path),
        (None, Some(dir), Some(id)) => Ok(ProblemStore::new(dir).load(id)?),
        _ => anyhow::bail!("Either --problem or --problems-dir with --problem-id is required"),
    }
}

fn read_source(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read source {}", path.display())),
        None => {
            let mut code = String::new();
            std::io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read source from stdin")?;
            Ok(code)
        }
    }
}
