//! doculisp CLI tool
//!
//! Compiles a Doculisp source into generated Markdown.
//!
//! ## Usage
//!
//! - `doculisp -s ./docs/_main.md -d ./README.md`: compile one document tree
//! - `doculisp -s ./docs/docs.dlproj`: compile every document a project lists
//! - `doculisp -s ./docs/_main.md -t`: validate without writing anything
//!
//! Settings are read from `doculisp.toml` in the working directory, or from the file given with
//! `--config`. On failure the error is printed to stderr as JSON and the process exits with 1.
//! Project documents that compiled alongside a failing one are still reported.

use clap::Parser;
use doculisp::{
    compiler::{CompiledDocument, Compiler},
    config::DoculispConfig,
    files::{FileHandler, FsFileHandler},
    paths::DocPath,
    DoculispError,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "doculisp")]
#[command(author, version, about = "A compiler for Markdown annotated with Doculisp", long_about = None)]
struct Cli {
    /// Source file: `.md`, `.dlisp` or `.dlproj`
    #[arg(short, long)]
    source: PathBuf,

    /// Output file (not allowed for `.dlproj` sources)
    #[arg(short = 'd', long = "destination", visible_alias = "output")]
    destination: Option<PathBuf>,

    /// Validate the source without writing output
    #[arg(short, long)]
    test: bool,

    /// Config file (default: ./doculisp.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> Result<Vec<CompiledDocument>, DoculispError> {
    let files = FsFileHandler;
    let cwd = files.working_directory()?;
    let config = match &cli.config {
        Some(path) => DoculispConfig::load(cwd.join(path))?,
        None => DoculispConfig::discover(&cwd)?,
    };
    let source = DocPath::new(&cli.source, &cwd);
    let destination = cli.destination.as_ref().map(|path| DocPath::new(path, &cwd));
    tracing::debug!("Compiling {} with {:?}", source, config);
    Compiler::new(files, config).run(&source, destination.as_ref(), cli.test)
}

fn report(source: &Path, destination: Option<&Path>, test: bool) {
    match (destination, test) {
        (Some(destination), false) => println!("{} compiled.", destination.display()),
        _ => println!("{} valid.", source.display()),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(docs) => {
            for doc in docs {
                for warning in doc.warnings.iter() {
                    eprintln!("{warning}");
                }
                let destination = doc.destination.as_ref().map(|path| path.full_name());
                report(doc.source.full_name(), destination, cli.test);
            }
        }
        Err(e) => {
            if let DoculispError::Project { compiled, .. } = &e {
                for doc in compiled {
                    report(&doc.source, Some(&doc.destination), cli.test);
                }
            }
            let report = serde_json::to_string_pretty(&e).unwrap_or_else(|_| e.to_string());
            eprintln!("{report}");
            std::process::exit(1);
        }
    }
}
