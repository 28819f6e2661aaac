use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use optspec_dsl::{CommandSummary, Loaded};
use tracing_subscriber::EnvFilter;

/// Output formats for `optspec show`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ShowFormat {
    Help,
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "optspec")]
#[command(version, about = "Check and render YAML command declarations")]
struct Cli {
    /// Log declaration and registration details to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load declaration files and report configuration errors.
    Check(CheckArgs),
    /// Print the declared command tree or its rendered help.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Declaration files to check.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Declaration file to show.
    file: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = ShowFormat::Help)]
    format: ShowFormat,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        init_logging();
    }

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Show(args) => run_show(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("optspec_core=debug,optspec_dsl=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let mut failed = 0usize;
    for path in &args.files {
        match optspec_dsl::load(path) {
            Ok(loaded) => println!("ok: {}", loaded.name()),
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(format!(
            "{failed} of {} declaration file(s) failed",
            args.files.len()
        ));
    }
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<(), String> {
    let loaded = load(&args.file)?;

    match args.format {
        ShowFormat::Help => {
            let mut stdout = io::stdout().lock();
            loaded
                .print_help(&mut stdout)
                .and_then(|()| stdout.flush())
                .map_err(|err| format!("Failed to write help: {err}"))?;
        }
        ShowFormat::Json => {
            let summary = loaded.summary();
            let text = serde_json::to_string_pretty(&summary)
                .map_err(|err| format!("Failed to serialize summary: {err}"))?;
            println!("{text}");
        }
        ShowFormat::Yaml => {
            let summary: CommandSummary = loaded.summary();
            let text = serde_yaml::to_string(&summary)
                .map_err(|err| format!("Failed to serialize summary: {err}"))?;
            print!("{text}");
        }
    }
    Ok(())
}

fn load(path: &Path) -> Result<Loaded, String> {
    optspec_dsl::load(path).map_err(|err| format!("{}: {err}", path.display()))
}
