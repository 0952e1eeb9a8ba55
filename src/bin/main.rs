use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use wpc::ast::{dump_tree, print_source};
use wpc::parser::{tokenize, TokenTrie};
use wpc::suite::run_suite;
use wpc::{Config, Diagnostics, Error, Severity, WpEngine};

/// Bytes of obligation text printed by `verify --show-obligation`
const SHOW_OBLIGATION_LIMIT: usize = 4096;

#[derive(Parser)]
#[command(name = "wpc")]
#[command(about = "Verifying compiler: proves every check before running the program")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Program to verify and run (same as `wpc run FILE`)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Deadline per validity query, in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a program, then run it
    Run {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Verify a program without running it
    Verify {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the correctness obligation handed to the solver
        #[arg(long)]
        show_obligation: bool,
    },

    /// Parse a program and print it back
    Parse {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Show the syntax tree instead of source text
        #[arg(short, long)]
        tree: bool,
    },

    /// Lexically analyze a program
    Lex {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Show token locations
        #[arg(short, long)]
        locations: bool,
    },

    /// Check DIR/pass/*.wp verify and DIR/fail/*.wp do not
    Suite {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match dispatch(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn dispatch(cli: &Cli) -> Result<bool> {
    let config = build_config(&cli.global)?;
    match (&cli.command, &cli.file) {
        (Some(_), Some(_)) => bail!("give either a FILE or a subcommand, not both"),
        (None, None) => bail!("no program given; try `wpc --help`"),
        (None, Some(file)) => run_file(file, &config, cli.global.verbose),
        (Some(command), None) => match command {
            Commands::Run { input } => run_file(input, &config, cli.global.verbose),
            Commands::Verify { input, show_obligation } => {
                verify_file(input, &config, *show_obligation, cli.global.verbose)
            }
            Commands::Parse { input, tree } => parse_file(input, &config, *tree),
            Commands::Lex { input, locations } => lex_file(input, *locations),
            Commands::Suite { dir } => run_program_suite(dir, &config),
        },
    }
}

fn build_config(args: &GlobalArgs) -> Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(ms) = args.timeout_ms {
        config.solver_timeout = Duration::from_millis(ms);
    }
    Ok(config)
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn print_diagnostics(diagnostics: &Diagnostics, verbose: u8) {
    let floor = if verbose > 0 { Severity::Info } else { Severity::Warning };
    for diagnostic in diagnostics.iter().filter(|d| d.severity >= floor) {
        eprintln!("{}", diagnostic);
    }
}

/// Pipeline stops whose cause is already in the diagnostics
fn already_reported(err: &Error) -> bool {
    matches!(
        err,
        Error::Parse { .. } | Error::DefiniteAssignment { .. } | Error::Verification { .. } | Error::Runtime(_)
    )
}

fn run_file(input: &Path, config: &Config, verbose: u8) -> Result<bool> {
    let mut diagnostics = Diagnostics::new();
    let result = wpc::run_file(input, config, &mut diagnostics);
    print_diagnostics(&diagnostics, verbose);
    match result {
        Ok(_) => Ok(true),
        Err(err) if already_reported(&err) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

fn verify_file(input: &Path, config: &Config, show_obligation: bool, verbose: u8) -> Result<bool> {
    let source = read_source(input)?;
    let mut diagnostics = Diagnostics::new();
    let result = wpc::check_source(&source, config, &mut diagnostics);
    print_diagnostics(&diagnostics, verbose);
    let (program, verdict) = match result {
        Ok(checked) => checked,
        Err(err) if already_reported(&err) => return Ok(false),
        Err(err) => return Err(err.into()),
    };
    if show_obligation {
        let obligation = WpEngine::obligation(&program)?;
        println!("obligation ({} nodes): {}", obligation.size(), obligation.abbreviated(SHOW_OBLIGATION_LIMIT));
    }
    if verdict.is_verified() {
        println!("{}: verified", input.display());
    } else {
        println!("{}: not verified", input.display());
    }
    Ok(verdict.is_verified())
}

fn parse_file(input: &Path, config: &Config, tree: bool) -> Result<bool> {
    let source = read_source(input)?;
    let mut diagnostics = Diagnostics::new();
    let result = wpc::parse_source(&source, config, &mut diagnostics);
    print_diagnostics(&diagnostics, 0);
    let program = match result {
        Ok(program) => program,
        Err(err) if already_reported(&err) => return Ok(false),
        Err(err) => return Err(err.into()),
    };
    if tree {
        print!("{}", dump_tree(&program));
    } else {
        print!("{}", print_source(&program));
    }
    Ok(true)
}

fn lex_file(input: &Path, locations: bool) -> Result<bool> {
    let source = read_source(input)?;
    let trie = TokenTrie::standard()?;
    let mut diagnostics = Diagnostics::new();
    for token in tokenize(&source, &trie, &mut diagnostics) {
        if locations {
            println!("{:?} `{}` at {}:{}", token.kind(), token.lexeme(), token.location().line, token.location().column);
        } else {
            println!("{:?}: '{}'", token.kind(), token.lexeme());
        }
    }
    print_diagnostics(&diagnostics, 0);
    Ok(!diagnostics.has_severe())
}

fn run_program_suite(dir: &Path, config: &Config) -> Result<bool> {
    let report = run_suite(dir, config)?;
    for (name, reason) in &report.failures {
        eprintln!("FAILED {}\n{}\n", name, reason);
    }
    if report.is_success() {
        println!("{} programs passed", report.total());
    } else {
        println!("{} of {} programs failed", report.failures.len(), report.total());
    }
    Ok(report.is_success())
}
