use cypher_arrows_core::{DirectionFixer, FixOptions};
use serde::Serialize;
use std::io::Read;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

mod check;

const LOG_ENV: &str = "CYPHER_ARROWS_LOG";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Fixer(cypher_arrows_core::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    Logging(String),
    NoMatch,
    CheckFailed { failed: usize, total: usize },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Fixer(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Csv(err) => write!(f, "CSV error: {err}"),
            CliError::Logging(msg) => write!(f, "Logging error: {msg}"),
            CliError::NoMatch => write!(f, "No pattern in the query matches the schema"),
            CliError::CheckFailed { failed, total } => {
                write!(f, "{failed} of {total} rows did not match the expected query")
            }
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<cypher_arrows_core::Error> for CliError {
    fn from(value: cypher_arrows_core::Error) -> Self {
        Self::Fixer(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<csv::Error> for CliError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Fix,
    Triples,
    Check,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    schema: Option<String>,
    schema_file: Option<String>,
    lenient: bool,
    pretty: bool,
    verbose: bool,
}

impl Args {
    fn options(&self) -> FixOptions {
        if self.lenient {
            FixOptions::lenient()
        } else {
            FixOptions::strict()
        }
    }
}

fn usage() -> &'static str {
    "cypher-arrows\n\
\n\
USAGE:\n\
  cypher-arrows [fix] (--schema <text> | --schema-file <path>) [--lenient] [<path>|-]\n\
  cypher-arrows triples (--schema <text> | --schema-file <path>) [--pretty] [<path>|-]\n\
  cypher-arrows check <csv-path>\n\
\n\
OPTIONS:\n\
  --verbose   log debug events to stderr (overridden by CYPHER_ARROWS_LOG)\n\
  --help      print this message\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the query is read from stdin.\n\
  - Schema text is a list of (Source, RELATION, Destination) tuples.\n\
  - fix exits with status 3 when no pattern matches the schema (unless --lenient).\n\
  - check reads a CSV with the columns statement,schema,correct_query.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "fix" => args.command = Command::Fix,
            "triples" => args.command = Command::Triples,
            "check" => args.command = Command::Check,
            "--lenient" => args.lenient = true,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            "--schema" => {
                let Some(text) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.schema = Some(text.clone());
            }
            "--schema-file" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.schema_file = Some(path.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    match args.command {
        Command::Fix | Command::Triples => {
            if args.schema.is_some() == args.schema_file.is_some() {
                return Err(CliError::Usage(usage()));
            }
        }
        Command::Check => {
            if args.input.is_none() {
                return Err(CliError::Usage(usage()));
            }
        }
    }

    Ok(args)
}

fn init_logging(verbose: bool) -> Result<(), CliError> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = match std::env::var(LOG_ENV) {
        Ok(spec) if !spec.trim().is_empty() => EnvFilter::try_new(spec)
            .map_err(|e| CliError::Logging(format!("invalid {LOG_ENV}: {e}")))?,
        _ => EnvFilter::new(default_level),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn load_fixer(args: &Args) -> Result<DirectionFixer, CliError> {
    let text = match (&args.schema, &args.schema_file) {
        (Some(text), None) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        _ => return Err(CliError::Usage(usage())),
    };
    let fixer = DirectionFixer::from_schema_str_with_options(&text, args.options())?;
    debug!(schemas = fixer.schemas().len(), "cli.schema_loaded");
    Ok(fixer)
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Fix => {
            let fixer = load_fixer(&args)?;
            let query = read_input(args.input.as_deref())?;
            let fixed = fixer.fix(&query);
            if fixed.is_empty() {
                return Err(CliError::NoMatch);
            }
            print!("{fixed}");
            Ok(())
        }
        Command::Triples => {
            let fixer = load_fixer(&args)?;
            let query = read_input(args.input.as_deref())?;
            write_json(&fixer.analyze(&query), args.pretty)
        }
        Command::Check => {
            let csv_text = read_input(args.input.as_deref())?;
            let report = check::run(&csv_text, args.options())?;
            report.print(args.verbose);
            if report.failed() > 0 {
                return Err(CliError::CheckFailed {
                    failed: report.failed(),
                    total: report.total,
                });
            }
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = init_logging(args.verbose) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    match run(args) {
        Ok(()) => {}
        Err(CliError::NoMatch) => {
            eprintln!("{}", CliError::NoMatch);
            std::process::exit(3);
        }
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
