use clap::{Parser, ValueEnum};
use odcpio::archive::Archive;
use odcpio::index::{DuplicatePolicy, IndexOptions};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "odcpio", about = "Index odc (070707) CPIO archives and extract their description")]
struct Cli {
    /// Archive to read
    input: PathBuf,
    /// Output path (accepted for compatibility; nothing is written to it)
    output: PathBuf,
    /// Print the payload of the `description` entry instead of the listing
    #[arg(short, long)]
    description: bool,
    /// Print the listing as JSON
    #[arg(long)]
    json: bool,
    /// What to do with a repeated entry name
    #[arg(long, value_enum, default_value = "keep-last")]
    duplicates: Duplicates,
    /// Treat a partially indexed archive as an error
    #[arg(long)]
    strict: bool,
    /// Raise log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Duplicates {
    KeepLast,
    KeepFirst,
    Reject,
}

impl From<Duplicates> for DuplicatePolicy {
    fn from(d: Duplicates) -> Self {
        match d {
            Duplicates::KeepLast  => DuplicatePolicy::KeepLast,
            Duplicates::KeepFirst => DuplicatePolicy::KeepFirst,
            Duplicates::Reject    => DuplicatePolicy::Reject,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help / --version land here too and are not failures.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(())  => ExitCode::SUCCESS,
        Err(e)  => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let opts = IndexOptions { duplicates: cli.duplicates.into() };
    let mut ar = Archive::open_with(&cli.input, opts)?;
    debug!(output = %cli.output.display(), "output path is not written");

    if ar.status().is_partial() {
        eprintln!("warning: {}: {}", cli.input.display(), ar.status());
        if cli.strict {
            return Err(format!("{} is only partially indexed", cli.input.display()).into());
        }
    }

    if cli.description {
        let text = ar.description()?;
        let mut out = std::io::stdout().lock();
        out.write_all(&text)?;
        out.flush()?;
        return Ok(());
    }

    let entries = ar.list();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Archive: {}", ar.path().display());
    println!("{:<32} {:<7} {:>7} {:>12}  Modified", "Name", "Kind", "Mode", "Size");
    for info in &entries {
        let modified = info.modified
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".into());
        println!("{:<32} {:<7} {:>7o} {:>12}  {}",
            info.name, info.kind.name(), info.mode & 0o7777, info.size, modified);
    }
    println!("{} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
