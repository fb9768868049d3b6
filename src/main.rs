mod debug_report;

use anyhow::{Context, Result};
use clap::Parser;
use resub::{Engine, Options, load_rule_table};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Apply a table of string substitutions to every input line, ordering the
/// rules so they do not overwrite each other's work.
///
/// By default rules are reordered so that (1) a rule whose pattern contains
/// another rule's pattern runs first ('abc' before 'ab') and (2) a rule
/// searching for s runs before a rule producing s ('cd'->'ef' before 'ab'->'cd').
#[derive(Parser, Debug)]
#[command(name = "resub", version, about, long_about)]
struct Cli {
    /// Rule table: one `pattern,replacement` pair per line. Wrap a pattern in
    /// /.../ for a regular expression; \1, \2 ... refer to its groups.
    #[arg(short = 's', long = "strings", value_name = "FILE")]
    strings: PathBuf,

    /// Input text. Reads stdin when omitted.
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Keep the table order; do not infer dependencies between rules.
    #[arg(short, long)]
    explicit: bool,

    /// Print the order of actions without replacing anything. Implies --verbose.
    #[arg(short, long)]
    test: bool,

    /// Print the execution plan before processing.
    #[arg(short, long)]
    verbose: bool,

    /// Debug logging. Implies --verbose.
    #[arg(short, long)]
    debug: bool,

    /// Force ANSI colour in the plan report.
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Disable ANSI colour in the plan report.
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(err) = run(&cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(cli: &Cli) {
    let default = if cli.debug {
        "resub=debug"
    } else if cli.verbose || cli.test {
        "resub=info"
    } else {
        "resub=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let raw = load_rule_table(&cli.strings)?;
    let options = Options { explicit: cli.explicit, dry_run: cli.test };
    let engine = Engine::from_raw(&raw, &options)?;

    let verbose = cli.verbose || cli.test || cli.debug;
    let color = if cli.color {
        true
    } else if cli.no_color {
        false
    } else {
        io::stdout().is_terminal()
    };

    if verbose {
        let plan = engine.plan()?;
        debug_report::print_plan(&engine, &plan, color);
    }

    if cli.test {
        return Ok(());
    }

    let input: Box<dyn BufRead> = match &cli.file {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open input {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut out = BufWriter::new(io::stdout().lock());

    for (idx, line) in input.lines().enumerate() {
        let mut line = line.context("failed to read input")?;
        engine.process_line(&mut line).with_context(|| format!("line {}", idx + 1))?;
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    Ok(())
}
