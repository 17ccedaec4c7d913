//! umodex - index Unreal packages through umodel and search them interactively.

use std::error::Error as _;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use umodex::config::DEFAULT_CONFIG_PATH;
use umodex::repl::run_queries;
use umodex::{
    Config, IndexReport, ProgressDisplay, SearchEngine, UmodexError, DEFAULT_THREADS,
};

#[derive(Parser)]
#[command(name = "umodex")]
#[command(version)]
#[command(about = "Index Unreal packages with umodel and search their contents", long_about = None)]
struct Cli {
    /// Directory to scan, overriding root_path from the config file
    #[arg(long)]
    root_path: Option<PathBuf>,

    /// Config file holding umodel_path and root_path
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// umodel executable, overriding umodel_path from the config file
    #[arg(long)]
    tool: Option<PathBuf>,

    /// Write the resolved tool and root back to the config file
    #[arg(long)]
    save_config: bool,

    /// Packages listed concurrently
    #[arg(short = 'j', long, default_value_t = DEFAULT_THREADS)]
    threads: usize,

    /// Kill umodel after this many seconds on a single package
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "umodex=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), UmodexError> {
    let mut config = Config::load(&cli.config)?;
    let tool = config.resolve_tool(cli.tool)?;
    let root = config.resolve_root(cli.root_path)?;
    Config::validate(&tool, &root)?;

    if cli.save_config {
        config.umodel_path = Some(tool.clone());
        config.root_path = Some(root.clone());
        config.save(&cli.config)?;
        debug!(path = %cli.config.display(), "config saved");
    }

    println!("Indexing {}\n", root.display());

    let progress = ProgressDisplay::new();
    let mut builder = umodex::index()
        .root(&root)
        .tool(&tool)
        .threads(cli.threads)
        .on_progress(progress.clone());
    if let Some(secs) = cli.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    let report = builder.run();
    progress.finish();
    let report = report?;
    print_summary(&report);

    let engine = SearchEngine::new(&report.index);
    run_queries(&engine, io::stdin().lock(), &mut io::stdout().lock()).map_err(|source| {
        UmodexError::Io {
            path: PathBuf::from("<stdin>"),
            source,
        }
    })?;

    Ok(())
}

fn print_summary(report: &IndexReport) {
    let stats = &report.stats;
    println!(
        "Indexing complete! {} package(s), {} record(s) in {:.1}s",
        stats.packages,
        stats.records,
        stats.duration.as_secs_f64()
    );

    if !report.failures.is_empty() {
        println!("{} package(s) could not be listed:", report.failures.len());
        for failure in &report.failures {
            println!("  {}: {}", failure.path.display(), failure.error);
        }
    }

    for err in &report.walk_errors {
        println!("  skipped: {err}");
    }
}
