#![forbid(unsafe_code)]

mod config;
mod input;
mod output;
mod report;

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Parser;
use depdag_core::analyze;
use output::{CliError, OutputMode};
use report::{Report, ReportOptions};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
#[command(
    author,
    version,
    about = "depdag: cycle-aware dependency analysis",
    long_about = "Collapse dependency cycles into components, order them topologically, \
                  and report shortest paths and the critical path from a source task.",
    after_help = "EXAMPLES:\n    # Analyze the default task file\n    depdag\n\n    # Analyze a file from another source task\n    depdag graphs/build.json --source 3\n\n    # Emit machine-readable output\n    depdag graphs/build.json --json\n\n    # Render the condensation with Graphviz\n    depdag graphs/build.json --dot | dot -Tsvg > dag.svg"
)]
struct Cli {
    /// Task file (JSON). Defaults to `[input] default_file` from the config.
    file: Option<PathBuf>,

    /// Source task, overriding the `source` field of the file.
    #[arg(long)]
    source: Option<usize>,

    /// Output format.
    #[arg(long, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, hide = true)]
    json: bool,

    /// Include per-stage metrics.
    #[arg(long, conflicts_with = "no_metrics")]
    metrics: bool,

    /// Omit per-stage metrics.
    #[arg(long)]
    no_metrics: bool,

    /// Omit original-task expansions of component paths.
    #[arg(long)]
    no_expand: bool,

    /// Print the condensation DAG as Graphviz DOT instead of the report.
    #[arg(long)]
    dot: bool,

    /// Project config file (default: ./depdag.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Everything resolved from flags, environment and config before analysis.
#[derive(Debug)]
struct Settings {
    mode: OutputMode,
    input: PathBuf,
    options: ReportOptions,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self> {
        let project_path = match &cli.config {
            Some(path) if !path.exists() => bail!("config file {} does not exist", path.display()),
            Some(path) => path.clone(),
            None => PathBuf::from(config::PROJECT_CONFIG_FILE),
        };
        let project = config::load_project_config(&project_path)?;
        let user = config::load_user_config()?;

        let mode = output::resolve_output_mode(
            cli.format,
            cli.json,
            project.report.output.as_deref(),
            user.output.as_deref(),
        );
        let show_metrics = if cli.metrics {
            true
        } else if cli.no_metrics {
            false
        } else {
            project.report.show_metrics
        };

        Ok(Self {
            mode,
            input: cli.file.clone().unwrap_or(project.input.default_file),
            options: ReportOptions {
                show_metrics,
                expand_nodes: project.report.expand_nodes && !cli.no_expand,
            },
        })
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DEPDAG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "depdag=debug,info"
        } else {
            "depdag=info,warn"
        })
    });

    let format = env::var("DEPDAG_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    debug!(input = %settings.input.display(), mode = ?settings.mode, "resolved settings");

    let task = input::load_task_file(&settings.input)?;
    let loaded = task.into_graph(cli.source)?;
    let analysis = analyze(&loaded.graph, loaded.source)?;

    if cli.dot {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        out.write_all(report::condensation_dot(&analysis).as_bytes())?;
        return Ok(());
    }

    let summary = Report::new(&loaded, &analysis, settings.options);
    output::render_mode(
        settings.mode,
        &summary,
        report::write_text,
        report::write_pretty,
    )
}

/// Report `err` on `w` and map it to a failing exit status.
fn fail(w: &mut dyn Write, mode: OutputMode, err: &anyhow::Error) -> Result<ExitCode> {
    output::write_error(w, mode, &CliError::from(err))?;
    Ok(ExitCode::FAILURE)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let settings = match Settings::resolve(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            let mode = output::resolve_output_mode(cli.format, cli.json, None, None);
            return fail(&mut io::stderr().lock(), mode, &err);
        }
    };

    match run(&cli, &settings) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => fail(&mut io::stderr().lock(), settings.mode, &err),
    }
}
