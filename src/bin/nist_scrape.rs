use std::process::ExitCode;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use nist_spectra_scraper::app::{App, FetchOptions, ProgressSink, ScrapeResult};
use nist_spectra_scraper::config::{ConfigLoader, ResolvedConfig};
use nist_spectra_scraper::domain::{Formula, NistId, SpectrumType};
use nist_spectra_scraper::error::ScrapeError;
use nist_spectra_scraper::nist::NistHttpClient;
use nist_spectra_scraper::output::{ConsoleOutput, JsonOutput, OutputMode};
use nist_spectra_scraper::species::load_species;

#[derive(Parser)]
#[command(name = "nist-scrape")]
#[command(about = "Download MOL structures and JCAMP-DX spectra from the NIST Chemistry WebBook")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Search every formula in the species list and fetch all artifacts (default)")]
    Run(RunArgs),
    #[command(about = "List identifiers matching a formula")]
    Search(SearchArgs),
    #[command(about = "Fetch artifacts for identifiers directly")]
    Fetch(FetchArgs),
}

#[derive(Args, Clone, Default)]
struct RunArgs {
    #[arg(long)]
    species: Option<String>,

    #[command(flatten)]
    fetch: FetchFlags,
}

#[derive(Args)]
struct SearchArgs {
    formula: String,
}

#[derive(Args)]
struct FetchArgs {
    #[arg(required = true)]
    ids: Vec<String>,

    #[command(flatten)]
    fetch: FetchFlags,
}

#[derive(Args, Clone, Default)]
struct FetchFlags {
    #[arg(long)]
    force: bool,

    #[arg(long)]
    dry_run: bool,

    #[arg(long = "spectrum-type", value_parser = SpectrumType::from_str)]
    spectrum_types: Vec<SpectrumType>,
}

impl FetchFlags {
    fn into_options(self, config: &ResolvedConfig) -> FetchOptions {
        let spectrum_types = if self.spectrum_types.is_empty() {
            config.spectrum_types.clone()
        } else {
            self.spectrum_types
        };
        FetchOptions {
            force: self.force,
            dry_run: self.dry_run,
            spectrum_types,
        }
    }
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<ScrapeError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ScrapeError) -> u8 {
    match error {
        ScrapeError::SpeciesRead(_)
        | ScrapeError::ConfigRead(_)
        | ScrapeError::ConfigParse(_)
        | ScrapeError::InvalidMethod(_)
        | ScrapeError::InvalidIdentifier(_)
        | ScrapeError::InvalidFormula(_)
        | ScrapeError::InvalidSpectrumType(_) => 2,
        ScrapeError::NistHttp(_) | ScrapeError::NistStatus { .. } => 3,
        ScrapeError::Filesystem(_) => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let client = NistHttpClient::new(config.client.clone())?;
    let app = App::new(config.store.clone(), client).with_search_flags(config.search);

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run_all(args, &config, &app, output_mode),
        Commands::Search(args) => run_search(args, &app, output_mode),
        Commands::Fetch(args) => run_fetch(args, &config, &app, output_mode),
    }
}

fn run_all(
    args: RunArgs,
    config: &ResolvedConfig,
    app: &App<NistHttpClient>,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let species_path = args
        .species
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| config.species_path.clone().into_std_path_buf());
    let species = load_species(&species_path)?;
    let options = args.fetch.into_options(config);

    let result = app.run(&species, options, sink_for(output_mode))?;
    report(&result, output_mode)
}

fn run_search(
    args: SearchArgs,
    app: &App<NistHttpClient>,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let formula = args.formula.parse::<Formula>()?;
    let ids = app.search(&formula, sink_for(output_mode))?;
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_ids(&ids).into_diagnostic(),
        OutputMode::Interactive => {
            ConsoleOutput::print_ids(&ids);
            Ok(())
        }
    }
}

fn run_fetch(
    args: FetchArgs,
    config: &ResolvedConfig,
    app: &App<NistHttpClient>,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let ids = args
        .ids
        .iter()
        .map(|value| value.parse::<NistId>())
        .collect::<Result<Vec<_>, _>>()?;
    let options = args.fetch.into_options(config);

    let result = app.fetch_ids(&ids, options, sink_for(output_mode))?;
    report(&result, output_mode)
}

fn sink_for(output_mode: OutputMode) -> &'static dyn ProgressSink {
    match output_mode {
        OutputMode::NonInteractive => &JsonOutput,
        OutputMode::Interactive => &ConsoleOutput,
    }
}

fn report(result: &ScrapeResult, output_mode: OutputMode) -> miette::Result<()> {
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_result(result).into_diagnostic(),
        OutputMode::Interactive => {
            ConsoleOutput::print_summary(result);
            Ok(())
        }
    }
}
