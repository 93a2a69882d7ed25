// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use catalog_publisher::config::DEFAULT_CONFIG_PATH;
use catalog_publisher::error::{EXIT_CONFIGURATION, EXIT_PIPELINE_FAILURE};
use catalog_publisher::utils::logging::{
    format_error, format_info, format_step, format_success, format_warning, init_logger,
    set_color_output,
};
use catalog_publisher::{
    ArtifactVerifier, CatalogFetcher, Config, Narration, NarrationKind, Overrides,
    PipelineError, PipelineOrchestrator, PriceFilter, Stage,
};
use clap::error::ErrorKind;
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "catalog_publisher")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Filter a product catalog by price, publish it and verify it through a CDN", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_PATH,
        env = "CATALOG_PUBLISHER_CONFIG",
        global = true
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set, global = true)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    verbose: bool,

    #[command(flatten)]
    target: TargetArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
struct TargetArgs {
    /// Destination bucket, overriding S3_BUCKET_NAME
    #[arg(long)]
    bucket: Option<String>,

    /// Distribution base URL, overriding CLOUDFRONT_URL
    #[arg(long)]
    distribution_url: Option<String>,

    #[arg(long, value_name = "PRICE")]
    min_price: Option<f64>,

    #[arg(long, value_name = "URL")]
    source_url: Option<String>,
}

impl TargetArgs {
    fn is_empty(&self) -> bool {
        self.bucket.is_none()
            && self.distribution_url.is_none()
            && self.min_price.is_none()
            && self.source_url.is_none()
    }
}

impl From<TargetArgs> for Overrides {
    fn from(args: TargetArgs) -> Self {
        Overrides {
            bucket: args.bucket,
            distribution_url: args.distribution_url,
            min_price: args.min_price,
            source_url: args.source_url,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, filter, publish and verify (the default)
    Run(TargetArgs),

    /// Fetch and filter only; never publishes
    Filter {
        #[arg(long, value_name = "PRICE")]
        min_price: Option<f64>,

        #[arg(long, value_name = "URL")]
        source_url: Option<String>,

        /// Write the JSON document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check the artifact currently served by the distribution endpoint
    Verify {
        #[arg(long)]
        distribution_url: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = check_target_placement(&cli) {
        err.exit();
    }

    init_logger(cli.color, cli.verbose);
    set_color_output(cli.color);

    match dispatch(cli).await {
        Ok(code) => exit_code(code),
        Err(err) => {
            eprintln!("{}", format_error(&format!("{:#}", err)));
            let code = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<PipelineError>())
                .map_or(EXIT_PIPELINE_FAILURE, PipelineError::exit_code);
            exit_code(code)
        }
    }
}

/// Top-level run overrides are only meaningful without a subcommand; after
/// one they belong to `run`.
fn check_target_placement(cli: &Cli) -> std::result::Result<(), clap::Error> {
    if cli.command.is_some() && !cli.target.is_empty() {
        return Err(Cli::command().error(
            ErrorKind::ArgumentConflict,
            "--bucket, --distribution-url, --min-price and --source-url must follow `run` when a subcommand is given",
        ));
    }
    Ok(())
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

async fn dispatch(cli: Cli) -> Result<i32> {
    let config = load_config(&cli.config)?;

    match cli.command.unwrap_or(Commands::Run(cli.target)) {
        Commands::Run(target) => cmd_run(config, target).await,
        Commands::Filter {
            min_price,
            source_url,
            output,
        } => cmd_filter(config, min_price, source_url, output).await,
        Commands::Verify { distribution_url } => cmd_verify(config, distribution_url).await,
    }
}

fn load_config(path: &std::path::Path) -> Result<Config> {
    info!("Loading configuration from: {}", path.display());

    if path.exists() {
        Config::load(Some(path)).context("Failed to load configuration")
    } else {
        warn!(
            "Config file {} not found, using defaults and environment",
            path.display()
        );
        Config::load(None).context("Failed to load configuration")
    }
}

async fn cmd_run(mut config: Config, target: TargetArgs) -> Result<i32> {
    config
        .apply_overrides(target.into())
        .context("Invalid configuration")?;

    let orchestrator = match PipelineOrchestrator::new(&config) {
        Ok(orchestrator) => orchestrator.with_progress(std::io::stderr().is_terminal()),
        Err(err) if err.is_config() => {
            eprintln!("{}", format_error(&err.to_string()));
            return Ok(EXIT_CONFIGURATION);
        }
        Err(err) => return Err(err).context("Failed to initialise pipeline"),
    };

    println!("{}", format_info("Starting product data processing pipeline"));
    println!("{}", "=".repeat(50));

    let outcome = orchestrator.run().await;

    for line in &outcome.narration {
        println!("{}", render(line));
    }

    if let Some(entry) = outcome.first_entry() {
        println!("\nSample product from distribution:");
        println!("{}", serde_json::to_string_pretty(entry)?);
    }

    Ok(outcome.exit_code())
}

async fn cmd_filter(
    mut config: Config,
    min_price: Option<f64>,
    source_url: Option<String>,
    output: Option<PathBuf>,
) -> Result<i32> {
    config
        .apply_overrides(Overrides {
            min_price,
            source_url,
            ..Overrides::default()
        })
        .context("Invalid configuration")?;

    let fetcher = CatalogFetcher::new(&config.source)?;
    let filter = PriceFilter::new(config.filter.min_price)?;

    let catalog = fetcher.fetch().await?;
    let filtered = match filter.apply_non_empty(&catalog) {
        Ok(filtered) => filtered,
        Err(err) => {
            eprintln!("{}", format_warning(&err.to_string()));
            return Ok(err.exit_code());
        }
    };
    let document = filtered.to_json_pretty()?;

    match output {
        Some(path) => {
            std::fs::write(&path, &document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{}",
                format_success(&format!(
                    "Wrote {} products to {}",
                    filtered.len(),
                    path.display()
                ))
            );
        }
        None => println!("{}", document),
    }

    Ok(0)
}

async fn cmd_verify(mut config: Config, distribution_url: Option<String>) -> Result<i32> {
    config
        .apply_overrides(Overrides {
            distribution_url,
            ..Overrides::default()
        })
        .context("Invalid configuration")?;

    let base_url = match config.require_distribution_url() {
        Ok(url) => url,
        Err(err) => {
            eprintln!("{}", format_error(&err.to_string()));
            return Ok(EXIT_CONFIGURATION);
        }
    };

    let verifier = ArtifactVerifier::new(&config.distribution, &base_url)?;
    let report = verifier.verify().await?;

    println!(
        "{}",
        format_success(&format!(
            "{} serves {} products (sha256 {})",
            report.url, report.entry_count, report.sha256
        ))
    );
    if let Some(entry) = &report.first_entry {
        println!("{}", serde_json::to_string_pretty(entry)?);
    }

    Ok(0)
}

fn render(line: &Narration) -> String {
    let text = line.to_string();
    match (line.kind, line.stage.step()) {
        (NarrationKind::Failure, _) => format_error(&text),
        (NarrationKind::Warning, _) => format_warning(&text),
        (NarrationKind::Success, _) => format_success(&text),
        (NarrationKind::Progress, Some(step)) => {
            format_step(step, Stage::WORKING.len(), &line.message)
        }
        _ => format_info(&text),
    }
}
