use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use creditcard2stix::app::ports::DefaultObjectsPort;
use creditcard2stix::app::process_use_case::ConvertUseCase;
use creditcard2stix::config::Config;
use creditcard2stix::constants::DEFAULT_OUTPUT_DIR;
use creditcard2stix::error::CardsError;
use creditcard2stix::infra::bin_client::ReqwestBinClient;
use creditcard2stix::infra::default_objects::HttpDefaultObjects;
use creditcard2stix::infra::fs_store::{FileSystemStore, OutputMode};
use creditcard2stix::logging;
use creditcard2stix::pipeline::build::SchemaMode;
use creditcard2stix::pipeline::generate;

#[derive(Parser)]
#[command(name = "creditcard2stix")]
#[command(about = "Converts credit card CSV data into STIX 2.1 objects")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a card CSV into a STIX bundle enriched with BIN data
    Convert {
        /// Input CSV file with credit card data
        #[arg(long)]
        input_csv: PathBuf,
        /// Optional CSV file describing the run report
        #[arg(long)]
        report_csv: Option<PathBuf>,
        /// Directory the STIX objects and bundle are written to
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
        /// How cards link to their issuer identity
        #[arg(long, value_enum, default_value_t = SchemaMode::Refs)]
        schema: SchemaMode,
        /// Merge into an existing output directory instead of resetting it
        #[arg(long)]
        merge: bool,
    },
    /// Generate a demo CSV of plausible card records
    Generate {
        /// Number of rows to generate
        #[arg(short, long, default_value_t = 100)]
        number: usize,
        /// Card types to generate (comma-separated), e.g. visa,mastercard
        #[arg(long)]
        types: Option<String>,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Output CSV path
        #[arg(long, default_value = "dummy_credit_cards.csv")]
        output: PathBuf,
    },
}

async fn run_convert(
    input_csv: PathBuf,
    report_csv: Option<PathBuf>,
    output_dir: PathBuf,
    schema: SchemaMode,
    merge: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(input = %input_csv.display(), "processing input CSV");

    // Checked before the store resets the output directory: a missing input
    // file must abort with the previous run's output untouched.
    if !input_csv.exists() {
        return Err(Box::new(CardsError::InputNotFound(
            input_csv.display().to_string(),
        )));
    }

    let config = Config::load()?;
    let bin_client = ReqwestBinClient::new(&config.bin_lookup, Config::bin_api_key())?;

    let mode = if merge {
        OutputMode::Merge
    } else {
        OutputMode::Reset
    };
    let mut store = FileSystemStore::open(&output_dir, mode)?;

    println!("🌐 Fetching default STIX objects...");
    let default_objects = HttpDefaultObjects::new().fetch().await?;

    let use_case = ConvertUseCase::new(Box::new(bin_client));
    let summary = use_case
        .run(
            &input_csv,
            report_csv.as_deref(),
            default_objects,
            &mut store,
            schema,
        )
        .await?;

    println!("\n📊 Conversion results:");
    println!("   Cards processed: {}", summary.total_cards);
    println!("   Cards enriched: {}", summary.enriched_cards);
    println!("   Issuer identities: {}", summary.issuer_identities);
    println!("   Total objects: {}", summary.total_objects);
    println!("   Bundle id: {}", summary.bundle_id);
    println!("   Bundle file: {}", summary.bundle_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load API key from .env, then initialize logging
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input_csv,
            report_csv,
            output_dir,
            schema,
            merge,
        } => {
            println!("💳 Converting card data to STIX 2.1...");
            if let Err(e) = run_convert(input_csv, report_csv, output_dir, schema, merge).await {
                error!("Conversion failed: {}", e);
                println!("❌ Conversion failed: {}", e);
                std::process::exit(1);
            }
            println!("✅ Conversion completed successfully");
        }
        Commands::Generate {
            number,
            types,
            seed,
            output,
        } => {
            println!("🎲 Generating {} demo card records...", number);
            let types: Option<Vec<String>> = types
                .map(|list| list.split(',').map(|s| s.trim().to_string()).collect());
            match generate::generate_csv(&output, number, types.as_deref(), seed) {
                Ok(()) => {
                    println!("✅ Demo CSV written to {}", output.display());
                }
                Err(e) => {
                    error!("Generation failed: {}", e);
                    println!("❌ Generation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}
