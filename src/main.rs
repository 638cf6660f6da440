use anyhow::Context;
use clap::Parser;
use places_enrich::config::cli::EnrichCli;
use places_enrich::utils::{logger, validation::Validate};
use places_enrich::{EnrichmentPipeline, EtlEngine, EtlError, GooglePlacesClient, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = EnrichCli::parse();

    logger::init_logger(cli.verbose, cli.log_format);

    tracing::info!("Starting places-enrich");
    let config = cli
        .into_config()
        .context("failed to load configuration file")?;
    tracing::debug!(
        "Input: {}, output: {}, key column: '{}', concurrency: {}",
        config.input_path,
        config.output_path,
        config.key_column,
        config.concurrent_requests
    );

    // The credential and paths are checked before any record is read.
    if let Err(e) = config.validate() {
        fail(e);
    }

    let client = match GooglePlacesClient::new(config.places.clone()) {
        Ok(client) => client,
        Err(e) => fail(e),
    };

    let pipeline = EnrichmentPipeline::new(LocalStorage::default(), client, config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("Script finished.");
            println!("Enriched table saved to: {}", output_path);
            Ok(())
        }
        Err(e) => fail(e),
    }
}

fn fail(e: EtlError) -> ! {
    tracing::error!(
        "places-enrich failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("{}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}
