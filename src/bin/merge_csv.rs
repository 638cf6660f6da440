use clap::Parser;
use places_enrich::config::cli::MergeCli;
use places_enrich::utils::{logger, validation::Validate};
use places_enrich::{EtlEngine, EtlError, LocalStorage, MergeConfig, MergePipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = MergeCli::parse();

    logger::init_logger(cli.verbose, cli.log_format);

    let config = MergeConfig::from(cli);
    tracing::debug!("Merge config: {:?}", config);
    if let Err(e) = config.validate() {
        fail(e);
    }

    let pipeline = MergePipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("Merged files saved to {}", output_path);
            Ok(())
        }
        Err(e) => fail(e),
    }
}

fn fail(e: EtlError) -> ! {
    tracing::error!(
        "merge-csv failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("Error: {}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}
