use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting ETL process...");

        tracing::debug!("Extracting data...");
        let raw_data = self.pipeline.extract().await?;
        tracing::debug!("Extract finished after {:?}", started.elapsed());

        tracing::debug!("Transforming data...");
        let table = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "Transformed {} records into {} columns",
            table.len(),
            table.header().len()
        );

        tracing::debug!("Loading data...");
        let output_path = self.pipeline.load(table).await?;
        tracing::info!(
            "Output saved to: {} ({:?} elapsed)",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
