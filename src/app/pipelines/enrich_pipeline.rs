use crate::core::flatten::flatten;
use crate::core::table_io::{read_table, write_table};
use crate::core::{ConfigProvider, Pipeline, PlaceLookup, PlaceResult, Storage, Table};
use crate::utils::error::{EtlError, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Reads business names, looks each one up and writes the flattened table.
pub struct EnrichmentPipeline<S: Storage, L: PlaceLookup, C: ConfigProvider> {
    storage: S,
    lookup: Arc<L>,
    config: C,
}

impl<S: Storage, L: PlaceLookup + 'static, C: ConfigProvider> EnrichmentPipeline<S, L, C> {
    pub fn new(storage: S, lookup: L, config: C) -> Self {
        Self {
            storage,
            lookup: Arc::new(lookup),
            config,
        }
    }

    /// Runs every lookup and returns the results in input order.
    ///
    /// At most `concurrent_requests` lookups are in flight; each task is
    /// tagged with its row index so completion order does not matter.
    async fn lookup_all(&self, table: &Table) -> Result<Vec<PlaceResult>> {
        let key_column = self.config.key_column();
        let total = table.len();
        let delay = self.config.request_delay();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_requests().max(1)));

        let mut results = vec![PlaceResult::default(); total];
        let mut tasks = JoinSet::new();

        for (index, record) in table.records().iter().enumerate() {
            let name = record.get(key_column).unwrap_or("").trim().to_string();
            if name.is_empty() {
                tracing::warn!("Row {}: skipping empty business name.", index + 1);
                continue;
            }

            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| EtlError::ProcessingError {
                    message: format!("lookup scheduler closed: {}", e),
                })?;
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::info!("Processing {}/{}: '{}'", index + 1, total, name);
            let lookup = Arc::clone(&self.lookup);
            tasks.spawn(async move {
                let result = lookup.lookup(&name).await;
                drop(permit);
                (index, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined.map_err(|e| EtlError::ProcessingError {
                message: format!("lookup task failed: {}", e),
            })?;
            results[index] = result;
        }

        let empty = results.iter().filter(|r| r.is_empty()).count();
        if empty > 0 {
            tracing::warn!("{} of {} lookups returned no place data", empty, total);
        }

        Ok(results)
    }
}

#[async_trait::async_trait]
impl<S: Storage, L: PlaceLookup + 'static, C: ConfigProvider> Pipeline
    for EnrichmentPipeline<S, L, C>
{
    type Extracted = Table;

    async fn extract(&self) -> Result<Table> {
        let input_path = self.config.input_path();
        let key_column = self.config.key_column();

        let data = self.storage.read_file(input_path).await?;
        let table = read_table(&data)?;

        if !table.has_column(key_column) {
            return Err(EtlError::MissingColumnError {
                column: key_column.to_string(),
                source_name: input_path.to_string(),
            });
        }

        let header = table.header().to_vec();
        let records = table
            .into_records()
            .into_iter()
            .enumerate()
            .filter_map(|(index, mut record)| {
                if let Some(name) = record.get(key_column) {
                    let trimmed = name.trim().to_string();
                    record.set(key_column, trimmed);
                    Some(record)
                } else {
                    tracing::warn!(
                        "Skipping row {} of '{}': no '{}' value",
                        index + 1,
                        input_path,
                        key_column
                    );
                    None
                }
            })
            .collect();

        let table = Table::with_header(header, records);
        tracing::info!(
            "Read {} business names from '{}'.",
            table.len(),
            input_path
        );
        Ok(table)
    }

    async fn transform(&self, data: Table) -> Result<Table> {
        // Column width depends on every result, so all lookups finish first.
        let results = self.lookup_all(&data).await?;
        flatten(data, &results)
    }

    async fn load(&self, table: Table) -> Result<String> {
        let output_path = self.config.output_path();
        let bytes = write_table(&table)?;

        tracing::debug!("Writing {} bytes to '{}'", bytes.len(), output_path);
        self.storage.write_file(output_path, &bytes).await?;

        tracing::info!(
            "Successfully wrote {} rows to '{}'.",
            table.len(),
            output_path
        );
        Ok(output_path.to_string())
    }
}
