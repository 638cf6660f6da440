use crate::config::MergeConfig;
use crate::core::join::JoinEngine;
use crate::core::table_io::{read_table, write_table};
use crate::core::{Pipeline, Storage, Table};
use crate::utils::error::Result;

/// Joins two CSV tables on the business-name column.
pub struct MergePipeline<S: Storage> {
    storage: S,
    config: MergeConfig,
    engine: JoinEngine,
}

impl<S: Storage> MergePipeline<S> {
    pub fn new(storage: S, config: MergeConfig) -> Self {
        let engine = JoinEngine::new(config.key_column.clone(), config.mode)
            .with_normalizer(config.key_normalization)
            .with_missing_key_policy(config.missing_key);
        Self {
            storage,
            config,
            engine,
        }
    }

    /// Replaces the join engine, e.g. to plug in a custom key normalizer.
    pub fn with_engine(mut self, engine: JoinEngine) -> Self {
        self.engine = engine;
        self
    }

    async fn read_input(&self, path: &str) -> Result<Table> {
        let data = self.storage.read_file(path).await?;
        let table = read_table(&data)?;
        self.engine.check_key_column(&table, path)?;
        Ok(table)
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for MergePipeline<S> {
    type Extracted = (Table, Table);

    async fn extract(&self) -> Result<(Table, Table)> {
        let left = self.read_input(&self.config.left_path).await?;
        let right = self.read_input(&self.config.right_path).await?;
        tracing::debug!(
            "Read {} rows from '{}' and {} rows from '{}'",
            left.len(),
            self.config.left_path,
            right.len(),
            self.config.right_path
        );
        Ok((left, right))
    }

    async fn transform(&self, (left, right): (Table, Table)) -> Result<Table> {
        let merged = self.engine.join(&left, &right)?;
        tracing::info!(
            "Merged {} records from {} and {} input records ({} join on '{}')",
            merged.len(),
            left.len(),
            right.len(),
            self.engine.mode(),
            self.engine.key_column()
        );
        Ok(merged)
    }

    async fn load(&self, table: Table) -> Result<String> {
        let bytes = write_table(&table)?;
        self.storage.write_file(&self.config.output_path, &bytes).await?;
        tracing::info!("Merged files saved to {}", self.config.output_path);
        Ok(self.config.output_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::etl::EtlEngine;
    use crate::core::JoinMode;
    use crate::utils::error::EtlError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn put(&self, path: &str, data: &str) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|data| String::from_utf8_lossy(data).into_owned())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    async fn storage_with(left: &str, right: &str) -> MockStorage {
        let storage = MockStorage::default();
        storage.put("left.csv", left).await;
        storage.put("right.csv", right).await;
        storage
    }

    fn config(mode: JoinMode) -> MergeConfig {
        MergeConfig::new("left.csv", "right.csv", "merged.csv").with_mode(mode)
    }

    #[tokio::test]
    async fn test_inner_merge_writes_every_match() {
        let storage = storage_with("Business Name,a\nX,1\n", "Business Name,b\nX,2\nX,3\n").await;
        let pipeline = MergePipeline::new(storage.clone(), config(JoinMode::Inner));

        let path = EtlEngine::new(pipeline).run().await.unwrap();

        assert_eq!(path, "merged.csv");
        assert_eq!(
            storage.get_file("merged.csv").await.unwrap(),
            "Business Name,a,b\nX,1,2\nX,1,3\n"
        );
    }

    #[tokio::test]
    async fn test_left_merge_pads_unmatched_rows() {
        let storage = storage_with("Business Name,a\nY,1\n", "Business Name,b\nX,2\n").await;
        let pipeline = MergePipeline::new(storage.clone(), config(JoinMode::Left));

        EtlEngine::new(pipeline).run().await.unwrap();

        assert_eq!(
            storage.get_file("merged.csv").await.unwrap(),
            "Business Name,a,b\nY,1,\n"
        );
    }

    #[tokio::test]
    async fn test_missing_key_column_writes_nothing() {
        let storage = storage_with("Business Name,a\nX,1\n", "Name,b\nX,2\n").await;
        let pipeline = MergePipeline::new(storage.clone(), config(JoinMode::Outer));

        let err = EtlEngine::new(pipeline).run().await.unwrap_err();

        assert!(matches!(
            err,
            EtlError::MissingColumnError { ref source_name, .. } if source_name == "right.csv"
        ));
        assert!(storage.get_file("merged.csv").await.is_none());
    }

    #[tokio::test]
    async fn test_custom_normalizer_engine() {
        let storage = storage_with("Business Name,a\nAcme LLC,1\n", "Business Name,b\nacme,2\n").await;
        let engine = JoinEngine::new("Business Name", JoinMode::Inner).with_normalizer(|raw: &str| {
            raw.trim_end_matches(" LLC").to_lowercase()
        });
        let pipeline = MergePipeline::new(storage.clone(), config(JoinMode::Inner)).with_engine(engine);

        EtlEngine::new(pipeline).run().await.unwrap();

        assert_eq!(
            storage.get_file("merged.csv").await.unwrap(),
            "Business Name,a,b\nAcme LLC,1,2\n"
        );
    }
}
