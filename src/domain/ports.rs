use crate::domain::model::{PlaceResult, Table};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn key_column(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
    fn request_delay(&self) -> Duration;
}

/// Remote place search. Implementations perform one outbound call per
/// invocation and never fail: any error becomes `PlaceResult::default()`.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn lookup(&self, business_name: &str) -> PlaceResult;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send;

    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Table>;
    async fn load(&self, table: Table) -> Result<String>;
}
