pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{GooglePlacesClient, LocalStorage};
pub use app::pipelines::{EnrichmentPipeline, MergePipeline};
pub use config::{EnrichConfig, MergeConfig, PlacesConfig};
pub use crate::core::{etl::EtlEngine, JoinMode, PlaceResult, Record, Table};
pub use utils::error::{EtlError, Result};
