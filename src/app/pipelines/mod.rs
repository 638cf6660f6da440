pub mod enrich_pipeline;
pub mod merge_pipeline;

pub use enrich_pipeline::EnrichmentPipeline;
pub use merge_pipeline::MergePipeline;
