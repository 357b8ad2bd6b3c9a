pub mod layers;
pub mod pipeline;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use layers::{ApolloLayer, EnrichmentLayer, ScrapeLayer};
pub use pipeline::{EnrichmentPipeline, PipelineStats};
