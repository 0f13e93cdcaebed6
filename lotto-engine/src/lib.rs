pub mod config;
pub mod error;
pub mod grader;
pub mod patterns;
pub mod sampler;
pub mod search;
pub mod service;
pub mod snapshot;
pub mod subsets;

pub use config::EngineConfig;
pub use error::EngineError;
pub use grader::{Grade, GradeReport};
pub use search::{Origin, SearchStats};
pub use service::{Recommendation, RecommendationService};
pub use snapshot::AnalyticsSnapshot;
