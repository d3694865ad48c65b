//! Aether Client - analysis service collaborator
//!
//! - [`AnalysisApi`]: the endpoint contract the wizard depends on
//! - [`HttpAnalysisClient`]: `reqwest` implementation of that contract
//! - Wire payloads with explicit optional parts
//!
//! Every call resolves to a value or a [`ClientError`]; a non-success HTTP
//! status is an error value, never a panic.

#![warn(unreachable_pub)]

pub mod api;
pub mod error;
pub mod http;
pub mod payload;

pub use api::AnalysisApi;
pub use error::{ClientError, ClientResult};
pub use http::HttpAnalysisClient;
pub use payload::{
    AnalysisPayload, AnomalyResult, CleanOutcome, CleaningOperation, Cluster, ClusterResult,
    Correlation, Created, DatasetInfo, HealthScores, Hypothesis, ImputeMethod, Insight,
    InventoryResponse, NewProject, NewStory, PiiWarning, Preview, Recommendation,
    StorySuggestion, UploadRequest, UploadResponse, UploadWarning,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
