//! Aether Orchestrator - the asynchronous half of the analytics wizard
//!
//! - [`AnalysisOrchestrator`]: primary-then-enrichment dashboard loading with
//!   stale-result protection
//! - [`select_tab_data`]: pure tab projection of the loaded bundle
//! - [`Wizard`]: session driver binding the stage pipeline to the service
//! - [`Notifier`]: seam for user-facing notices
//!
//! # Example
//!
//! ```rust,no_run
//! use aether_client::HttpAnalysisClient;
//! use aether_core::{AetherConfig, StoryId};
//! use aether_orchestrator::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AetherConfig::default();
//! let api = Arc::new(HttpAnalysisClient::new(&config.api)?);
//! let orchestrator = AnalysisOrchestrator::from_config(api, &config.orchestrator);
//!
//! orchestrator.load(StoryId::new("42")).await?;
//! orchestrator.with_state(|state| {
//!     let view = select_tab_data(&state.bundle, DashboardTab::Insights);
//!     println!("{}", serde_json::to_string_pretty(&view).unwrap_or_default());
//! });
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod dashboard;
pub mod error;
pub mod notifier;
pub mod orchestrator;
pub mod slot;
pub mod wizard;

pub use dashboard::{select_tab_data, DashboardTab, TabView};
pub use error::{AnalysisError, UnknownTab, WizardError};
pub use notifier::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use orchestrator::{
    AnalysisBundle, AnalysisOrchestrator, DashboardState, DiscoveryState, EnrichmentReport,
    Resolution,
};
pub use slot::{FetchFailure, Slot};
pub use wizard::Wizard;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the wizard
    pub use crate::{
        select_tab_data, AnalysisError, AnalysisOrchestrator, DashboardTab, Notifier, Resolution,
        Slot, TabView, TracingNotifier, Wizard, WizardError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
