//! Client core of the construction reporting dashboard
//!
//! Session and UI preference stores persisted to durable key-value
//! storage, an API gateway with bearer injection and refresh-retry, a
//! cached data-fetch layer, and per-report facet filtering and summaries.

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod gateway;
pub mod models;
pub mod navigation;
pub(crate) mod persist;
pub mod preferences;
pub mod queries;
pub mod query;
pub mod reports;
pub mod session;

pub use api::{DashboardApi, ReportType};
pub use config::DashboardConfig;
pub use error::{ApiError, ApiResult, handle_api_error};
pub use gateway::{ApiGateway, AuthEvent};
pub use navigation::{AuthCoordinator, Navigator, Route};
pub use preferences::{DocumentRoot, PreferenceStore};
pub use queries::Queries;
pub use query::{QueryClient, QueryKey};
pub use reports::{FacetSelection, ReportView};
pub use session::SessionStore;
