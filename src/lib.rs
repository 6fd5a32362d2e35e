pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::BasicAuthClient;
pub use adapters::storage::{FileStore, LocalStorage, MemoryStore};
pub use api::{router, AppState};
pub use config::ServiceConfig;
pub use crate::core::LookupService;
pub use domain::model::{ApiClient, NewApiClient, PropertyAddress, PropertyRecord, SewageType};
pub use utils::error::{ClientError, LookupError, Result, ServiceError, StoreError};
