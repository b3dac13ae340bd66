pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::HttpTransport;
pub use config::ClientSettings;
pub use crate::core::{request_builder::RequestBuilder, store::ProjectionStore};
pub use crate::core::{NamedSeries, Phase, Point, ProjectionRequest, ProjectionState, RawProjectionParams};
pub use utils::error::{ProjectionError, Result};
