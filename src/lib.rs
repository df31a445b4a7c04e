pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

/// Where unauthenticated sessions are sent.
pub const LOGIN_ROUTE: &str = "/login";

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{LocalStorage, MemoryStore, TracingToastSink, WsConnector};
pub use config::{AppConfig, SystemSettings};
pub use core::{ApiClient, Cart, NotificationCenter, NotificationClient};
pub use utils::error::{RentalError, Result};
