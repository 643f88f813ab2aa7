// Calendar Bridge Library
// Seeds and tears down device calendar state around automated UI test runs

pub mod batch;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use bridge::CalendarBridge;
pub use config::BridgeConfig;
pub use dispatch::Dispatcher;
pub use error::{BridgeError, BridgeResult};
pub use models::*;
pub use store::{CalendarStore, MemoryConnector, MemoryStore, StoreConnector};
