pub mod cloud;
pub mod config;
pub mod desk;
pub mod errors;
pub mod models;
pub mod report;
pub mod state;
pub mod store;

pub use cloud::{BackupRemote, HttpRemote};
pub use desk::{DashboardStats, Desk};
pub use errors::DeskError;
pub use report::{Reporter, TracingReporter};
pub use state::AppState;
pub use store::{FileStore, KeyValueStore, LocalStore, MemoryStore};
