pub mod handlers;
pub mod snapshot;
pub mod store;
