pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod session;
pub mod store;
