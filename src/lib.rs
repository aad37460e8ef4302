pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod store;

pub use error::{NetwError, NetwResult};

#[cfg(test)]
pub mod testing;
