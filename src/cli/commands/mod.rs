pub mod auth;
pub mod clients;
pub mod lines;
pub mod sims;
pub mod stats;
