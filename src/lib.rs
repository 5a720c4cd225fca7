// Public API for integration tests and potential library usage

pub mod audit;
pub mod config;
pub mod cooldown;
pub mod normalize;
pub mod protocol;
pub mod questions;
pub mod session;
pub mod state;
pub mod types;
pub mod ws;
