//! LogLens Core - Handler registry, access gate, configuration and errors

pub mod config;
pub mod constants;
pub mod error;
pub mod gate;
pub mod registry;
pub mod types;

pub use config::*;
pub use error::{Error, Result};
pub use gate::{AccessGate, Decision, DenyReason, Operation};
pub use registry::HandlerRegistry;
pub use types::*;
