//! senti-server - HTTP surface for the Senti analysis pipeline.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod error;
pub mod routes;

pub use error::ServerError;
pub use routes::{build_router, ServiceState};
