//! stableswap-core: Shared types, errors, and configuration
//!
//! This crate provides the foundational value types used across the workspace
//! (addresses, assets, pools, hops, simulation results) together with the
//! interfaces of the external collaborators the router talks to.

pub mod config;
pub mod errors;
pub mod pool;
pub mod simulation;
pub mod source;
pub mod types;

pub use config::*;
pub use errors::*;
pub use pool::*;
pub use simulation::*;
pub use source::*;
pub use types::*;
