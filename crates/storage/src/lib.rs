#![forbid(unsafe_code)]

mod config;
mod provider;
mod reconcile;
mod store;

pub use config::*;
pub use provider::*;
pub use reconcile::*;
pub use store::*;
