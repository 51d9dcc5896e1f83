#![forbid(unsafe_code)]

mod accumulator;
mod category;
mod ids;
mod model;
mod policy;

pub use accumulator::*;
pub use category::*;
pub use ids::*;
pub use model::*;
pub use policy::*;

#[cfg(test)]
mod tests;
