//! Domain models for the Agronomic Advisory Platform

mod advisory;
mod crop;
mod fertilizer;
mod growth;
mod irrigation;
mod risk;
mod weather;

pub use advisory::*;
pub use crop::*;
pub use fertilizer::*;
pub use growth::*;
pub use irrigation::*;
pub use risk::*;
pub use weather::*;
