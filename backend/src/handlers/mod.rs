//! HTTP request handlers

pub mod advisory;
pub mod health;
pub mod knowledge;

pub use advisory::*;
pub use health::*;
pub use knowledge::*;
