//! Rendering of results and messages for the output sink.

pub mod generator;

pub use generator::*;
