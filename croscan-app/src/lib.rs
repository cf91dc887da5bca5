//! croscan application layer: the shared pipeline and its two front ends.
//!
//! - [`pipeline`]: fetch → clean → analyze composition root
//! - [`server`]: axum adapter (`GET /analyze`, `GET /health`)
//! - [`console`]: interactive driver that prints and saves the reply
//! - [`cli`]: argument parsing for the `croscan` binary

pub mod cli;
pub mod console;
pub mod pipeline;
pub mod server;

pub use pipeline::{Pipeline, Stage};
