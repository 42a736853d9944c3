//! Data ingestion layer for the water impact analyzer.
//!
//! Responsible for reading chat exports (raw JSON or zip archives),
//! normalising their heterogeneous message shapes, aggregating water
//! consumption and running the top-level analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod archive;
pub mod normalizer;
pub mod reader;

pub use water_core as core;
