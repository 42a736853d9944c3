//! Core types for water-impact: the canonical conversation model, field
//! extractors for raw exports, physical conversion ratios, errors, settings
//! and plain-text rendering.

pub mod calculations;
pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{ErrorKind, ImpactError, Result};
