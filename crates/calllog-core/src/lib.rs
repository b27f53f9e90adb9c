//! Shared model and parsing rules for the call-log dashboard.
//!
//! Holds the canonical [`models::CallRecord`] shape, the cell-level parsers
//! used during normalization, the business-hour slot tables and the
//! command-line settings.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{CallLogError, Result};
