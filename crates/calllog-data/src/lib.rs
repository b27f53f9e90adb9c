//! Data layer for the call-log dashboard.
//!
//! Reads spreadsheet workbooks, normalizes their sheets into one
//! [`CallLog`](calllog_core::models::CallLog), computes the dashboard views
//! and exports filtered selections to CSV.

pub mod aggregator;
pub mod analysis;
pub mod export;
pub mod normalizer;
pub mod reader;
