//! Output writers for the aggregated snapshot.

pub mod json;
