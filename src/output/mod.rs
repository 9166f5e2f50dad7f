//! Output module for persisting crawled brands
//!
//! This module handles:
//! - The [`ResultSink`] interface the crawler hands finished brands to
//! - Writing each brand as a JSON document

mod json;
mod traits;

pub use json::JsonFileSink;
pub use traits::{OutputError, OutputResult, ResultSink};
