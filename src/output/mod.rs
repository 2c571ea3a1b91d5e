//! Output module for reporting on harvested data
//!
//! This module handles:
//! - Computing statistics (item, image and tag counts) over stored records
//! - Printing statistics to the console

pub mod stats;

pub use stats::{load_statistics, print_statistics, MetadataStatistics};
