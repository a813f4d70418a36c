//! Aggregate views over the cleaned trip table.
//!
//! Everything here is a pure function of the cleaned rows: grouped counts,
//! the trailing moving average, histogram bins with a density curve, and the
//! seeded scatter sample. The exporter and renderer consume the resulting
//! [`types::AggregateViews`] independently.

pub mod aggregate;
pub mod histogram;
pub mod types;
pub mod utility;
