pub mod analyzers;
pub mod config;
pub mod error;
pub mod features;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod period;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod stats;
