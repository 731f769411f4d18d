pub mod aggregate;
pub mod chart;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod transform;
