pub mod pipeline;
pub mod policy;
pub mod scoring;
pub mod stats;
pub mod types;
