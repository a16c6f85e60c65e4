pub mod commands;
pub mod contracts;
pub mod error;
pub mod import;
pub mod intelligence;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{ClientError, ClientResult, ColumnMappingError};
pub use intelligence::pipeline::{AnalysisOutcome, PipelineOutput, analyze_batch, run_pipeline};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
