//! Math score prediction for student exam records.
//!
//! A record is turned into a one-row table, run through a fitted
//! [`preprocessor::Preprocessor`] and a fitted [`model::RegressionModel`],
//! both loaded from the artifacts directory on every prediction.

pub mod batch;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod preprocessor;
pub mod records;
pub mod server;
pub mod utils;

pub use error::{PipelineError, PipelineResult};
pub use model::RegressionModel;
pub use pipeline::PredictPipeline;
pub use preprocessor::Preprocessor;
pub use records::CustomData;
pub use utils::{load_object, save_object};
