//! Application-level configuration.
//!
//! - [`ExecutionParams`] — call options, batch sizing, selection and iteration control

pub mod execution_params;

pub use execution_params::{
    BatchParams, CallOptions, ExecutionParams, IterationParams, RunnerParams, SelectionParams,
};
