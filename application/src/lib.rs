//! Application layer for triad
//!
//! Use cases orchestrating the plan / implement / validate pipeline, and the
//! ports they depend on. Adapters for the ports live in the infrastructure
//! layer; this crate knows nothing about HTTP, processes, or the filesystem.

pub mod config;
pub mod gate;
pub mod ports;
pub mod use_cases;

pub use config::PipelineParams;
pub use gate::CapabilityGate;
pub use ports::{
    llm_gateway::{GatewayError, LlmGateway},
    progress::{CompositeProgress, NoProgress, PipelineProgress},
    tool_executor::ToolExecutorPort,
};
pub use use_cases::{
    run_pipeline::{PipelineError, RunPipelineInput, RunPipelineUseCase},
    run_request::{RunRequestInput, RunRequestOutput, RunRequestUseCase},
    run_stage::{StageError, StageRunner},
};
