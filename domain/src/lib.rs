//! Domain layer for triad
//!
//! This crate contains the core business logic, entities, and value objects
//! of the plan / implement / validate pipeline. It has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Stages
//!
//! A stage is one independent agent role with a restricted tool capability
//! set:
//!
//! - **Planner** (read-only): explores the codebase and produces a [`Plan`]
//! - **Implementer** (read-write): executes the plan and produces an
//!   [`ImplementationReport`]
//! - **Validator** (validation = read-only + git): reviews the changes and
//!   produces a [`ValidationReport`]
//!
//! ## Fix loop
//!
//! The orchestrator re-invokes the implementer with fix instructions
//! extracted from a rejecting validation report, up to a bounded iteration
//! count. Exhausting the budget is not an error: the run ends with a
//! `needs_review` status.

pub mod agent;
pub mod core;
pub mod orchestration;
pub mod prompt;
pub mod report;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use agent::{capability::Capability, role::StageRole};
pub use crate::core::{error::DomainError, string::truncate};
pub use orchestration::{
    entities::{PipelinePhase, PipelineState},
    value_objects::{PipelineOutcome, RunStatus},
};
pub use prompt::StagePromptTemplate;
pub use report::{
    coercion::{SchemaViolation, StageReport, coerce, extract_json},
    implementation::{ImplStatus, ImplementationReport, LintIssue, LintOutcome},
    plan::{FileIntent, Plan, PlanStep, StepAction},
    validation::{ValidationIssue, ValidationReport, ValidationStatus},
};
pub use session::{
    entities::{Message, Role, SessionScope, ThreadId, ThreadStore},
    response::{ContentBlock, LlmResponse, StopReason},
};
pub use tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
