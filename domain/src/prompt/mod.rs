//! Prompt templates for the pipeline stages

mod stage;

pub use stage::StagePromptTemplate;
