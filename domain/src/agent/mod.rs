//! Agent stage domain model
//!
//! A stage is one agent role (planner, implementer, validator) bound to a
//! capability set that limits which tools it can reach.

pub mod capability;
pub mod role;
