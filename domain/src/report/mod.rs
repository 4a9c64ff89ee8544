//! Stage contract model
//!
//! The structured reports exchanged between stages, plus the coercion layer
//! that turns raw LLM text into them. This is the one boundary where untyped
//! text becomes the internal typed model: the upstream producer is a
//! non-deterministic text generator, not a disciplined typed caller, so
//! parsing is lenient for list-valued fields and strict only for scalars.

pub mod coercion;
pub mod implementation;
pub mod plan;
pub mod validation;
