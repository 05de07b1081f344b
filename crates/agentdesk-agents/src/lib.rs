//! Agent Personas
//!
//! The sixteen built-in personas that steer the language model, plus the
//! catalog descriptors that drive the dashboard's agent picker. Persona
//! instructions are process-lifetime static data; the catalog is seeded into
//! the store at startup so both sides share the same identifiers.

pub mod catalog;
pub mod persona;

pub use catalog::{builtin_agent_descriptors, AgentDescriptor};
pub use persona::{resolve, FALLBACK_INSTRUCTION};
