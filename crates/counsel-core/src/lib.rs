//! Business logic and repository trait definitions for Counsel.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the turn orchestrator that drives every advisor
//! through one conversation turn. It depends only on `counsel-types` --
//! never on `counsel-infra` or any database/IO crate.

pub mod analysis;
pub mod conversation;
pub mod memory;
pub mod registry;
pub mod responder;
pub mod turn;

#[cfg(test)]
mod testing;
