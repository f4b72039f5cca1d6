//! Shared domain types for Counsel.
//!
//! This crate contains the domain types used across the Counsel workspace:
//! Advisor, Conversation, Message, AgentMemory, turn outcomes, stock
//! analysis, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod advisor;
pub mod analysis;
pub mod config;
pub mod conversation;
pub mod error;
pub mod memory;
pub mod turn;
