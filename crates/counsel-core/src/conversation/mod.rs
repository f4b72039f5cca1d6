//! Conversation persistence abstractions and the conversation service.
//!
//! `ConversationStore` is the port the infrastructure layer implements for
//! conversation CRUD, ordered message reads, and atomic turn commits.

pub mod service;
pub mod store;
