//! Per-advisor memory persistence abstractions for Counsel.
//!
//! The bounded window itself lives in `counsel_types::memory`; this module
//! defines the `MemoryStore` port the infrastructure layer implements.

pub mod store;
