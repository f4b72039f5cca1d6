//! One conversation turn: fan out to every advisor, fan back in, commit.

pub mod locks;
pub mod orchestrator;
