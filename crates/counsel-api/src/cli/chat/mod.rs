//! Interactive chat with the advisor board.
//!
//! Each line the user submits runs one turn across every advisor; Ctrl+C
//! during a turn cancels it before anything is persisted.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
