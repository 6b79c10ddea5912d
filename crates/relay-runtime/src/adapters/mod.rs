//! Process-edge adapters: where VAAs enter and where oracle fan-out lands in
//! local mode.

pub mod oracle_sink;
pub mod stdin_feed;
