//! Live Stream Fan-out (component G): a cursor-based per-session
//! subscription producing ordered [`StreamUpdate`] records, with a
//! server-sent-events wire encoding.
//!
//! Generalizes the teacher's broadcast-channel event subscription
//! (`astrid-gateway`'s `subscribe_events_impl`) into a durable cursor-replay
//! poll loop: a reconnecting or momentarily-stalled subscriber resumes from
//! its last cursor by re-reading the log rather than losing history.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]

mod config;
mod subscription;
mod update;

pub use config::StreamConfig;
pub use subscription::spawn_session_stream;
pub use update::{encode_sse, stream_open_comment, StreamUpdate};
