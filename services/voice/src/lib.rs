//! Interview Voice Service
//!
//! Drives an [`interview_core`] session from both ends: a voice agent that relays
//! questions to a founder over a speech pipeline, and a scripted interviewer that
//! decides what to ask. The `interview` binary wires the two together on a console.

pub mod agent;
pub mod config;
pub mod interviewer;
pub mod room;
pub mod speech;
