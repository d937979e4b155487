//! `aquion` — run control and output multiplexing over a reaction engine.
//!
//! Hosts create a [`session::Session`] around any [`aquion_engine::engine::ReactionEngine`],
//! toggle the output channels they care about, drive runs, and read results
//! back through indexed accessors. One session serves one run at a time.

pub mod hooks;
pub mod mux;
pub mod session;
