//! Streaming primitives used by the transcript.
//!
//! `reveal` owns the word-by-word state machine; `scheduler` turns its `Schedule` effects into
//! `AppEvent::RevealTick`s. The two only meet in `ChatSession`.

pub mod reveal;
pub mod scheduler;
