//! Core conversation machinery: transcript state, reveal scheduling,
//! the backend session engine, and the chat-surface lifecycle.

// === Submodules ===

pub mod events;
pub mod reveal;
pub mod session;
pub mod surface;
pub mod transcript;
