//! Chatbot orchestrator.
//!
//! Owns one adapter per instance and drives the inbound pipeline: filter,
//! respond decision, classification, assistant delegation, formatting,
//! reply. Pipeline failures never propagate; at worst the sender gets a
//! fixed apology.

pub mod chatbot;
pub mod logging;
pub mod platform;

pub use {
    chatbot::{Chatbot, APOLOGY},
    platform::Platform,
};
