//! OnlyFans creator-support adapter.
//!
//! Always-on: every inbound event is from a subscriber the creator already
//! wants answered, so the response policy is unconditional. Besides plain
//! direct messages the adapter handles subscription, tip, and content-request
//! events with canned creator responses sent straight through the transport.

pub mod adapter;
pub mod config;
pub mod format;

pub use {
    adapter::{CreatorApi, CreatorEvent, OnlyFansAdapter},
    config::OnlyFansConfig,
};
