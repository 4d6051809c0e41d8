//! Snapchat channel adapter.
//!
//! Webhook-driven: there is no background loop. An externally invoked entry
//! point accepts one raw payload at a time, decodes it synchronously, and
//! hands it to the registered sink inline. All traffic is a pre-filtered 1:1
//! interaction, so the response policy is unconditional.

pub mod adapter;
pub mod config;
pub mod format;

pub use {
    adapter::{SnapSender, SnapchatAdapter},
    config::SnapchatConfig,
};
