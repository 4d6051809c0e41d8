//! Discord channel adapter.
//!
//! Receives events over a persistent gateway stream: the transport pushes
//! decoded gateway messages into a channel, and a background drain task
//! translates each one into a canonical message as it arrives. Shutdown is
//! blocking — `disconnect` waits (bounded) for the drain task to stop
//! accepting events before returning.

pub mod adapter;
pub mod config;
pub mod gateway;

pub use {
    adapter::DiscordAdapter,
    config::DiscordConfig,
    gateway::{DiscordGateway, GatewayMessage},
};
