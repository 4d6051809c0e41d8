//! Channel adapter system.
//!
//! Each platform (Discord, 4chan, Reddit, Snapchat, OnlyFans) implements the
//! [`ChannelAdapter`] capability set, translating native events to and from
//! the canonical [`parley_common::Message`]. This crate also carries the
//! scaffolding every adapter shares: the connection state machine, the
//! cancellable polling loop, outbound rate spacing, and response-length
//! helpers.

pub mod adapter;
pub mod format;
pub mod poll;
pub mod rate;

pub use {
    adapter::{AdapterSession, ChannelAdapter, ConnectionState, MessageSink},
    poll::{spawn_poll_loop, within_window},
    rate::RateGate,
};
