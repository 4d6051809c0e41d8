//! Imageboard channel adapter.
//!
//! Monitors a fixed set of boards by polling the public catalog JSON on a
//! short interval, filters out the bot's own posts and anything outside the
//! recency window, and posts replies as `>>post` quotes through an enforced
//! posting delay.

pub mod adapter;
pub mod client;
pub mod config;
pub mod format;

pub use {
    adapter::FourChanAdapter,
    client::{BoardClient, BoardPost, HttpBoardClient},
    config::FourChanConfig,
};
